use serde::{Deserialize, Serialize};

/// Run-level state of the sequential step runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowPhase {
    /// No run has been started, or the plan was reset.
    Idle,
    /// A run is in flight and the timer is armed.
    Running,
    /// The timer was stopped mid-run; the active step is preserved.
    /// A later start begins a fresh run from the first step.
    Paused,
    /// Every step of the plan completed.
    Finished,
}

impl FlowPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, FlowPhase::Running)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, FlowPhase::Finished)
    }
}
