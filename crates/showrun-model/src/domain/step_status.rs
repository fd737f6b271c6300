use serde::{Deserialize, Serialize};

/// Lifecycle state of a single pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    /// Step has not been reached yet.
    Pending,
    /// Step is the one currently being simulated.
    Active,
    /// Step finished its simulated duration.
    Completed,
    /// Step was marked failed by the host. Nothing inside the runner
    /// produces this state.
    Error,
}

impl StepStatus {
    /// Returns `true` once the step will not transition further in this run.
    pub fn is_settled(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Error)
    }

    /// Returns `true` while the step is the simulated one.
    pub fn is_active(&self) -> bool {
        matches!(self, StepStatus::Active)
    }
}
