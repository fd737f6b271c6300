use serde::{Deserialize, Serialize};

/// Lifecycle state of a bench tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolStatus {
    /// Tool has not been started, or was reset.
    Idle,
    /// Tool is ticking toward completion.
    Running,
    /// Tool reached 100% progress.
    Completed,
    /// Tool was marked failed by the host. Nothing inside the runner
    /// produces this state.
    Error,
}

impl ToolStatus {
    /// Returns `true` once the tool will not tick further without a new
    /// command.
    pub fn is_settled(&self) -> bool {
        matches!(self, ToolStatus::Completed | ToolStatus::Error)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ToolStatus::Running)
    }
}
