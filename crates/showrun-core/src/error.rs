use thiserror::Error;

use showrun_model::{StepId, ToolId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("duplicate step id in plan: {0}")]
    DuplicateStepId(StepId),
    #[error("duplicate tool id in bench: {0}")]
    DuplicateToolId(ToolId),
}
