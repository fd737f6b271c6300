use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use showrun_model::{StepId, ToolId};

/// State transitions the runners announce to subscribers.
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    FlowStarted { run: Uuid },
    StepActivated { step: StepId },
    StepCompleted { step: StepId },
    StepFailed { step: StepId },
    FlowPaused { step: Option<StepId> },
    FlowReset,
    FlowFinished { run: Uuid },

    ToolStarted { tool: ToolId },
    ToolCompleted { tool: ToolId, output: String },
    ToolFailed { tool: ToolId },
    ToolReset { tool: ToolId },
    BatchStarted,
    BatchFinished,
}

/// Receives runner events out of band.
///
/// Each delivery runs on its own spawned task, so a slow subscriber never
/// delays a state transition.
#[async_trait]
pub trait Subscribe: Send + Sync {
    async fn on_event(&self, event: &RunnerEvent);

    fn name(&self) -> &'static str;
}

pub(crate) fn emit(subs: &Arc<Vec<Arc<dyn Subscribe>>>, event: RunnerEvent) {
    for sub in subs.iter() {
        let sub = Arc::clone(sub);
        let event = event.clone();
        tokio::spawn(async move {
            sub.on_event(&event).await;
        });
    }
}
