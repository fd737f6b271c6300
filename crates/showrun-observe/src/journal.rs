//! Runner event logging.
//!
//! Attach a [`Journal`] to a runner to get every state transition on the
//! `tracing` output, at a level matching how interesting the transition is.

use async_trait::async_trait;
use showrun_core::{RunnerEvent, Subscribe};
use tracing::{debug, info, warn};

/// Logs every runner event through `tracing`.
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for Journal {
    async fn on_event(&self, event: &RunnerEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}

pub fn message_for(event: &RunnerEvent) -> &'static str {
    match event {
        RunnerEvent::FlowStarted { .. } => "flow run started (plan reset to pending)",
        RunnerEvent::StepActivated { .. } => "step activated",
        RunnerEvent::StepCompleted { .. } => "step completed",
        RunnerEvent::StepFailed { .. } => "step marked failed by the host",
        RunnerEvent::FlowPaused { .. } => "flow paused (active step preserved)",
        RunnerEvent::FlowReset => "flow reset to pending",
        RunnerEvent::FlowFinished { .. } => "flow run finished (all steps completed)",

        RunnerEvent::ToolStarted { .. } => "tool execution started",
        RunnerEvent::ToolCompleted { .. } => "tool execution completed",
        RunnerEvent::ToolFailed { .. } => "tool marked failed by the host",
        RunnerEvent::ToolReset { .. } => "tool reset to idle",
        RunnerEvent::BatchStarted => "batch execution started",
        RunnerEvent::BatchFinished => "batch execution finished",
    }
}

pub fn log_event(event: &RunnerEvent) {
    let msg = message_for(event);

    match event {
        // flow lifecycle
        RunnerEvent::FlowStarted { run } => info!(run = %run, "{msg}"),
        RunnerEvent::FlowFinished { run } => info!(run = %run, "{msg}"),
        RunnerEvent::FlowPaused { step } => match step {
            Some(step) => info!(step = %step, "{msg}"),
            None => info!("{msg}"),
        },
        RunnerEvent::FlowReset => debug!("{msg}"),

        // step transitions
        RunnerEvent::StepActivated { step } => debug!(step = %step, "{msg}"),
        RunnerEvent::StepCompleted { step } => debug!(step = %step, "{msg}"),
        RunnerEvent::StepFailed { step } => warn!(step = %step, "{msg}"),

        // tool transitions
        RunnerEvent::ToolStarted { tool } => debug!(tool = %tool, "{msg}"),
        RunnerEvent::ToolCompleted { tool, output } => {
            info!(tool = %tool, output = %output, "{msg}")
        }
        RunnerEvent::ToolFailed { tool } => warn!(tool = %tool, "{msg}"),
        RunnerEvent::ToolReset { tool } => debug!(tool = %tool, "{msg}"),

        // batch lifecycle
        RunnerEvent::BatchStarted => info!("{msg}"),
        RunnerEvent::BatchFinished => info!("{msg}"),
    }
}
