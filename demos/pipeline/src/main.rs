use std::sync::Arc;

use tracing::info;

use showrun_core::FlowRunner;
use showrun_model::catalog;
use showrun_observe::{Journal, LoggerConfig, logger_init};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    let cfg = LoggerConfig {
        level: "debug".to_string(),
        ..Default::default()
    };
    logger_init(&cfg)?;
    info!("logger initialized");

    // 2) Pipeline runner over the demo plan
    let flow = FlowRunner::builder(catalog::agent_pipeline())
        .with_subscriber(Arc::new(Journal::new()))
        .build()?;

    let plan = flow.snapshot();
    info!(
        steps = plan.steps.len(),
        planned_ms = plan.planned_duration_ms(),
        "plan loaded"
    );

    // 3) Drive one full run to completion
    flow.start();
    flow.wait_settled().await;

    let done = flow.snapshot();
    info!(
        phase = ?done.phase,
        completed = done.completed(),
        percent = done.progress_percent(),
        "run settled"
    );

    Ok(())
}
