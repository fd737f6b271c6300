use std::sync::Arc;

use tracing::info;

use showrun_core::ToolRunner;
use showrun_model::catalog;
use showrun_observe::{Journal, LoggerConfig, logger_init};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    logger_init(&LoggerConfig::default())?;
    info!("logger initialized");

    // 2) Tool bench over the demo toolset
    let bench = ToolRunner::builder(catalog::integration_bench())
        .with_outputs(catalog::bench_outputs())
        .with_subscriber(Arc::new(Journal::new()))
        .build()?;

    // 3) Serialized batch over every tool
    bench.run_all();
    bench.wait_idle().await;

    for line in bench.execution_log() {
        info!(%line, "result");
    }

    let snap = bench.snapshot();
    info!(completed = snap.completed(), total = snap.tools.len(), "bench settled");

    Ok(())
}
