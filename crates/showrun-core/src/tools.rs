//! Parallel tool runner.
//!
//! Every tool ticks toward completion on its own spawned task; progress grows
//! by a random, bounded increment per tick and clamps at exactly 100. A batch
//! mode runs the whole bench one tool at a time with a settle delay between
//! tools, while each tool keeps its own ticking mechanism.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use showrun_model::{ToolId, ToolInfo, ToolSpec, ToolStatus};

use crate::{
    config::ToolRunnerConfig,
    error::CoreError,
    events::{RunnerEvent, Subscribe, emit},
};

/// Point-in-time view of the bench, republished on every mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsSnapshot {
    pub tools: Vec<ToolInfo>,
    /// Result lines in completion order, cleared when a batch starts.
    pub log: Vec<String>,
    /// Whether a batch driver is in flight.
    pub batch_active: bool,
}

impl ToolsSnapshot {
    pub fn status_of(&self, id: &ToolId) -> Option<ToolStatus> {
        self.tools.iter().find(|t| t.id == *id).map(|t| t.status)
    }

    pub fn completed(&self) -> usize {
        self.tools
            .iter()
            .filter(|t| t.status == ToolStatus::Completed)
            .count()
    }

    pub fn any_running(&self) -> bool {
        self.tools.iter().any(|t| t.status.is_running())
    }
}

struct ToolEntry {
    info: ToolInfo,
    /// Bumped by every command touching this tool; stale tickers bail out.
    epoch: u64,
    cancel: Option<CancellationToken>,
}

impl ToolEntry {
    fn clear(&mut self) {
        self.info.status = ToolStatus::Idle;
        self.info.progress = 0.0;
        self.info.elapsed_ms = 0;
        self.info.output = None;
    }
}

struct ToolsInner {
    tools: Vec<ToolEntry>,
    /// Canned result lines, positionally matched to `tools`; off-index tools
    /// fall back to a random pick from this pool.
    outputs: Vec<String>,
    log: Vec<String>,
    rng: StdRng,
    batch: Option<CancellationToken>,
}

impl ToolsInner {
    fn snapshot(&self) -> ToolsSnapshot {
        ToolsSnapshot {
            tools: self.tools.iter().map(|t| t.info.clone()).collect(),
            log: self.log.clone(),
            batch_active: self.batch.is_some(),
        }
    }

    fn position(&self, id: &ToolId) -> Option<usize> {
        self.tools.iter().position(|t| t.info.id == *id)
    }
}

/// Builder for [`ToolRunner`].
pub struct ToolBenchBuilder {
    specs: Vec<ToolSpec>,
    outputs: Vec<String>,
    subs: Vec<Arc<dyn Subscribe>>,
    cfg: ToolRunnerConfig,
}

impl ToolBenchBuilder {
    /// Canned result lines, positionally matched to the specs.
    pub fn with_outputs(mut self, outputs: Vec<String>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_subscriber(mut self, sub: Arc<dyn Subscribe>) -> Self {
        self.subs.push(sub);
        self
    }

    pub fn with_config(mut self, cfg: ToolRunnerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn build(self) -> Result<ToolRunner, CoreError> {
        let mut seen = HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.id.clone()) {
                return Err(CoreError::DuplicateToolId(spec.id.clone()));
            }
        }

        let rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let inner = ToolsInner {
            tools: self
                .specs
                .into_iter()
                .map(|spec| ToolEntry {
                    info: ToolInfo::from(spec),
                    epoch: 0,
                    cancel: None,
                })
                .collect(),
            outputs: self.outputs,
            log: Vec::new(),
            rng,
            batch: None,
        };
        let (tx, _) = watch::channel(inner.snapshot());

        Ok(ToolRunner {
            inner: Arc::new(RwLock::new(inner)),
            tx: Arc::new(tx),
            subs: Arc::new(self.subs),
            cfg: self.cfg,
        })
    }
}

/// Parallel tool runner.
///
/// Cheap to clone; every clone shares the same bench. Commands spawn onto
/// the ambient tokio runtime, so the runner must live inside one.
#[derive(Clone)]
pub struct ToolRunner {
    inner: Arc<RwLock<ToolsInner>>,
    tx: Arc<watch::Sender<ToolsSnapshot>>,
    subs: Arc<Vec<Arc<dyn Subscribe>>>,
    cfg: ToolRunnerConfig,
}

impl ToolRunner {
    pub fn builder(specs: Vec<ToolSpec>) -> ToolBenchBuilder {
        ToolBenchBuilder {
            specs,
            outputs: Vec::new(),
            subs: Vec::new(),
            cfg: ToolRunnerConfig::default(),
        }
    }

    /// Build a runner with default config and no outputs or subscribers.
    pub fn new(specs: Vec<ToolSpec>) -> Result<Self, CoreError> {
        Self::builder(specs).build()
    }

    /// Start one tool. No-op when the id is unknown or the tool is already
    /// running. Progress restarts at zero; elapsed time keeps accumulating
    /// across re-runs until an explicit reset.
    pub fn execute(&self, id: &ToolId) {
        let (epoch, cancel) = {
            let mut inner = self.inner.write().unwrap();
            let Some(pos) = inner.position(id) else {
                debug!(tool = %id, "execute ignored: unknown tool");
                return;
            };
            let entry = &mut inner.tools[pos];
            if entry.info.status.is_running() {
                debug!(tool = %id, "execute ignored: already running");
                return;
            }
            entry.epoch += 1;
            entry.info.status = ToolStatus::Running;
            entry.info.progress = 0.0;

            let cancel = CancellationToken::new();
            entry.cancel = Some(cancel.clone());
            let epoch = entry.epoch;
            self.tx.send_replace(inner.snapshot());
            (epoch, cancel)
        };

        debug!(tool = %id, "tool started");
        emit(&self.subs, RunnerEvent::ToolStarted { tool: id.clone() });

        let runner = self.clone();
        let id = id.clone();
        tokio::spawn(async move { runner.tick_loop(id, epoch, cancel).await });
    }

    /// Restore one tool to idle. Rejected while the tool is running.
    pub fn reset(&self, id: &ToolId) {
        {
            let mut inner = self.inner.write().unwrap();
            let Some(pos) = inner.position(id) else {
                debug!(tool = %id, "reset ignored: unknown tool");
                return;
            };
            let entry = &mut inner.tools[pos];
            if entry.info.status.is_running() {
                debug!(tool = %id, "reset rejected: tool is running");
                return;
            }
            entry.epoch += 1;
            entry.cancel = None;
            entry.clear();
            self.tx.send_replace(inner.snapshot());
        }

        debug!(tool = %id, "tool reset");
        emit(&self.subs, RunnerEvent::ToolReset { tool: id.clone() });
    }

    /// Reset every tool regardless of status. Running tickers and any batch
    /// in flight are cancelled. The execution log is kept.
    pub fn reset_all(&self) {
        {
            let mut inner = self.inner.write().unwrap();
            if let Some(batch) = inner.batch.take() {
                batch.cancel();
            }
            for entry in &mut inner.tools {
                entry.epoch += 1;
                if let Some(cancel) = entry.cancel.take() {
                    cancel.cancel();
                }
                entry.clear();
            }
            self.tx.send_replace(inner.snapshot());
        }

        debug!("bench reset");
    }

    /// Mark a tool failed on behalf of the host.
    ///
    /// Nothing inside the runner fails on its own; this is the only path to
    /// `ToolStatus::Error`. Progress and elapsed time freeze where they were.
    pub fn mark_failed(&self, id: &ToolId) {
        {
            let mut inner = self.inner.write().unwrap();
            let Some(pos) = inner.position(id) else {
                debug!(tool = %id, "mark_failed ignored: unknown tool");
                return;
            };
            let entry = &mut inner.tools[pos];
            entry.epoch += 1;
            if let Some(cancel) = entry.cancel.take() {
                cancel.cancel();
            }
            entry.info.status = ToolStatus::Error;
            self.tx.send_replace(inner.snapshot());
        }

        info!(tool = %id, "tool marked failed");
        emit(&self.subs, RunnerEvent::ToolFailed { tool: id.clone() });
    }

    /// Run the bench one tool at a time, in declaration order.
    ///
    /// Tools already running when the batch starts are skipped. Clears the
    /// execution log, then for each remaining tool: execute, await it
    /// settling, then wait the settle delay. Returns once the batch driver
    /// is spawned; observe progress through `subscribe` or `wait_idle`.
    pub fn run_all(&self) {
        let (ids, cancel) = {
            let mut inner = self.inner.write().unwrap();
            if let Some(prev) = inner.batch.take() {
                prev.cancel();
            }
            inner.log.clear();

            let cancel = CancellationToken::new();
            inner.batch = Some(cancel.clone());
            let ids: Vec<ToolId> = inner
                .tools
                .iter()
                .filter(|t| !t.info.status.is_running())
                .map(|t| t.info.id.clone())
                .collect();
            self.tx.send_replace(inner.snapshot());
            (ids, cancel)
        };

        info!(tools = ids.len(), "batch started");
        emit(&self.subs, RunnerEvent::BatchStarted);

        let runner = self.clone();
        tokio::spawn(async move {
            for id in ids {
                runner.execute(&id);
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = runner.wait_settled(&id) => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(runner.cfg.settle_delay) => {}
                }
            }

            {
                let mut inner = runner.inner.write().unwrap();
                if !cancel.is_cancelled() {
                    inner.batch = None;
                    runner.tx.send_replace(inner.snapshot());
                }
            }
            info!("batch finished");
            emit(&runner.subs, RunnerEvent::BatchFinished);
        });
    }

    pub fn snapshot(&self) -> ToolsSnapshot {
        self.inner.read().unwrap().snapshot()
    }

    /// Watch the bench; a fresh snapshot is published on every mutation.
    pub fn subscribe(&self) -> watch::Receiver<ToolsSnapshot> {
        self.tx.subscribe()
    }

    /// Result lines accumulated so far, in completion order.
    pub fn execution_log(&self) -> Vec<String> {
        self.inner.read().unwrap().log.clone()
    }

    /// Suspend until the tool is not running.
    pub async fn wait_settled(&self, id: &ToolId) {
        let mut rx = self.subscribe();
        loop {
            let status = rx.borrow().status_of(id);
            if !matches!(status, Some(ToolStatus::Running)) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Suspend until no tool is running and no batch is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        loop {
            {
                let snap = rx.borrow();
                if !snap.batch_active && !snap.any_running() {
                    return;
                }
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    async fn tick_loop(self, id: ToolId, epoch: u64, cancel: CancellationToken) {
        let tick = self.cfg.tick;
        let tick_ms = tick.as_millis() as u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(tick) => {}
            }

            let completed_output;
            {
                let mut inner = self.inner.write().unwrap();
                let Some(pos) = inner.position(&id) else {
                    return;
                };
                {
                    let ToolsInner {
                        tools,
                        outputs,
                        log,
                        rng,
                        ..
                    } = &mut *inner;
                    let entry = &mut tools[pos];
                    if entry.epoch != epoch || !entry.info.status.is_running() {
                        return;
                    }

                    let increment = rng.gen_range(0.0..self.cfg.max_increment);
                    entry.info.progress = (entry.info.progress + increment).min(100.0);
                    entry.info.elapsed_ms += tick_ms;

                    completed_output = if entry.info.progress >= 100.0 {
                        entry.info.progress = 100.0;
                        entry.info.status = ToolStatus::Completed;
                        entry.cancel = None;

                        let output = match outputs.get(pos) {
                            Some(line) => line.clone(),
                            None if outputs.is_empty() => "execution completed".to_string(),
                            None => outputs[rng.gen_range(0..outputs.len())].clone(),
                        };
                        entry.info.output = Some(output.clone());
                        log.push(format!("{}: {}", entry.info.name, output));
                        Some(output)
                    } else {
                        None
                    };
                }
                self.tx.send_replace(inner.snapshot());
            }

            if let Some(output) = completed_output {
                info!(tool = %id, "tool completed");
                emit(&self.subs, RunnerEvent::ToolCompleted {
                    tool: id.clone(),
                    output,
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use super::*;

    fn bench(n: usize) -> Vec<ToolSpec> {
        use showrun_model::ToolKind;
        (1..=n)
            .map(|i| ToolSpec::new(format!("t{i}"), format!("Tool {i}"), ToolKind::Api))
            .collect()
    }

    fn outputs(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("result {i}")).collect()
    }

    fn seeded(n: usize) -> ToolRunner {
        ToolRunner::builder(bench(n))
            .with_outputs(outputs(n))
            .with_config(ToolRunnerConfig {
                seed: Some(42),
                ..Default::default()
            })
            .build()
            .unwrap()
    }

    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &RunnerEvent) {
            let line = match event {
                RunnerEvent::ToolStarted { tool } => format!("start:{tool}"),
                RunnerEvent::ToolCompleted { tool, .. } => format!("done:{tool}"),
                RunnerEvent::ToolFailed { tool } => format!("failed:{tool}"),
                RunnerEvent::ToolReset { tool } => format!("reset:{tool}"),
                RunnerEvent::BatchStarted => "batch-start".to_string(),
                RunnerEvent::BatchFinished => "batch-end".to_string(),
                other => format!("{other:?}"),
            };
            self.events.lock().unwrap().push(line);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn execute_runs_to_completion() {
        let runner = seeded(1);
        let id = ToolId::from("t1");

        runner.execute(&id);
        runner.wait_settled(&id).await;

        let snap = runner.snapshot();
        let tool = &snap.tools[0];
        assert_eq!(tool.status, ToolStatus::Completed);
        assert_eq!(tool.progress, 100.0);
        assert_eq!(tool.output.as_deref(), Some("result 1"));
        assert!(tool.elapsed_ms > 0);
        assert_eq!(tool.elapsed_ms % 100, 0);

        assert_eq!(runner.execution_log(), ["Tool 1: result 1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_monotonic_and_clamps_at_completion() {
        let runner = seeded(1);
        let id = ToolId::from("t1");
        let mut rx = runner.subscribe();

        runner.execute(&id);

        let mut last = 0.0_f64;
        loop {
            rx.changed().await.unwrap();
            let (progress, status) = {
                let snap = rx.borrow();
                (snap.tools[0].progress, snap.tools[0].status)
            };

            assert!(progress >= last, "progress must never decrease");
            assert!(progress <= 100.0);
            last = progress;

            // The clamp and the completion land in the same update.
            if progress == 100.0 {
                assert_eq!(status, ToolStatus::Completed);
                break;
            }
            assert_eq!(status, ToolStatus::Running);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn execute_while_running_is_noop() {
        let runner = seeded(1);
        let id = ToolId::from("t1");

        runner.execute(&id);
        sleep(Duration::from_millis(250)).await;

        let before = runner.snapshot().tools[0].progress;
        assert!(before > 0.0);

        runner.execute(&id);
        let after = runner.snapshot().tools[0].progress;
        assert_eq!(after, before, "a second execute must not restart progress");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_rejected_while_running_accepted_after() {
        let runner = seeded(1);
        let id = ToolId::from("t1");

        runner.execute(&id);
        sleep(Duration::from_millis(150)).await;
        runner.reset(&id);

        let tool = &runner.snapshot().tools[0];
        assert_eq!(tool.status, ToolStatus::Running);
        assert!(tool.progress > 0.0);

        runner.wait_settled(&id).await;
        runner.reset(&id);

        let tool = &runner.snapshot().tools[0];
        assert_eq!(tool.status, ToolStatus::Idle);
        assert_eq!(tool.progress, 0.0);
        assert_eq!(tool.elapsed_ms, 0);
        assert!(tool.output.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_ids_are_ignored() {
        let runner = seeded(1);
        let ghost = ToolId::from("ghost");

        runner.execute(&ghost);
        runner.reset(&ghost);
        runner.mark_failed(&ghost);

        let snap = runner.snapshot();
        assert_eq!(snap.tools[0].status, ToolStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_pool_entry_falls_back_to_pool_pick() {
        let runner = ToolRunner::builder(bench(2))
            .with_outputs(vec!["only line".to_string()])
            .with_config(ToolRunnerConfig {
                seed: Some(7),
                ..Default::default()
            })
            .build()
            .unwrap();
        let id = ToolId::from("t2");

        runner.execute(&id);
        runner.wait_settled(&id).await;

        let snap = runner.snapshot();
        assert_eq!(snap.tools[1].output.as_deref(), Some("only line"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_all_serializes_completions() {
        let recorder = Recorder::new();
        let runner = ToolRunner::builder(bench(3))
            .with_outputs(outputs(3))
            .with_subscriber(recorder.clone())
            .with_config(ToolRunnerConfig {
                seed: Some(42),
                ..Default::default()
            })
            .build()
            .unwrap();

        runner.run_all();
        runner.wait_idle().await;
        sleep(Duration::from_millis(1)).await;

        let snap = runner.snapshot();
        assert_eq!(snap.completed(), 3);
        assert_eq!(
            runner.execution_log(),
            ["Tool 1: result 1", "Tool 2: result 2", "Tool 3: result 3"]
        );

        let seen = recorder.seen();
        let index_of = |needle: &str| seen.iter().position(|e| e == needle).unwrap();
        assert_eq!(seen[0], "batch-start");
        assert!(index_of("done:t1") < index_of("start:t2"));
        assert!(index_of("done:t2") < index_of("start:t3"));
        assert_eq!(seen.last().map(String::as_str), Some("batch-end"));
    }

    #[tokio::test(start_paused = true)]
    async fn run_all_skips_tools_already_running() {
        let recorder = Recorder::new();
        let runner = ToolRunner::builder(bench(3))
            .with_outputs(outputs(3))
            .with_subscriber(recorder.clone())
            .with_config(ToolRunnerConfig {
                seed: Some(42),
                ..Default::default()
            })
            .build()
            .unwrap();

        runner.execute(&ToolId::from("t2"));
        sleep(Duration::from_millis(10)).await;
        runner.run_all();
        runner.wait_idle().await;
        sleep(Duration::from_millis(1)).await;

        assert_eq!(runner.snapshot().completed(), 3);
        let starts = recorder
            .seen()
            .iter()
            .filter(|e| *e == "start:t2")
            .count();
        assert_eq!(starts, 1, "a running tool must not be re-executed");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_all_cancels_tickers_and_batch() {
        let runner = seeded(3);

        runner.run_all();
        sleep(Duration::from_millis(250)).await;
        runner.reset_all();

        let snap = runner.snapshot();
        assert!(!snap.batch_active);
        assert!(snap.tools.iter().all(|t| t.status == ToolStatus::Idle));
        assert!(snap.tools.iter().all(|t| t.progress == 0.0));

        // No stale tick or batch step may revive the bench.
        sleep(Duration::from_secs(5)).await;
        let snap = runner.snapshot();
        assert!(snap.tools.iter().all(|t| t.status == ToolStatus::Idle));
        assert!(snap.tools.iter().all(|t| t.elapsed_ms == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn mark_failed_freezes_progress() {
        let runner = seeded(1);
        let id = ToolId::from("t1");

        runner.execute(&id);
        sleep(Duration::from_millis(150)).await;
        runner.mark_failed(&id);

        let frozen = runner.snapshot().tools[0].clone();
        assert_eq!(frozen.status, ToolStatus::Error);
        assert!(frozen.progress > 0.0);

        sleep(Duration::from_secs(2)).await;
        let tool = &runner.snapshot().tools[0];
        assert_eq!(tool.status, ToolStatus::Error);
        assert_eq!(tool.progress, frozen.progress);
        assert_eq!(tool.elapsed_ms, frozen.elapsed_ms);

        runner.reset(&id);
        assert_eq!(runner.snapshot().tools[0].status, ToolStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_runs_are_reproducible() {
        let id = ToolId::from("t1");

        let first = seeded(1);
        first.execute(&id);
        first.wait_settled(&id).await;

        let second = seeded(1);
        second.execute(&id);
        second.wait_settled(&id).await;

        assert_eq!(
            first.snapshot().tools[0].elapsed_ms,
            second.snapshot().tools[0].elapsed_ms
        );
    }

    #[test]
    fn duplicate_tool_ids_are_rejected() {
        use showrun_model::ToolKind;
        let specs = vec![
            ToolSpec::new("t1", "One", ToolKind::Code),
            ToolSpec::new("t1", "Two", ToolKind::Api),
        ];
        assert!(matches!(
            ToolRunner::new(specs),
            Err(CoreError::DuplicateToolId(_))
        ));
    }
}
