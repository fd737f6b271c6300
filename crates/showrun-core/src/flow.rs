//! Sequential step runner.
//!
//! Drives an ordered plan one step at a time: the step at the cursor becomes
//! active, its simulated duration elapses on a fixed-delay timer, then it
//! completes and the cursor advances. Ordering is the point: the plan models
//! a causal pipeline (request, auth, processing, dispatch, response).

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use showrun_model::{FlowPhase, StepId, StepInfo, StepSpec, StepStatus};

use crate::{
    error::CoreError,
    events::{RunnerEvent, Subscribe, emit},
};

/// Point-in-time view of the plan, republished on every mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    /// Identity of the current run, stamped by `start`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub phase: FlowPhase,
    /// Index of the step being driven (equals plan length once finished).
    pub cursor: usize,
    pub steps: Vec<StepInfo>,
}

impl FlowSnapshot {
    /// Number of steps that completed so far.
    pub fn completed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    /// The step currently being simulated, if any.
    pub fn active_step(&self) -> Option<&StepInfo> {
        self.steps.iter().find(|s| s.status.is_active())
    }

    /// Percentage of the plan entered, rounded.
    pub fn progress_percent(&self) -> u32 {
        if self.steps.is_empty() {
            return 100;
        }
        ((self.cursor as f64 / self.steps.len() as f64) * 100.0).round() as u32
    }

    /// Sum of the simulated durations of the whole plan.
    pub fn planned_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }
}

struct FlowInner {
    steps: Vec<StepInfo>,
    cursor: usize,
    phase: FlowPhase,
    run_id: Option<Uuid>,
    /// Bumped by every command; a driver whose epoch no longer matches must
    /// not mutate.
    epoch: u64,
    cancel: Option<CancellationToken>,
}

impl FlowInner {
    fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            run_id: self.run_id,
            phase: self.phase,
            cursor: self.cursor,
            steps: self.steps.clone(),
        }
    }

    fn invalidate(&mut self) {
        self.epoch += 1;
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

/// Builder for [`FlowRunner`].
pub struct FlowBuilder {
    specs: Vec<StepSpec>,
    subs: Vec<Arc<dyn Subscribe>>,
}

impl FlowBuilder {
    pub fn with_subscriber(mut self, sub: Arc<dyn Subscribe>) -> Self {
        self.subs.push(sub);
        self
    }

    pub fn build(self) -> Result<FlowRunner, CoreError> {
        let mut seen = HashSet::new();
        for spec in &self.specs {
            if !seen.insert(spec.id.clone()) {
                return Err(CoreError::DuplicateStepId(spec.id.clone()));
            }
        }

        let inner = FlowInner {
            steps: self.specs.into_iter().map(StepInfo::from).collect(),
            cursor: 0,
            phase: FlowPhase::Idle,
            run_id: None,
            epoch: 0,
            cancel: None,
        };
        let (tx, _) = watch::channel(inner.snapshot());

        Ok(FlowRunner {
            inner: Arc::new(RwLock::new(inner)),
            tx: Arc::new(tx),
            subs: Arc::new(self.subs),
        })
    }
}

/// Sequential step runner.
///
/// Cheap to clone; every clone shares the same plan. Commands spawn onto the
/// ambient tokio runtime, so the runner must live inside one.
#[derive(Clone)]
pub struct FlowRunner {
    inner: Arc<RwLock<FlowInner>>,
    tx: Arc<watch::Sender<FlowSnapshot>>,
    subs: Arc<Vec<Arc<dyn Subscribe>>>,
}

impl FlowRunner {
    pub fn builder(specs: Vec<StepSpec>) -> FlowBuilder {
        FlowBuilder {
            specs,
            subs: Vec::new(),
        }
    }

    /// Build a runner with no subscribers.
    pub fn new(specs: Vec<StepSpec>) -> Result<Self, CoreError> {
        Self::builder(specs).build()
    }

    /// Begin a fresh run from the first step.
    ///
    /// No-op while a run is in flight. Starting from `Paused` does not
    /// resume; the plan restarts from the beginning.
    pub fn start(&self) {
        let (epoch, cancel, run_id) = {
            let mut inner = self.inner.write().unwrap();
            if inner.phase.is_running() {
                debug!("start ignored: run already in flight");
                return;
            }
            inner.invalidate();

            for step in &mut inner.steps {
                step.status = StepStatus::Pending;
            }
            inner.cursor = 0;
            inner.phase = FlowPhase::Running;
            let run_id = Uuid::new_v4();
            inner.run_id = Some(run_id);

            let cancel = CancellationToken::new();
            inner.cancel = Some(cancel.clone());
            self.tx.send_replace(inner.snapshot());
            (inner.epoch, cancel, run_id)
        };

        info!(run = %run_id, "flow run started");
        emit(&self.subs, RunnerEvent::FlowStarted { run: run_id });

        let runner = self.clone();
        tokio::spawn(async move { runner.drive(epoch, cancel).await });
    }

    /// Stop the timer without touching step statuses.
    ///
    /// The active step stays `Active`.
    pub fn pause(&self) {
        let at = {
            let mut inner = self.inner.write().unwrap();
            if !inner.phase.is_running() {
                debug!("pause ignored: no run in flight");
                return;
            }
            inner.invalidate();
            inner.phase = FlowPhase::Paused;
            self.tx.send_replace(inner.snapshot());
            inner
                .steps
                .iter()
                .find(|s| s.status.is_active())
                .map(|s| s.id.clone())
        };

        info!("flow paused");
        emit(&self.subs, RunnerEvent::FlowPaused { step: at });
    }

    /// Return every step to `Pending` and the cursor to the first step.
    pub fn reset(&self) {
        {
            let mut inner = self.inner.write().unwrap();
            inner.invalidate();
            for step in &mut inner.steps {
                step.status = StepStatus::Pending;
            }
            inner.cursor = 0;
            inner.phase = FlowPhase::Idle;
            inner.run_id = None;
            self.tx.send_replace(inner.snapshot());
        }

        debug!("flow reset");
        emit(&self.subs, RunnerEvent::FlowReset);
    }

    /// Mark a step failed on behalf of the host.
    ///
    /// Nothing inside the runner fails on its own; this is the only path to
    /// `StepStatus::Error`. Halts the run when one is in flight.
    pub fn mark_failed(&self, id: &StepId) {
        {
            let mut inner = self.inner.write().unwrap();
            let Some(pos) = inner.steps.iter().position(|s| s.id == *id) else {
                debug!(step = %id, "mark_failed ignored: unknown step");
                return;
            };
            inner.steps[pos].status = StepStatus::Error;
            if inner.phase.is_running() {
                inner.invalidate();
                inner.phase = FlowPhase::Paused;
            }
            self.tx.send_replace(inner.snapshot());
        }

        info!(step = %id, "step marked failed");
        emit(&self.subs, RunnerEvent::StepFailed { step: id.clone() });
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.inner.read().unwrap().snapshot()
    }

    /// Watch the plan; a fresh snapshot is published on every mutation.
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.tx.subscribe()
    }

    /// Suspend until no run is in flight (finished, paused, or reset).
    pub async fn wait_settled(&self) {
        let mut rx = self.subscribe();
        loop {
            let phase = rx.borrow().phase;
            if !phase.is_running() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    async fn drive(self, epoch: u64, cancel: CancellationToken) {
        loop {
            let mut finished_run = None;
            let next = {
                let mut inner = self.inner.write().unwrap();
                if inner.epoch != epoch {
                    return;
                }
                if inner.cursor < inner.steps.len() {
                    let cursor = inner.cursor;
                    inner.steps[cursor].status = StepStatus::Active;
                    let id = inner.steps[cursor].id.clone();
                    let duration = Duration::from_millis(inner.steps[cursor].duration_ms);
                    self.tx.send_replace(inner.snapshot());
                    Some((id, duration))
                } else {
                    inner.phase = FlowPhase::Finished;
                    inner.cancel = None;
                    finished_run = inner.run_id;
                    self.tx.send_replace(inner.snapshot());
                    None
                }
            };

            let Some((id, duration)) = next else {
                if let Some(run) = finished_run {
                    info!(run = %run, "flow run finished");
                    emit(&self.subs, RunnerEvent::FlowFinished { run });
                }
                return;
            };

            debug!(step = %id, ?duration, "step activated");
            emit(&self.subs, RunnerEvent::StepActivated { step: id.clone() });

            // Fixed-delay wait, raced against cancellation.
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(duration) => {}
            }

            {
                let mut inner = self.inner.write().unwrap();
                if inner.epoch != epoch {
                    return;
                }
                let cursor = inner.cursor;
                inner.steps[cursor].status = StepStatus::Completed;
                inner.cursor += 1;
                self.tx.send_replace(inner.snapshot());
            }

            debug!(step = %id, "step completed");
            emit(&self.subs, RunnerEvent::StepCompleted { step: id });
        }
    }
}
