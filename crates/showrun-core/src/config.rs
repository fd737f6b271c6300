use std::time::Duration;

/// Tuning for the tool bench ticker.
#[derive(Debug, Clone)]
pub struct ToolRunnerConfig {
    /// Fixed delay between progress ticks.
    pub tick: Duration,
    /// Upper bound (exclusive) of the random progress increment per tick.
    pub max_increment: f64,
    /// Pause inserted between tools while a batch runs.
    pub settle_delay: Duration,
    /// Seed for the progress RNG. `None` seeds from the OS, a fixed value
    /// makes a run reproducible.
    pub seed: Option<u64>,
}

impl Default for ToolRunnerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            max_increment: 20.0,
            settle_delay: Duration::from_millis(500),
            seed: None,
        }
    }
}
