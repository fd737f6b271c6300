pub mod error;
pub use error::CoreError;

pub mod config;
pub use config::ToolRunnerConfig;

pub mod events;
pub use events::{RunnerEvent, Subscribe};

pub mod flow;
pub use flow::{FlowRunner, FlowSnapshot};

pub mod tools;
pub use tools::{ToolRunner, ToolsSnapshot};
