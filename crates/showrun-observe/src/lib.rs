pub mod logger;
pub use logger::{LoggerConfig, LoggerError, LoggerFormat, logger_init};

#[cfg(feature = "subscriber")]
pub mod journal;
#[cfg(feature = "subscriber")]
pub use journal::Journal;
