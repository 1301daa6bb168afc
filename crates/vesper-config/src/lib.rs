//! Runtime settings for the batcher, the profiler and logging.
//!
//! Settings persist to `config.ron` and may be overridden from the command
//! line. Every section defaults field by field, so older and newer files both
//! load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{BatchConfig, CONFIG_FILE_NAME, Config, DebugConfig, ProfilerConfig};
pub use error::ConfigError;
