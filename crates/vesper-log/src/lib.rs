//! Tracing subscriber setup shared by the vesper binaries.
//!
//! Library crates log through the `log` facade; `tracing-subscriber`'s
//! `tracing-log` bridge picks those records up alongside native `tracing`
//! events. Console output is always on. Debug builds also write JSON lines to
//! `vesper.log` for post-mortem analysis.

use std::path::{Path, PathBuf};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vesper_config::Config;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

pub const LOG_FILE_NAME: &str = "vesper.log";

/// The filter directive to use: the config's `debug.log_level` when set, else [`DEFAULT_FILTER`].
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Where the JSON log lands for a given log directory.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the config. The file layer is only added
/// when `debug_build` is set and `log_dir` can be created; failing that,
/// logging continues on the console alone.
///
/// ```no_run
/// use vesper_config::Config;
/// use vesper_log::init_logging;
///
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&Config::default()));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let directive = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_file_path(log_dir))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        tracing::debug!(
            filter = %directive,
            file = %log_file_path(log_dir).display(),
            "Logging initialized"
        );
        return;
    }

    subscriber.init();
    tracing::debug!(filter = %directive, "Logging initialized");
}

/// [`EnvFilter`] built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
