//! Opt-in global `tracing` subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{HttpError, Result};

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Environment variable switching to plain console output when non-blank.
pub const ENV_LOGGER_TYPE: &str = "LOGGER_TYPE";

/// Installs a global subscriber configured from `LOG_LEVEL` and `LOGGER_TYPE`.
///
/// Fails when a global subscriber is already installed.
pub fn init_from_env() -> Result<()> {
    let level = level_directive(std::env::var(ENV_LOG_LEVEL).ok().as_deref());
    let console = std::env::var(ENV_LOGGER_TYPE).is_ok_and(|value| !value.trim().is_empty());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(level));
    let result = if console {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_ansi(false)
                    .with_target(false),
            )
            .try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    result.map_err(|err| HttpError::Logger(err.to_string()))
}

fn level_directive(value: Option<&str>) -> &'static str {
    match value.map(str::trim) {
        Some("panic" | "fatal" | "error") => "error",
        Some("warn") => "warn",
        Some("debug") => "debug",
        Some("trace") => "trace",
        _ => "info",
    }
}
