//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging. The log level comes
//! from config, with `RUST_LOG` taking precedence when set. Debug builds get
//! human-readable terminal output; release builds emit JSON for log shipping.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive for a configured level.
///
/// Scopes the level to this crate as well as the root so that chatty
/// dependencies (sqlx, reqwest) stay at their own defaults.
fn filter_for(log_level: &str) -> String {
    format!("{log_level},lino_engine={log_level}")
}

/// Initialize the tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops. `RUST_LOG` overrides
/// the configured level entirely when present.
pub fn init(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(log_level)));

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(false))
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }
}
