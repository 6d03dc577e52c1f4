//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Install the JSON subscriber with [`DEFAULT_DIRECTIVES`].
pub fn init() {
    init_with(DEFAULT_DIRECTIVES);
}

/// Install the JSON subscriber, preferring `RUST_LOG` over `default_directives`.
///
/// Returns `false` when a global subscriber was already installed; the call is
/// then a no-op.
pub fn init_with(default_directives: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(default_directives, "tracing initialized");
    }
    installed
}
