//! Tracing, logging and user-facing notices (shared setup).

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Developer/user notices ("toasts").
pub mod notify;

pub use notify::{Notice, Notifier, RecordingNotifier, Severity, TracingNotifier};
