//! Shared logging utilities for consistent tracing across the resolver

use chrono::{DateTime, Utc};
use tracing::info;

/// Default filter directives for a given base level
pub fn default_filter(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    format!("nip_resolver={base_level},shared={base_level},reqwest=warn,hyper=warn")
}

/// Initialize the stderr tracing subscriber.
///
/// `RUST_LOG` takes precedence over the level passed in.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    // A second init (tests, embedding apps) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for NIP-aware info logging
#[macro_export]
macro_rules! nip_info {
    ($nip:expr, $($arg:tt)*) => {
        tracing::info!(
            nip = %$nip,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for NIP-aware warning logging
#[macro_export]
macro_rules! nip_warn {
    ($nip:expr, $($arg:tt)*) => {
        tracing::warn!(
            nip = %$nip,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for NIP-aware debug logging
#[macro_export]
macro_rules! nip_debug {
    ($nip:expr, $($arg:tt)*) => {
        tracing::debug!(
            nip = %$nip,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(details: &str) {
    info!(timestamp = format_timestamp(), "🚀 Starting {}", details);
}

/// Contextual logging helper for success conditions
pub fn log_success(message: &str) {
    info!(timestamp = format_timestamp(), "✅ {}", message);
}
