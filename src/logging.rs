//! Logging infrastructure.
//!
//! The compiler emits structured `tracing` events at decision points
//! (predicate composition, join planning, mapper failures). This module
//! provides optional subscriber initialisation controlled by environment
//! variables:
//!
//! - `SIFT_DEBUG=true|1|yes` - enable debug logging
//! - `SIFT_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//! - `SIFT_LOG_FORMAT=json|pretty|compact` - set the output format
//!
//! Applications that install their own subscriber can ignore this module
//! entirely; the compiler only ever uses the `tracing` macros.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via the `SIFT_DEBUG` environment
/// variable.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SIFT_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `SIFT_LOG_LEVEL`.
///
/// Defaults to "debug" when `SIFT_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    match env::var("SIFT_LOG_LEVEL").as_deref() {
        Ok("trace") => "trace",
        Ok("debug") => "debug",
        Ok("info") => "info",
        Ok("warn") => "warn",
        Ok("error") => "error",
        _ => {
            if is_debug_enabled() {
                "debug"
            } else {
                "warn"
            }
        }
    }
}

/// Get the configured log format from `SIFT_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("SIFT_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialise the logging subscriber.
///
/// Call once at application startup; subsequent calls are no-ops. Does
/// nothing unless `SIFT_DEBUG` or `SIFT_LOG_LEVEL` is set, and requires
/// the `tracing-subscriber` feature to install anything.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SIFT_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{fmt, prelude::*, EnvFilter};

            let filter = EnvFilter::try_new(format!("sift={}", get_log_level()))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "pretty" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .init(),
            }
        }
    });
}

/// Initialise logging with a specific level.
///
/// Equivalent to setting `SIFT_LOG_LEVEL` and calling [`init`]. Modifies
/// the process environment: call this early, before spawning threads.
///
/// # Example
///
/// ```rust,no_run
/// use sift::logging;
///
/// logging::init_with_level("trace");
/// ```
pub fn init_with_level(level: &str) {
    env::set_var("SIFT_LOG_LEVEL", level);
    init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_defaults_to_warn() {
        if env::var("SIFT_DEBUG").is_err() && env::var("SIFT_LOG_LEVEL").is_err() {
            assert_eq!(get_log_level(), "warn");
        }
    }
}
