// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structured logging shared by the tablescope crates.
//!
//! The level is taken from the `TABLESCOPE_LOG` environment variable:
//! - `off` (default): nothing is emitted
//! - `error`, `warn`, `info`, `debug`: events at or above that level go to stderr

use std::sync::Once;

// Re-exported so the macros below resolve `emit` through this crate.
pub use emit;

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "TABLESCOPE_LOG";

static INIT: Once = Once::new();

/// Map a level name to an emit level. `None` means logging is disabled.
///
/// Unknown names fall back to `Info`.
#[must_use]
pub fn parse_level(name: &str) -> Option<emit::Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "off" | "none" => None,
        "error" => Some(emit::Level::Error),
        "warn" | "warning" => Some(emit::Level::Warn),
        "debug" | "trace" => Some(emit::Level::Debug),
        _ => Some(emit::Level::Info),
    }
}

/// Initialize logging from `TABLESCOPE_LOG`.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    let name = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    init_with_level(&name);
}

/// Initialize logging with an explicit level name (see [`parse_level`]).
pub fn init_with_level(name: &str) {
    let Some(level) = parse_level(name) else {
        return;
    };
    INIT.call_once(|| {
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();
        // The runtime has to outlive every emitting thread.
        std::mem::forget(rt);
    });
}

pub use init_diagnostics as init;

/// Operations a user would want to see: resolved locations, selected files.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Step-by-step detail: statistic fallbacks, record counts, patterns.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable problems: skipped entries, degraded summaries.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}
