// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Human-readable rendering of catalog values.

use chrono::{DateTime, NaiveDateTime};

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

/// `1536` -> `1.50 KB`. Unknown sizes render as `N/A`.
pub fn format_bytes(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return "N/A".to_string();
    };
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Render a catalog timestamp as `%Y-%m-%d %H:%M:%S`, or return the text
/// unchanged when it does not parse.
pub fn format_timestamp(raw: &str) -> String {
    const OUT: &str = "%Y-%m-%d %H:%M:%S";
    let text = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return ts.format(OUT).to_string();
    }
    for layout in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(ts) = DateTime::parse_from_str(text, layout) {
            return ts.format(OUT).to_string();
        }
    }
    for layout in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, layout) {
            return ts.format(OUT).to_string();
        }
    }
    raw.to_string()
}
