// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering of extracted content.

use filemeta::{ColumnStats, ColumnarView, Extracted, FileMetadata, RecordSet, SampleRows};
use serde_json::Value;
use std::fmt::Write;
use tablescope::format_bytes;

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn render_extracted(content: &Extracted, view: ColumnarView) -> String {
    match content {
        Extracted::Columnar { metadata, sample } => {
            let mut out = String::new();
            // The footer is always read; show it only when asked for.
            if view.wants_metadata() {
                out.push_str(&render_metadata(metadata));
            }
            if let Some(sample) = sample {
                out.push_str(&render_sample(sample));
            }
            out
        }
        Extracted::Records(records) => render_records(records),
    }
}

pub fn render_metadata(metadata: &FileMetadata) -> String {
    let mut out = String::new();
    let overview = &metadata.overview;
    out.push_str("=== Overview ===\n");
    let _ = writeln!(out, "Rows: {}", overview.row_count);
    let _ = writeln!(out, "Columns: {}", overview.column_count);
    let _ = writeln!(out, "Row groups: {}", overview.row_group_count);
    let _ = writeln!(
        out,
        "Size: {}",
        format_bytes(u64::try_from(metadata.total_byte_size()).ok())
    );
    let _ = writeln!(out, "Producer: {}", or_dash(overview.producer.as_deref()));

    let _ = writeln!(out, "\n=== Schema: {} fields ===", metadata.schema.len());
    for field in &metadata.schema {
        let nullable = if field.nullable { " (nullable)" } else { "" };
        let _ = writeln!(out, "  * {}: {}{}", field.name, field.data_type, nullable);
    }

    if !metadata.key_values.is_empty() {
        out.push_str("\n=== Key/Value Metadata ===\n");
        for (key, value) in &metadata.key_values {
            let _ = writeln!(out, "  {key} = {}", truncate(value, 120));
        }
    }
    if !metadata.skipped_key_values.is_empty() {
        let _ = writeln!(
            out,
            "Unreadable key/value entries skipped: {}",
            metadata.skipped_key_values.join(", ")
        );
    }

    for (i, rg) in metadata.row_groups.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n=== Row group {i}: {} rows, {} ===",
            rg.row_count,
            format_bytes(u64::try_from(rg.byte_size).ok())
        );
        for column in &rg.columns {
            out.push_str(&render_column(column));
        }
    }
    out
}

fn render_column(column: &ColumnStats) -> String {
    let encodings = column.encodings.iter().cloned().collect::<Vec<_>>().join(",");
    format!(
        "  {} [{} {} {}] nulls={} distinct={} min={} max={} values={}\n",
        column.path,
        column.physical_type,
        column.compression,
        encodings,
        or_dash(column.null_count),
        or_dash(column.distinct_count),
        or_dash(column.min.as_deref().map(|v| truncate(v, 40))),
        or_dash(column.max.as_deref().map(|v| truncate(v, 40))),
        or_dash(column.value_count),
    )
}

pub fn render_sample(sample: &SampleRows) -> String {
    format!("\n=== Sample: {} rows ===\n{}\n", sample.rows, sample.table)
}

pub fn render_records(records: &RecordSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Records: {} ===", records.len());
    if let Some(schema) = &records.schema {
        let _ = writeln!(out, "Schema: {}", truncate(schema, 200));
    }
    if records.truncated {
        out.push_str("(truncated at the record limit)\n");
    }
    let malformed = records.malformed_count();
    if malformed > 0 {
        let _ = writeln!(out, "Malformed lines kept as raw text: {malformed}");
    }

    let columns = records.column_names();
    if columns.is_empty() {
        return out;
    }
    let _ = writeln!(out, "{}", columns.join(" | "));
    for record in records.iter() {
        let row = columns
            .iter()
            .map(|c| match record.get(c) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => truncate(s, 60),
                Some(other) => truncate(&other.to_string(), 60),
            })
            .collect::<Vec<_>>();
        let _ = writeln!(out, "{}", row.join(" | "));
    }
    out
}

/// Cut `s` to `max` characters, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
