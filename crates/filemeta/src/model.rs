// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Format-normalized metadata and record model.
//!
//! Every extractor produces one of these shapes. All values are plain data
//! owned by the caller; nothing here caches state between extractions.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Key under which an unparseable input line is preserved verbatim.
pub const RAW_LINE_KEY: &str = "_raw_line";

/// Key wrapping a record value that is not itself an object.
pub const VALUE_KEY: &str = "value";

/// Metadata of a columnar file, read from the footer alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    pub overview: Overview,
    pub schema: Vec<SchemaField>,
    pub key_values: BTreeMap<String, String>,
    pub row_groups: Vec<RowGroupStats>,
    /// Keys of footer entries dropped because they could not be decoded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_key_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub row_count: i64,
    pub column_count: usize,
    pub row_group_count: usize,
    /// Writer identification ("created by"), when recorded.
    pub producer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowGroupStats {
    pub row_count: i64,
    pub byte_size: i64,
    pub columns: Vec<ColumnStats>,
}

/// Per column-chunk details. Each statistic is `None` when the file does not
/// carry it or when it is meaningless for the column's physical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub path: String,
    pub physical_type: String,
    pub compression: String,
    pub encodings: BTreeSet<String>,
    pub null_count: Option<u64>,
    pub distinct_count: Option<u64>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub value_count: Option<i64>,
}

impl FileMetadata {
    /// Uncompressed data size summed over row groups.
    pub fn total_byte_size(&self) -> i64 {
        self.row_groups.iter().map(|rg| rg.byte_size).sum()
    }
}

/// A loosely typed record.
pub type Record = Map<String, Value>;

/// Ordered records read from a non-columnar file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSet {
    pub records: Vec<Record>,
    /// True when reading stopped at the configured record ceiling.
    pub truncated: bool,
    /// Writer schema embedded in the file, for self-describing formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Union of record keys in first-seen order. Records may be heterogeneous.
    pub fn column_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    names.push(key.clone());
                }
            }
        }
        names
    }

    /// Number of records preserved as raw text because they failed to parse.
    pub fn malformed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.len() == 1 && r.contains_key(RAW_LINE_KEY))
            .count()
    }
}

/// Turn any JSON value into a record, wrapping non-objects under [`VALUE_KEY`].
pub fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert(VALUE_KEY.to_string(), other);
            map
        }
    }
}

/// Record preserving a line that could not be parsed.
pub fn raw_line_record(line: &str) -> Record {
    let mut map = Map::new();
    map.insert(RAW_LINE_KEY.to_string(), Value::String(line.to_string()));
    map
}
