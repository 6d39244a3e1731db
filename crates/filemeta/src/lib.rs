// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Structural metadata for data files found under a table's storage prefix.
//!
//! Three families are understood, chosen by file extension:
//!
//! - **Parquet**: footer-only metadata (overview, schema, key/values, row
//!   group and column statistics) plus an optional bounded row sample
//! - **Avro**: records decoded with the schema embedded in the file
//! - **JSON**: whole-document or newline-delimited records, keeping
//!   malformed lines as raw text
//!
//! Every function here is a pure transformation of file bytes; nothing is
//! cached between calls.

mod error;
mod footer;

pub mod columnar;
pub mod loose;
pub mod model;
pub mod records;
pub mod statistics;

#[cfg(test)]
pub(crate) mod test_support;

pub use columnar::SampleRows;
pub use error::ExtractError;
pub use model::{
    ColumnStats, FileMetadata, Overview, RAW_LINE_KEY, Record, RecordSet, RowGroupStats,
    SchemaField, VALUE_KEY,
};
pub use records::DEFAULT_MAX_RECORDS;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// File families with a dedicated extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileFormat {
    Parquet,
    Avro,
    Json,
}

impl FileFormat {
    /// Pick the format from the extension of an object name or path.
    pub fn from_name(name: &str) -> Result<Self> {
        let extension = extension_of(name);
        match extension.as_str() {
            "parquet" => Ok(FileFormat::Parquet),
            "avro" => Ok(FileFormat::Avro),
            "json" | "ndjson" | "jsonl" => Ok(FileFormat::Json),
            _ => Err(ExtractError::unsupported(extension, name)),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileFormat::Parquet => "parquet",
            FileFormat::Avro => "avro",
            FileFormat::Json => "json",
        })
    }
}

/// Lowercased extension of the last path segment, without the dot.
fn extension_of(name: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// What to produce for a columnar file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnarView {
    #[default]
    Metadata,
    Sample,
    Both,
}

impl ColumnarView {
    pub fn wants_metadata(self) -> bool {
        matches!(self, ColumnarView::Metadata | ColumnarView::Both)
    }

    pub fn wants_sample(self) -> bool {
        matches!(self, ColumnarView::Sample | ColumnarView::Both)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Ceiling on records read from a self-describing record file.
    pub max_records: usize,
    /// Rows shown when a columnar sample is requested.
    pub sample_rows: usize,
    pub view: ColumnarView,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            sample_rows: 100,
            view: ColumnarView::Metadata,
        }
    }
}

/// Normalized content of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Extracted {
    Columnar {
        /// Footer metadata. Always read, since summaries are built from it.
        metadata: FileMetadata,
        #[serde(skip_serializing_if = "Option::is_none")]
        sample: Option<SampleRows>,
    },
    Records(RecordSet),
}

impl Extracted {
    pub fn format(&self) -> FileFormat {
        match self {
            Extracted::Columnar { .. } => FileFormat::Parquet,
            Extracted::Records(set) if set.schema.is_some() => FileFormat::Avro,
            Extracted::Records(_) => FileFormat::Json,
        }
    }
}

/// Dispatch on the extension of `name` and extract `data`.
pub fn extract(name: &str, data: Bytes, options: &ExtractOptions) -> Result<Extracted> {
    match FileFormat::from_name(name)? {
        FileFormat::Parquet => {
            let metadata = columnar::extract_metadata(data.clone())?;
            let sample = if options.view.wants_sample() {
                Some(columnar::sample_rows(data, options.sample_rows)?)
            } else {
                None
            };
            Ok(Extracted::Columnar { metadata, sample })
        }
        FileFormat::Avro => Ok(Extracted::Records(records::read_avro(
            data.as_ref(),
            options.max_records,
        )?)),
        FileFormat::Json => Ok(Extracted::Records(loose::read_json(&data))),
    }
}

/// Read a local file and extract it.
pub fn extract_path<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Extracted> {
    let path = path.as_ref();
    let name = path.to_string_lossy();
    // Reject unknown types before reading the file.
    let _ = FileFormat::from_name(&name)?;
    let data = Bytes::from(std::fs::read(path)?);
    extract(&name, data, options)
}
