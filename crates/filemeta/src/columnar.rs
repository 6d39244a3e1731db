// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Parquet footer extraction.
//!
//! Only the footer is decoded for metadata; no row data is touched. Sample
//! rows are a separate, bounded read.

use crate::Result;
use crate::footer;
use crate::model::{ColumnStats, FileMetadata, Overview, RowGroupStats, SchemaField};
use crate::statistics::{ChunkStatistics, Statistic};
use arrow::util::pretty::pretty_format_batches;
use bytes::Bytes;
use diagnostics::*;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::parquet_to_arrow_schema;
use parquet::file::metadata::{
    ColumnChunkMetaData, ParquetMetaData, ParquetMetaDataReader, RowGroupMetaData,
};
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde::Serialize;
use std::collections::BTreeMap;

/// First rows of a columnar file rendered as a text table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRows {
    pub rows: usize,
    pub table: String,
}

/// Read the footer of a Parquet file and normalize it. Key/value entries
/// that cannot be decoded are dropped and listed in `skipped_key_values`.
pub fn extract_metadata(data: Bytes) -> Result<FileMetadata> {
    let err = match SerializedFileReader::new(data.clone()) {
        Ok(reader) => return Ok(normalize(reader.metadata())),
        Err(err) => err,
    };
    let Some(repaired) = footer::repair(&data) else {
        return Err(err.into());
    };
    for key in &repaired.skipped {
        warn!("Skipped unreadable footer key/value entry {entry}", entry: key.as_str());
    }
    let meta = ParquetMetaDataReader::decode_metadata(&repaired.metadata)?;
    let mut normalized = normalize(&meta);
    normalized.skipped_key_values = repaired.skipped;
    Ok(normalized)
}

/// Normalize already-decoded footer metadata.
pub fn normalize(meta: &ParquetMetaData) -> FileMetadata {
    let file_meta = meta.file_metadata();

    let overview = Overview {
        row_count: file_meta.num_rows(),
        column_count: file_meta.schema_descr().num_columns(),
        row_group_count: meta.num_row_groups(),
        producer: file_meta.created_by().map(str::to_string),
    };

    FileMetadata {
        overview,
        schema: schema_fields(meta),
        key_values: key_values(meta),
        row_groups: meta.row_groups().iter().map(row_group_stats).collect(),
        skipped_key_values: Vec::new(),
    }
}

/// Read up to `limit` rows and render them with arrow's pretty printer.
pub fn sample_rows(data: Bytes, limit: usize) -> Result<SampleRows> {
    let limit = limit.max(1);
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?
        .with_batch_size(limit)
        .with_limit(limit)
        .build()?;

    let mut batches = Vec::new();
    let mut rows = 0;
    for batch in reader {
        let batch = batch?;
        rows += batch.num_rows();
        batches.push(batch);
    }

    let table = pretty_format_batches(&batches)?.to_string();
    debug!("Sampled {rows} rows", rows: rows);
    Ok(SampleRows { rows, table })
}

/// Fields of the embedded Arrow schema, or the Parquet leaf columns when the
/// Arrow conversion is not possible.
fn schema_fields(meta: &ParquetMetaData) -> Vec<SchemaField> {
    let file_meta = meta.file_metadata();
    match parquet_to_arrow_schema(file_meta.schema_descr(), file_meta.key_value_metadata()) {
        Ok(schema) => schema
            .fields()
            .iter()
            .map(|f| SchemaField {
                name: f.name().clone(),
                data_type: f.data_type().to_string(),
                nullable: f.is_nullable(),
            })
            .collect(),
        Err(e) => {
            let reason = e.to_string();
            warn!("Arrow schema unavailable, using Parquet leaf columns: {reason}", reason: reason);
            file_meta
                .schema_descr()
                .columns()
                .iter()
                .map(|c| SchemaField {
                    name: c.path().string(),
                    data_type: c.physical_type().to_string(),
                    nullable: c.max_def_level() > 0,
                })
                .collect()
        }
    }
}

/// Footer key/value pairs. A key without a value maps to the empty string.
fn key_values(meta: &ParquetMetaData) -> BTreeMap<String, String> {
    meta.file_metadata()
        .key_value_metadata()
        .map(|kvs| {
            kvs.iter()
                .map(|kv| (kv.key.clone(), kv.value.clone().unwrap_or_default()))
                .collect()
        })
        .unwrap_or_default()
}

fn row_group_stats(rg: &RowGroupMetaData) -> RowGroupStats {
    RowGroupStats {
        row_count: rg.num_rows(),
        byte_size: rg.total_byte_size(),
        columns: rg.columns().iter().map(column_stats).collect(),
    }
}

fn column_stats(chunk: &ColumnChunkMetaData) -> ColumnStats {
    let stats = ChunkStatistics::new(chunk);
    let path = chunk.column_path().string();

    if !stats.present() {
        debug!("No statistics recorded for column {path}", path: path.as_str());
    }
    for statistic in [Statistic::Min, Statistic::Max] {
        if !stats.supports(statistic) {
            let name = statistic.to_string();
            debug!("Statistic {statistic} not defined for column {path}", statistic: name, path: path.as_str());
        }
    }

    ColumnStats {
        physical_type: chunk.column_type().to_string(),
        compression: chunk.compression().to_string(),
        encodings: chunk.encodings().iter().map(ToString::to_string).collect(),
        null_count: stats.null_count(),
        distinct_count: stats.distinct_count(),
        min: stats.min(),
        max: stats.max(),
        value_count: stats.value_count(),
        path,
    }
}
