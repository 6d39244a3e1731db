// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory fixtures for extractor tests.

use apache_avro::types::Record as AvroRecord;
use apache_avro::{Schema, Writer};
use arrow_array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema as ArrowSchema};
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::sync::Arc;

fn sample_batch() -> RecordBatch {
    let schema = Arc::new(ArrowSchema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("city", DataType::Utf8, true),
    ]));
    let ids: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5]));
    let cities: ArrayRef = Arc::new(StringArray::from(vec![
        Some("Oslo"),
        Some("Bergen"),
        Some("Lisbon"),
        None,
        Some("Tromso"),
    ]));
    RecordBatch::try_new(schema, vec![ids, cities]).expect("batch")
}

fn write_parquet(props: WriterProperties) -> Bytes {
    let batch = sample_batch();
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props)).expect("writer");
    writer.write(&batch).expect("write");
    let _ = writer.close().expect("close");
    Bytes::from(buffer)
}

/// Five rows in three row groups (2, 2, 1) with an `origin` footer entry.
pub fn sample_parquet() -> Bytes {
    let props = WriterProperties::builder()
        .set_max_row_group_size(2)
        .set_key_value_metadata(Some(vec![KeyValue::new(
            "origin".to_string(),
            "unit-test".to_string(),
        )]))
        .build();
    write_parquet(props)
}

/// `sample_parquet` with the `origin` footer value no longer valid UTF-8.
pub fn sample_parquet_with_unreadable_key_value() -> Bytes {
    let mut data = sample_parquet().to_vec();
    let at = data
        .windows(b"unit-test".len())
        .position(|w| w == b"unit-test")
        .expect("origin value");
    data[at] = 0xff;
    Bytes::from(data)
}

/// Same rows, written without any column statistics.
pub fn sample_parquet_without_stats() -> Bytes {
    let props = WriterProperties::builder()
        .set_max_row_group_size(2)
        .set_statistics_enabled(EnabledStatistics::None)
        .build();
    write_parquet(props)
}

const READING_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "reading",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "name", "type": "string"}
    ]
}
"#;

/// An Avro container with `count` records `{id: i, name: "row-i"}`.
pub fn sample_avro(count: usize) -> Vec<u8> {
    let schema = Schema::parse_str(READING_SCHEMA).expect("schema");
    let mut writer = Writer::new(&schema, Vec::new());
    for i in 0..count {
        let mut record = AvroRecord::new(writer.schema()).expect("record");
        record.put("id", i as i64);
        record.put("name", format!("row-{i}"));
        writer.append(record).expect("append");
    }
    writer.into_inner().expect("flush")
}
