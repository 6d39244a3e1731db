// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Avro object container files.
//!
//! Records are decoded with the writer schema stored in the file header; no
//! reader schema is applied.

use crate::Result;
use crate::model::{RecordSet, into_record};
use apache_avro::Reader;
use diagnostics::*;
use std::io::Read;

/// Default ceiling on records read from one file.
pub const DEFAULT_MAX_RECORDS: usize = 1_000_000;

/// Stream records out of an Avro container, stopping after `max_records`.
pub fn read_avro<R: Read>(input: R, max_records: usize) -> Result<RecordSet> {
    let reader = Reader::new(input)?;
    let schema = reader.writer_schema().canonical_form();

    let mut set = RecordSet {
        schema: Some(schema),
        ..Default::default()
    };

    for value in reader {
        if set.records.len() >= max_records {
            set.truncated = true;
            let limit = max_records;
            warn!("Stopped reading Avro records at ceiling {limit}", limit: limit);
            break;
        }
        let json = serde_json::Value::try_from(value?)?;
        set.records.push(into_record(json));
    }

    debug!("Read {count} Avro records", count: set.records.len());
    Ok(set)
}
