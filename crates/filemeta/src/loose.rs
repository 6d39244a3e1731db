// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! JSON records: a single document, an array of documents, or one document
//! per line.

use crate::model::{RecordSet, into_record, raw_line_record};
use diagnostics::*;
use serde_json::Value;

/// Parse JSON text into records. Never fails: lines that do not parse are
/// kept as raw-line records.
pub fn read_json(data: &[u8]) -> RecordSet {
    if let Ok(value) = serde_json::from_slice::<Value>(data) {
        let records = match value {
            Value::Array(items) => items.into_iter().map(into_record).collect(),
            other => vec![into_record(other)],
        };
        return RecordSet {
            records,
            ..Default::default()
        };
    }

    let text = String::from_utf8_lossy(data);
    let mut set = RecordSet::default();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => set.records.push(into_record(value)),
            Err(e) => {
                let line_number = number + 1;
                let reason = e.to_string();
                debug!("Keeping malformed line {line_number} as raw text: {reason}", line_number: line_number, reason: reason);
                set.records.push(raw_line_record(line));
            }
        }
    }

    let malformed = set.malformed_count();
    if malformed > 0 {
        warn!("{malformed} of {total} lines were not valid JSON", malformed: malformed, total: set.len());
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RAW_LINE_KEY, VALUE_KEY};
    use serde_json::json;

    #[test]
    fn test_single_object() {
        let set = read_json(br#"{"a":1}"#);
        assert_eq!(set.len(), 1);
        assert_eq!(set.records[0].get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_array_of_objects() {
        let set = read_json(br#"[{"a":1},{"a":2}]"#);
        assert_eq!(set.len(), 2);
        assert_eq!(set.records[1].get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_newline_delimited_with_bad_line() {
        let set = read_json(b"{\"a\":1}\n{\"b\":2}\nnot-json\n");
        assert_eq!(set.len(), 3);
        assert_eq!(set.records[0].get("a"), Some(&json!(1)));
        assert_eq!(set.records[1].get("b"), Some(&json!(2)));
        assert_eq!(set.records[2].get(RAW_LINE_KEY), Some(&json!("not-json")));
        assert_eq!(set.malformed_count(), 1);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let set = read_json(b"\n{\"a\":1}\n\n   \n{\"a\":2}\r\n");
        assert_eq!(set.len(), 2);
        assert_eq!(set.malformed_count(), 0);
    }

    #[test]
    fn test_scalar_elements_are_wrapped() {
        let set = read_json(b"[1, \"two\", {\"x\": 3}]");
        assert_eq!(set.len(), 3);
        assert_eq!(set.records[0].get(VALUE_KEY), Some(&json!(1)));
        assert_eq!(set.records[1].get(VALUE_KEY), Some(&json!("two")));
        assert_eq!(set.records[2].get("x"), Some(&json!(3)));
    }

    #[test]
    fn test_empty_input() {
        assert!(read_json(b"").is_empty());
        assert!(read_json(b"\n\n").is_empty());
    }
}
