// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Footer repair for key/value entries that cannot be decoded.
//!
//! The footer is a Thrift compact-protocol `FileMetaData` struct. Field 5
//! holds the key/value list, each entry a struct with a string key (1) and
//! an optional string value (2). A single entry that is not valid UTF-8
//! makes the whole footer undecodable, so [`repair`] copies the footer
//! unchanged except for dropping those entries.

const MAGIC: &[u8] = b"PAR1";
const FOOTER_TAIL: usize = 8;
const KEY_VALUE_FIELD: i16 = 5;
const MAX_DEPTH: usize = 64;

const BOOL_TRUE: u8 = 1;
const BOOL_FALSE: u8 = 2;
const BYTE: u8 = 3;
const I16: u8 = 4;
const I32: u8 = 5;
const I64: u8 = 6;
const DOUBLE: u8 = 7;
const BINARY: u8 = 8;
const LIST: u8 = 9;
const SET: u8 = 10;
const MAP: u8 = 11;
const STRUCT: u8 = 12;

/// Footer bytes with unreadable key/value entries removed.
#[derive(Debug)]
pub(crate) struct RepairedFooter {
    pub metadata: Vec<u8>,
    /// Keys of the dropped entries, lossily decoded.
    pub skipped: Vec<String>,
}

/// Rebuild the footer of `data` without its unreadable key/value entries.
/// `None` when the footer cannot be walked or has nothing to drop.
pub(crate) fn repair(data: &[u8]) -> Option<RepairedFooter> {
    let repaired = drop_unreadable_key_values(footer_bytes(data)?)?;
    (!repaired.skipped.is_empty()).then_some(repaired)
}

fn footer_bytes(data: &[u8]) -> Option<&[u8]> {
    let len = data.len();
    if len < FOOTER_TAIL + MAGIC.len() || data.get(len - MAGIC.len()..)? != MAGIC {
        return None;
    }
    let length_bytes: [u8; 4] = data.get(len - FOOTER_TAIL..len - MAGIC.len())?.try_into().ok()?;
    let metadata_len = usize::try_from(u32::from_le_bytes(length_bytes)).ok()?;
    let end = len - FOOTER_TAIL;
    data.get(end.checked_sub(metadata_len)?..end)
}

fn drop_unreadable_key_values(metadata: &[u8]) -> Option<RepairedFooter> {
    let mut cursor = Cursor::new(metadata);
    let mut out = Vec::with_capacity(metadata.len());
    let mut skipped = Vec::new();
    let mut last_id = 0;

    loop {
        let start = cursor.pos;
        let Some((kind, id)) = cursor.field_header(last_id)? else {
            out.extend_from_slice(metadata.get(start..)?);
            return Some(RepairedFooter {
                metadata: out,
                skipped,
            });
        };
        last_id = id;

        if id == KEY_VALUE_FIELD && kind == LIST {
            out.extend_from_slice(metadata.get(start..cursor.pos)?);
            let (element, size) = cursor.list_header()?;
            let mut kept = Vec::with_capacity(size);
            for _ in 0..size {
                let entry_start = cursor.pos;
                let entry = cursor.key_value_entry()?;
                if entry.readable {
                    kept.push(metadata.get(entry_start..cursor.pos)?);
                } else {
                    skipped.push(entry.key);
                }
            }
            write_list_header(&mut out, element, kept.len());
            for entry in kept {
                out.extend_from_slice(entry);
            }
        } else {
            cursor.skip_field(kind, 0)?;
            out.extend_from_slice(metadata.get(start..cursor.pos)?);
        }
    }
}

fn write_list_header(out: &mut Vec<u8>, element: u8, size: usize) {
    if size < 15 {
        // size < 15 fits in the high nibble
        out.push(((size as u8) << 4) | element);
    } else {
        out.push(0xf0 | element);
        let mut n = size as u64;
        while n >= 0x80 {
            out.push((n as u8 & 0x7f) | 0x80);
            n >>= 7;
        }
        out.push(n as u8);
    }
}

struct KeyValueEntry {
    key: String,
    readable: bool,
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn byte(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.buf.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn varint(&mut self) -> Option<u64> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let b = self.byte()?;
            if shift >= 64 {
                return None;
            }
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Some(value);
            }
            shift += 7;
        }
    }

    fn length(&mut self) -> Option<usize> {
        usize::try_from(self.varint()?).ok()
    }

    /// `None` inside the option marks the end of a struct.
    fn field_header(&mut self, last_id: i16) -> Option<Option<(u8, i16)>> {
        let b = self.byte()?;
        if b == 0 {
            return Some(None);
        }
        let delta = b >> 4;
        let id = if delta == 0 {
            let raw = self.varint()?;
            i16::try_from(((raw >> 1) as i64) ^ -((raw & 1) as i64)).ok()?
        } else {
            last_id.checked_add(i16::from(delta))?
        };
        Some(Some((b & 0x0f, id)))
    }

    fn list_header(&mut self) -> Option<(u8, usize)> {
        let b = self.byte()?;
        let size = match b >> 4 {
            15 => self.length()?,
            n => usize::from(n),
        };
        Some((b & 0x0f, size))
    }

    /// Struct fields carry booleans in the header; everything else has a body.
    fn skip_field(&mut self, kind: u8, depth: usize) -> Option<()> {
        match kind {
            BOOL_TRUE | BOOL_FALSE => Some(()),
            _ => self.skip_value(kind, depth),
        }
    }

    fn skip_value(&mut self, kind: u8, depth: usize) -> Option<()> {
        if depth > MAX_DEPTH {
            return None;
        }
        match kind {
            BOOL_TRUE | BOOL_FALSE | BYTE => self.byte().map(|_| ()),
            I16 | I32 | I64 => self.varint().map(|_| ()),
            DOUBLE => self.take(8).map(|_| ()),
            BINARY => {
                let len = self.length()?;
                self.take(len).map(|_| ())
            }
            LIST | SET => {
                let (element, size) = self.list_header()?;
                for _ in 0..size {
                    self.skip_value(element, depth + 1)?;
                }
                Some(())
            }
            MAP => {
                let size = self.length()?;
                if size > 0 {
                    let kinds = self.byte()?;
                    for _ in 0..size {
                        self.skip_value(kinds >> 4, depth + 1)?;
                        self.skip_value(kinds & 0x0f, depth + 1)?;
                    }
                }
                Some(())
            }
            STRUCT => self.skip_struct(depth + 1),
            _ => None,
        }
    }

    fn skip_struct(&mut self, depth: usize) -> Option<()> {
        let mut last_id = 0;
        while let Some((kind, id)) = self.field_header(last_id)? {
            last_id = id;
            self.skip_field(kind, depth)?;
        }
        Some(())
    }

    fn key_value_entry(&mut self) -> Option<KeyValueEntry> {
        let mut key = String::new();
        let mut readable = true;
        let mut last_id = 0;
        while let Some((kind, id)) = self.field_header(last_id)? {
            last_id = id;
            if kind == BINARY && (id == 1 || id == 2) {
                let len = self.length()?;
                let bytes = self.take(len)?;
                readable &= std::str::from_utf8(bytes).is_ok();
                if id == 1 {
                    key = String::from_utf8_lossy(bytes).into_owned();
                }
            } else {
                self.skip_field(kind, 1)?;
            }
        }
        Some(KeyValueEntry { key, readable })
    }
}
