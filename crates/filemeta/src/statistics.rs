// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Optional-result access to column chunk statistics.
//!
//! Not every physical/logical type defines every statistic: INT96 and
//! intervals have no defined ordering, so min/max are meaningless for them,
//! and writers are free to omit distinct counts entirely. Callers ask
//! [`ChunkStatistics::supports`] or read the `Option` accessors; nothing here
//! fails.

use parquet::basic::{ColumnOrder, SortOrder};
use parquet::file::metadata::ColumnChunkMetaData;
use parquet::file::statistics::Statistics;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    NullCount,
    DistinctCount,
    Min,
    Max,
    ValueCount,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Statistic::NullCount => "null_count",
            Statistic::DistinctCount => "distinct_count",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::ValueCount => "value_count",
        };
        f.write_str(name)
    }
}

/// Whether a statistic is defined for a column with the given sort order.
#[must_use]
pub fn supports(sort_order: SortOrder, statistic: Statistic) -> bool {
    match statistic {
        Statistic::Min | Statistic::Max => !matches!(sort_order, SortOrder::UNDEFINED),
        Statistic::NullCount | Statistic::DistinctCount | Statistic::ValueCount => true,
    }
}

/// Statistics view over one column chunk.
pub struct ChunkStatistics<'a> {
    chunk: &'a ColumnChunkMetaData,
    sort_order: SortOrder,
}

impl<'a> ChunkStatistics<'a> {
    pub fn new(chunk: &'a ColumnChunkMetaData) -> Self {
        let descr = chunk.column_descr();
        let sort_order = ColumnOrder::get_sort_order(
            descr.logical_type(),
            descr.converted_type(),
            descr.physical_type(),
        );
        Self { chunk, sort_order }
    }

    pub fn supports(&self, statistic: Statistic) -> bool {
        supports(self.sort_order, statistic)
    }

    /// True when the chunk carries a statistics block at all.
    pub fn present(&self) -> bool {
        self.chunk.statistics().is_some()
    }

    pub fn null_count(&self) -> Option<u64> {
        self.stats(Statistic::NullCount)?.null_count_opt()
    }

    pub fn distinct_count(&self) -> Option<u64> {
        self.stats(Statistic::DistinctCount)?.distinct_count_opt()
    }

    pub fn min(&self) -> Option<String> {
        render_bound(self.stats(Statistic::Min)?, Bound::Min)
    }

    pub fn max(&self) -> Option<String> {
        render_bound(self.stats(Statistic::Max)?, Bound::Max)
    }

    /// Values in the chunk, nulls included. Taken from the chunk header, so
    /// it is available even without a statistics block.
    pub fn value_count(&self) -> Option<i64> {
        let n = self.chunk.num_values();
        (n >= 0).then_some(n)
    }

    fn stats(&self, statistic: Statistic) -> Option<&'a Statistics> {
        if !self.supports(statistic) {
            return None;
        }
        self.chunk.statistics()
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

macro_rules! pick {
    ($stats:expr, $bound:expr) => {
        match $bound {
            Bound::Min => $stats.min_opt(),
            Bound::Max => $stats.max_opt(),
        }
    };
}

fn render_bound(stats: &Statistics, bound: Bound) -> Option<String> {
    match stats {
        Statistics::Boolean(s) => pick!(s, bound).map(ToString::to_string),
        Statistics::Int32(s) => pick!(s, bound).map(ToString::to_string),
        Statistics::Int64(s) => pick!(s, bound).map(ToString::to_string),
        Statistics::Int96(s) => pick!(s, bound).map(|v| format!("{v:?}")),
        Statistics::Float(s) => pick!(s, bound).map(ToString::to_string),
        Statistics::Double(s) => pick!(s, bound).map(ToString::to_string),
        Statistics::ByteArray(s) => pick!(s, bound).map(|v| render_bytes(v.data())),
        Statistics::FixedLenByteArray(s) => pick!(s, bound).map(|v| render_bytes(v.data())),
    }
}

/// UTF-8 text as-is, anything else as lowercase hex.
pub(crate) fn render_bytes(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => hex::encode(data),
    }
}
