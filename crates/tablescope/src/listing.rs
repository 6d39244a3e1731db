// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filtering and choosing among listed objects.

use crate::resolver::ResolvedLocation;
use crate::store::ObjectSource;
use crate::{InspectError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use diagnostics::*;
use serde::Serialize;

/// Suffixes of checksum and index side-files that never hold table data.
pub const SIDE_FILE_SUFFIXES: &[&str] = &[".crc", ".bin"];

/// Separator between name and timestamp in a label.
const LABEL_SEPARATOR: &str = " | ";

/// One listed storage object, relative to its mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub size: Option<u64>,
}

impl ObjectEntry {
    /// `name | timestamp`, unique even when a name is listed twice.
    pub fn label(&self) -> String {
        format!(
            "{}{}{}",
            self.name,
            LABEL_SEPARATOR,
            self.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Last path segment of the name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

pub fn is_side_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SIDE_FILE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Drop side-files and sort by label.
pub fn filter_data_files(entries: Vec<ObjectEntry>) -> Vec<ObjectEntry> {
    let mut kept: Vec<ObjectEntry> = entries.into_iter().filter(|e| !is_side_file(&e.name)).collect();
    kept.sort_by_key(ObjectEntry::label);
    kept
}

/// Rewrite an absolute object URL under `mount_root` as a mount-relative name.
/// Names that are already relative pass through with leading `/` removed.
pub fn mount_relative_name(name: &str, mount_root: &str) -> String {
    let root = mount_root.trim_end_matches('/');
    let rest = match name.strip_prefix(root) {
        Some(rest) if !root.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => name,
    };
    rest.trim_start_matches('/').to_string()
}

/// List a resolved location and keep only data files. Names come back
/// relative to `mount_root`.
pub async fn list_data_files(
    source: &dyn ObjectSource,
    location: &ResolvedLocation,
    mount_root: &str,
) -> Result<Vec<ObjectEntry>> {
    let mut listed = source.list(location).await?;
    for entry in &mut listed {
        entry.name = mount_relative_name(&entry.name, mount_root);
    }
    let total = listed.len();
    let entries = filter_data_files(listed);

    let mount_id = location.mount_id.as_str();
    let pattern = location.list_pattern.as_str();
    debug!(
        "Listed {total} objects in {mount_id} for {pattern}, {kept} data files",
        total: total,
        mount_id: mount_id,
        pattern: pattern,
        kept: entries.len()
    );

    if entries.is_empty() {
        return Err(InspectError::NoObjectsFound {
            mount_id: location.mount_id.clone(),
            pattern: location.list_pattern.clone(),
        });
    }
    Ok(entries)
}

/// How the caller picks one file out of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A label or an object name, matched exactly.
    Exact(String),
    /// A case-insensitive name fragment.
    Search(String),
}

/// Apply a selection policy to a filtered listing.
pub fn select(entries: &[ObjectEntry], selection: &Selection) -> Result<ObjectEntry> {
    match selection {
        Selection::Exact(choice) => entries
            .iter()
            .find(|e| e.label() == *choice || e.name == *choice)
            .cloned()
            .ok_or_else(|| InspectError::NoMatchingFile {
                query: choice.clone(),
            }),
        Selection::Search(fragment) => {
            let needle = fragment.to_lowercase();
            let matches: Vec<&ObjectEntry> = entries
                .iter()
                .filter(|e| e.name.to_lowercase().contains(&needle))
                .collect();
            match matches.as_slice() {
                [] => Err(InspectError::NoMatchingFile {
                    query: fragment.clone(),
                }),
                [only] => {
                    let name = only.name.as_str();
                    info!("Auto-selected single match {name}", name: name);
                    Ok((*only).clone())
                }
                many => Err(InspectError::AmbiguousSelection {
                    query: fragment.clone(),
                    candidates: many.iter().map(|e| e.label()).collect(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(name: &str, minute: u32) -> ObjectEntry {
        ObjectEntry {
            name: name.to_string(),
            last_modified: Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).single().expect("time"),
            size: Some(10),
        }
    }

    #[test]
    fn test_side_files_are_dropped() {
        let kept = filter_data_files(vec![
            entry("t/part-0.parquet", 0),
            entry("t/part-0.parquet.crc", 0),
            entry("t/index.BIN", 0),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "t/part-0.parquet");
    }

    #[test]
    fn test_label_and_ordering() {
        let kept = filter_data_files(vec![entry("t/b.json", 1), entry("t/a.json", 2)]);
        assert_eq!(kept[0].label(), "t/a.json | 2025-03-01T12:02:00Z");
        assert_eq!(kept[1].name, "t/b.json");
        assert_eq!(kept[0].file_name(), "a.json");
    }

    #[test]
    fn test_exact_selection_by_label_or_name() {
        let entries = vec![entry("t/a.json", 1), entry("t/b.json", 2)];
        let by_name = select(&entries, &Selection::Exact("t/b.json".into())).expect("name");
        assert_eq!(by_name.name, "t/b.json");
        let label = entries[0].label();
        let by_label = select(&entries, &Selection::Exact(label)).expect("label");
        assert_eq!(by_label.name, "t/a.json");
        assert!(matches!(
            select(&entries, &Selection::Exact("t/c.json".into())),
            Err(InspectError::NoMatchingFile { .. })
        ));
    }

    #[test]
    fn test_search_single_match_is_selected() {
        let entries = vec![entry("t/data/Part-0.parquet", 1), entry("t/metadata/v1.json", 2)];
        let chosen = select(&entries, &Selection::Search("part-0".into())).expect("single");
        assert_eq!(chosen.name, "t/data/Part-0.parquet");
    }

    #[test]
    fn test_search_many_matches_is_ambiguous() {
        let entries = vec![entry("t/data/part-0.parquet", 1), entry("t/data/part-1.parquet", 2)];
        match select(&entries, &Selection::Search("PART".into())) {
            Err(InspectError::AmbiguousSelection { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].starts_with("t/data/part-0.parquet | "));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_search_without_matches() {
        let entries = vec![entry("t/a.json", 1)];
        assert!(matches!(
            select(&entries, &Selection::Search("zzz".into())),
            Err(InspectError::NoMatchingFile { .. })
        ));
    }

    #[test]
    fn test_mount_relative_name() {
        assert_eq!(mount_relative_name("s3://bkt/vol1/a.parquet", "s3://bkt/"), "vol1/a.parquet");
        assert_eq!(mount_relative_name("vol1/a.parquet", "s3://bkt"), "vol1/a.parquet");
        assert_eq!(mount_relative_name("/vol1/a.parquet", ""), "vol1/a.parquet");
        assert_eq!(mount_relative_name("s3://bkt2/a.parquet", "s3://bkt"), "s3://bkt2/a.parquet");
    }
}
