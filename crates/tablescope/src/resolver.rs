// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Map a table's volume and base location onto a listable mount prefix.
//!
//! A volume names a root storage path (`s3://bucket/vol1`). Listing happens
//! through a mount, a registered root such as `s3://bucket`, so the volume
//! root has to be re-expressed relative to the mount that contains it and
//! then extended with the table's base location.

use crate::descriptor::{DescriptorField, LocationDescriptor, normalize_value};
use crate::{InspectError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A registered storage root reachable by the object source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMount {
    pub mount_id: String,
    pub root_path: String,
}

impl StorageMount {
    pub fn new<I: Into<String>, R: Into<String>>(mount_id: I, root_path: R) -> Self {
        Self {
            mount_id: mount_id.into(),
            root_path: root_path.into(),
        }
    }
}

/// Where a table's files live, in terms a lister understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocation {
    pub mount_id: String,
    /// Object-key prefix inside the mount; no leading or trailing `/`.
    pub relative_prefix: String,
    /// Anchored regular expression over mount-relative object names.
    pub list_pattern: String,
}

impl ResolvedLocation {
    pub fn matcher(&self) -> Result<Regex> {
        Ok(Regex::new(&self.list_pattern)?)
    }
}

/// Strip trailing `/` and `/*` from a storage path.
pub fn normalize_root(path: &str) -> String {
    normalize_value(path)
}

/// Remainder of `path` below `root`, if `root` contains it on a `/` boundary.
/// Both arguments are expected to be normalized.
pub fn relative_to(path: &str, root: &str) -> Option<String> {
    if path == root {
        return Some(String::new());
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(str::to_string)
}

/// The mount owning `root_path`. The most specific (longest) root wins when
/// mounts are nested.
pub fn find_mount<'a>(root_path: &str, mounts: &'a [StorageMount]) -> Option<&'a StorageMount> {
    mounts
        .iter()
        .filter(|m| relative_to(root_path, &normalize_root(&m.root_path)).is_some())
        .max_by_key(|m| normalize_root(&m.root_path).len())
}

/// Join path fragments with single `/`, trimming each and skipping empties.
pub fn join_prefix<'a, I: IntoIterator<Item = &'a str>>(parts: I) -> String {
    parts
        .into_iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Anchored pattern matching the prefix itself or anything below it. An
/// empty prefix matches everything.
pub fn list_pattern(relative_prefix: &str) -> String {
    if relative_prefix.is_empty() {
        "^.*$".to_string()
    } else {
        format!("^{}(/.*)?$", regex::escape(relative_prefix))
    }
}

/// Resolve a descriptor. `volume_root` looks up the root path of a volume.
pub fn resolve<F>(
    descriptor: &LocationDescriptor,
    volume_root: F,
    mounts: &[StorageMount],
) -> Result<ResolvedLocation>
where
    F: FnOnce(&str) -> Option<String>,
{
    let volume = descriptor.require(DescriptorField::ExternalVolume)?;
    let root_path = volume_root(volume)
        .map(|p| normalize_root(&p))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| InspectError::VolumeNotFound {
            volume: volume.to_string(),
        })?;

    let mount = find_mount(&root_path, mounts).ok_or_else(|| InspectError::MountNotResolved {
        volume: volume.to_string(),
        root_path: root_path.clone(),
    })?;

    let from_mount = relative_to(&root_path, &normalize_root(&mount.root_path)).unwrap_or_default();
    let relative_prefix = join_prefix([
        from_mount.as_str(),
        descriptor.base_location.as_deref().unwrap_or_default(),
    ]);

    Ok(ResolvedLocation {
        mount_id: mount.mount_id.clone(),
        list_pattern: list_pattern(&relative_prefix),
        relative_prefix,
    })
}
