// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Object listing and download through registered mounts.

use crate::listing::ObjectEntry;
use crate::resolver::{ResolvedLocation, join_prefix};
use crate::{InspectError, Result};
use async_trait::async_trait;
use diagnostics::*;
use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::path::Path as StorePath;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Something that can enumerate and fetch objects under a mount.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Objects under the location whose mount-relative name matches its
    /// list pattern.
    async fn list(&self, location: &ResolvedLocation) -> Result<Vec<ObjectEntry>>;

    /// Copy one object into `dest_dir`, returning the local path.
    async fn fetch(&self, mount_id: &str, name: &str, dest_dir: &Path) -> Result<PathBuf>;
}

struct Mounted {
    store: Arc<dyn ObjectStore>,
    prefix: StorePath,
}

/// [`ObjectSource`] over `object_store` backends, one per mount.
#[derive(Default)]
pub struct StoreMounts {
    mounts: HashMap<String, Mounted>,
}

impl StoreMounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mount whose root is `prefix` inside `store`.
    pub fn insert<S: Into<String>>(&mut self, mount_id: S, store: Arc<dyn ObjectStore>, prefix: &str) {
        let _ = self.mounts.insert(
            mount_id.into(),
            Mounted {
                store,
                prefix: StorePath::from(prefix),
            },
        );
    }

    /// Register a mount from a URL such as `s3://bucket/lake`. Options are
    /// passed to the backend builder (region, endpoint, credentials).
    pub fn insert_url<'a, S, I>(&mut self, mount_id: S, url: &str, options: I) -> Result<()>
    where
        S: Into<String>,
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mount_id = mount_id.into();
        let parsed = Url::parse(url)?;
        let (store, prefix) = object_store::parse_url_opts(&parsed, options)?;
        debug!("Mount {mount_id} backed by {url}", mount_id: &mount_id, url: url);
        let _ = self.mounts.insert(
            mount_id,
            Mounted {
                store: Arc::from(store),
                prefix,
            },
        );
        Ok(())
    }

    fn mounted(&self, mount_id: &str) -> Result<&Mounted> {
        self.mounts
            .get(mount_id)
            .ok_or_else(|| InspectError::UnknownMount(mount_id.to_string()))
    }
}

impl Mounted {
    /// Listed names are already encoded, so they are parsed as-is; only a
    /// name that is not a valid path gets encoded.
    fn location(&self, relative: &str) -> StorePath {
        let joined = join_prefix([self.prefix.as_ref(), relative]);
        StorePath::parse(&joined).unwrap_or_else(|_| StorePath::from(joined))
    }

    fn relative_name(&self, location: &StorePath) -> String {
        let full = location.as_ref();
        let root = self.prefix.as_ref();
        if root.is_empty() {
            return full.to_string();
        }
        match full.strip_prefix(root) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                rest.trim_start_matches('/').to_string()
            }
            _ => full.to_string(),
        }
    }
}

#[async_trait]
impl ObjectSource for StoreMounts {
    async fn list(&self, location: &ResolvedLocation) -> Result<Vec<ObjectEntry>> {
        let mounted = self.mounted(&location.mount_id)?;
        let matcher = location.matcher()?;
        let prefix = mounted.location(&location.relative_prefix);
        let listing = if prefix.as_ref().is_empty() {
            mounted.store.list(None)
        } else {
            mounted.store.list(Some(&prefix))
        };
        let metas: Vec<_> = listing.try_collect().await?;

        Ok(metas
            .into_iter()
            .map(|meta| ObjectEntry {
                name: mounted.relative_name(&meta.location),
                last_modified: meta.last_modified,
                size: Some(meta.size),
            })
            .filter(|entry| matcher.is_match(&entry.name))
            .collect())
    }

    async fn fetch(&self, mount_id: &str, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let mounted = self.mounted(mount_id)?;
        let location = mounted.location(name);
        let data = mounted.store.get(&location).await?.bytes().await?;

        let file_name = name.rsplit('/').next().unwrap_or(name);
        let target = dest_dir.join(file_name);
        tokio::fs::write(&target, &data).await?;

        let bytes = data.len();
        let target_display = target.display().to_string();
        debug!(
            "Fetched {name} ({bytes} bytes) to {target}",
            name: name,
            bytes: bytes,
            target: &target_display
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::list_pattern;
    use object_store::PutPayload;
    use object_store::memory::InMemory;
    use tempfile::TempDir;

    async fn populated() -> StoreMounts {
        let store = Arc::new(InMemory::new());
        for key in [
            "lake/vol1/db/t1/data/part-0.parquet",
            "lake/vol1/db/t1/data/part-0.parquet.crc",
            "lake/vol1/db/t10/data/part-0.parquet",
            "lake/other/x.json",
        ] {
            let _ = store
                .put(&StorePath::from(key), PutPayload::from(key.as_bytes().to_vec()))
                .await
                .expect("put");
        }
        let mut mounts = StoreMounts::new();
        mounts.insert("M1", store, "lake");
        mounts
    }

    fn location(prefix: &str) -> ResolvedLocation {
        ResolvedLocation {
            mount_id: "M1".to_string(),
            relative_prefix: prefix.to_string(),
            list_pattern: list_pattern(prefix),
        }
    }

    #[tokio::test]
    async fn test_list_under_prefix() {
        let mounts = populated().await;
        let mut names: Vec<String> = mounts
            .list(&location("vol1/db/t1"))
            .await
            .expect("list")
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "vol1/db/t1/data/part-0.parquet",
                "vol1/db/t1/data/part-0.parquet.crc"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_whole_mount() {
        let mounts = populated().await;
        let entries = mounts.list(&location("")).await.expect("list");
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| !e.name.starts_with("lake/")));
        assert!(entries.iter().all(|e| e.size.is_some()));
    }

    #[tokio::test]
    async fn test_fetch_writes_local_copy() {
        let mounts = populated().await;
        let dir = TempDir::new().expect("tempdir");
        let path = mounts
            .fetch("M1", "other/x.json", dir.path())
            .await
            .expect("fetch");
        assert_eq!(path, dir.path().join("x.json"));
        let content = std::fs::read_to_string(&path).expect("read");
        assert_eq!(content, "lake/other/x.json");
    }

    #[tokio::test]
    async fn test_fetch_listed_name_with_encoded_characters() {
        let store = Arc::new(InMemory::new());
        let key = StorePath::parse("lake/vol1/t/city=New%20York/x.json").expect("path");
        let _ = store
            .put(&key, PutPayload::from(b"{}".to_vec()))
            .await
            .expect("put");
        let mut mounts = StoreMounts::new();
        mounts.insert("M1", store, "lake");

        let entries = mounts.list(&location("vol1/t")).await.expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "vol1/t/city=New%20York/x.json");

        let dir = TempDir::new().expect("tempdir");
        let path = mounts
            .fetch("M1", &entries[0].name, dir.path())
            .await
            .expect("fetch");
        assert_eq!(std::fs::read_to_string(path).expect("read"), "{}");
    }

    #[tokio::test]
    async fn test_unknown_mount() {
        let mounts = populated().await;
        let mut loc = location("x");
        loc.mount_id = "NOPE".to_string();
        assert!(matches!(
            mounts.list(&loc).await,
            Err(InspectError::UnknownMount(_))
        ));
    }
}
