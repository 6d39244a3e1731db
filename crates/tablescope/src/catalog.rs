// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Table catalog and volume directory collaborators.

use crate::resolver::StorageMount;
use crate::{InspectError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

/// A catalog row describing one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: Option<i64>,
    pub bytes: Option<u64>,
    pub created: Option<String>,
    pub last_ddl: Option<String>,
    pub is_dynamic: Option<bool>,
    pub is_external: bool,
}

/// Source of table listings and definitions.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// External tables, optionally limited to one database.
    async fn list_tables(&self, database: Option<&str>) -> Result<Vec<TableInfo>>;

    async fn table_info(&self, table: &str) -> Result<TableInfo>;

    /// The table's definition text (DDL).
    async fn table_definition(&self, table: &str) -> Result<String>;
}

/// Source of volume root paths and storage mounts.
#[async_trait]
pub trait VolumeDirectory: Send + Sync {
    /// Root storage path of a volume, `None` when the volume is unknown.
    async fn volume_root(&self, volume: &str) -> Result<Option<String>>;

    async fn mounts(&self) -> Result<Vec<StorageMount>>;
}

/// A table known to [`ConfigCatalog`].
#[derive(Debug, Clone, Default)]
pub struct CatalogEntry {
    pub info: TableInfo,
    pub definition: String,
}

/// Catalog backed by a fixed table map, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigCatalog {
    tables: BTreeMap<String, CatalogEntry>,
}

impl ConfigCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: TableInfo, definition: String) {
        let _ = self
            .tables
            .insert(info.name.clone(), CatalogEntry { info, definition });
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn entry(&self, table: &str) -> Result<&CatalogEntry> {
        self.tables
            .get(table)
            .or_else(|| {
                self.tables
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(table))
                    .map(|(_, entry)| entry)
            })
            .ok_or_else(|| InspectError::TableNotFound(table.to_string()))
    }
}

/// `DB.SCHEMA.T` belongs to database `DB`.
fn in_database(table: &str, database: &str) -> bool {
    table
        .split('.')
        .next()
        .is_some_and(|db| db.eq_ignore_ascii_case(database))
}

#[async_trait]
impl Catalog for ConfigCatalog {
    async fn list_tables(&self, database: Option<&str>) -> Result<Vec<TableInfo>> {
        Ok(self
            .tables
            .values()
            .filter(|e| e.info.is_external)
            .filter(|e| database.is_none_or(|db| in_database(&e.info.name, db)))
            .map(|e| e.info.clone())
            .collect())
    }

    async fn table_info(&self, table: &str) -> Result<TableInfo> {
        Ok(self.entry(table)?.info.clone())
    }

    async fn table_definition(&self, table: &str) -> Result<String> {
        Ok(self.entry(table)?.definition.clone())
    }
}

/// Volume directory backed by fixed maps.
#[derive(Debug, Clone, Default)]
pub struct ConfigVolumes {
    roots: BTreeMap<String, String>,
    mounts: Vec<StorageMount>,
}

impl ConfigVolumes {
    pub fn new(roots: BTreeMap<String, String>, mounts: Vec<StorageMount>) -> Self {
        Self { roots, mounts }
    }
}

#[async_trait]
impl VolumeDirectory for ConfigVolumes {
    async fn volume_root(&self, volume: &str) -> Result<Option<String>> {
        let found = self.roots.get(volume).or_else(|| {
            self.roots
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(volume))
                .map(|(_, root)| root)
        });
        Ok(found.cloned())
    }

    async fn mounts(&self) -> Result<Vec<StorageMount>> {
        Ok(self.mounts.clone())
    }
}
