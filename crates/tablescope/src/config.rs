// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML configuration for the config-backed collaborators.
//!
//! ```yaml
//! volumes:
//!   VOL1: s3://bucket/vol1
//! mounts:
//!   - id: M1
//!     root: s3://bucket
//!     options:
//!       aws_region: us-east-1
//! tables:
//!   DB.PUBLIC.T1:
//!     definition_file: ddl/t1.sql
//!     row_count: 1200
//! oracle:
//!   endpoint: http://localhost:8080/complete
//! limits:
//!   max_records: 50000
//! ```

use crate::catalog::{ConfigCatalog, ConfigVolumes, TableInfo};
use crate::oracle::{DisabledOracle, HttpOracle, OracleConfig, TextOracle};
use crate::resolver::StorageMount;
use crate::store::StoreMounts;
use crate::summary::DEFAULT_MAX_PROMPT_CHARS;
use crate::{InspectError, Result};
use filemeta::{ColumnarView, DEFAULT_MAX_RECORDS, ExtractOptions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "TABLESCOPE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Volume name to root storage path.
    pub volumes: BTreeMap<String, String>,
    pub mounts: Vec<MountConfig>,
    pub tables: BTreeMap<String, TableConfig>,
    pub oracle: Option<OracleConfig>,
    pub limits: Limits,
    /// Parent of per-request scratch directories.
    pub scratch_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    pub id: String,
    /// Root path volumes are matched against.
    pub root: String,
    /// Object store URL; defaults to `root`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub definition: Option<String>,
    pub definition_file: Option<PathBuf>,
    pub row_count: Option<i64>,
    pub bytes: Option<u64>,
    pub created: Option<String>,
    pub last_ddl: Option<String>,
    pub is_dynamic: Option<bool>,
    pub external: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            definition: None,
            definition_file: None,
            row_count: None,
            bytes: None,
            created: None,
            last_ddl: None,
            is_dynamic: None,
            external: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_records: usize,
    pub max_prompt_chars: usize,
    pub sample_rows: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            sample_rows: 100,
        }
    }
}

impl InspectorConfig {
    /// Read a YAML file. Relative `definition_file` and `scratch_root` paths
    /// are taken relative to the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            InspectError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        for table in self.tables.values_mut() {
            if let Some(file) = table.definition_file.as_mut() {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        if let Some(root) = self.scratch_root.as_mut() {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for mount in &self.mounts {
            if mount.id.is_empty() || mount.root.is_empty() {
                return Err(InspectError::Configuration(
                    "mount id and root cannot be empty".to_string(),
                ));
            }
            if !seen.insert(mount.id.as_str()) {
                return Err(InspectError::Configuration(format!(
                    "duplicate mount id '{}'",
                    mount.id
                )));
            }
        }
        for (name, table) in &self.tables {
            if table.definition.is_some() && table.definition_file.is_some() {
                return Err(InspectError::Configuration(format!(
                    "table '{name}' sets both definition and definition_file"
                )));
            }
        }
        if self.limits.max_records == 0 || self.limits.max_prompt_chars == 0 {
            return Err(InspectError::Configuration(
                "limits must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn storage_mounts(&self) -> Vec<StorageMount> {
        self.mounts
            .iter()
            .map(|m| StorageMount::new(&m.id, &m.root))
            .collect()
    }

    pub fn extract_options(&self, view: ColumnarView) -> ExtractOptions {
        ExtractOptions {
            max_records: self.limits.max_records,
            sample_rows: self.limits.sample_rows,
            view,
        }
    }

    pub fn catalog(&self) -> Result<ConfigCatalog> {
        let mut catalog = ConfigCatalog::new();
        for (name, table) in &self.tables {
            let definition = match (&table.definition, &table.definition_file) {
                (Some(text), _) => text.clone(),
                (None, Some(file)) => std::fs::read_to_string(file).map_err(|e| {
                    InspectError::Configuration(format!(
                        "cannot read definition of '{name}' from {}: {e}",
                        file.display()
                    ))
                })?,
                (None, None) => String::new(),
            };
            catalog.insert(
                TableInfo {
                    name: name.clone(),
                    row_count: table.row_count,
                    bytes: table.bytes,
                    created: table.created.clone(),
                    last_ddl: table.last_ddl.clone(),
                    is_dynamic: table.is_dynamic,
                    is_external: table.external,
                },
                definition,
            );
        }
        Ok(catalog)
    }

    pub fn volumes(&self) -> ConfigVolumes {
        ConfigVolumes::new(self.volumes.clone(), self.storage_mounts())
    }

    pub fn object_source(&self) -> Result<StoreMounts> {
        let mut mounts = StoreMounts::new();
        for mount in &self.mounts {
            let url = mount.url.as_deref().unwrap_or(&mount.root);
            mounts.insert_url(&mount.id, url, &mount.options)?;
        }
        Ok(mounts)
    }

    pub fn oracle(&self) -> Result<Arc<dyn TextOracle>> {
        Ok(match &self.oracle {
            Some(config) => Arc::new(HttpOracle::new(config)?),
            None => Arc::new(DisabledOracle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
volumes:
  VOL1: s3://bucket/vol1
mounts:
  - id: M1
    root: file:///tmp/lake
tables:
  DB.PUBLIC.T1:
    definition: "EXTERNAL_VOLUME='VOL1' BASE_LOCATION='t1/'"
    row_count: 10
  DB.PUBLIC.VIEWISH:
    external: false
limits:
  max_records: 50
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = InspectorConfig::from_yaml(YAML).expect("config");
        assert_eq!(config.limits.max_records, 50);
        assert_eq!(config.limits.max_prompt_chars, DEFAULT_MAX_PROMPT_CHARS);
        assert_eq!(config.limits.sample_rows, 100);
        assert!(config.oracle.is_none());
        assert!(config.tables["DB.PUBLIC.T1"].external);
        assert!(!config.tables["DB.PUBLIC.VIEWISH"].external);
        assert_eq!(
            config.storage_mounts(),
            vec![StorageMount::new("M1", "file:///tmp/lake")]
        );
        let opts = config.extract_options(ColumnarView::Both);
        assert_eq!(opts.max_records, 50);
        assert_eq!(opts.view, ColumnarView::Both);
    }

    #[test]
    fn test_rejects_duplicate_mounts() {
        let yaml = "mounts:\n  - {id: A, root: s3://x}\n  - {id: A, root: s3://y}\n";
        assert!(matches!(
            InspectorConfig::from_yaml(yaml),
            Err(InspectError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_resolves_definition_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("ddl")).expect("mkdir");
        std::fs::write(dir.path().join("ddl/t.sql"), "EXTERNAL_VOLUME = 'V'").expect("ddl");
        let path = dir.path().join("tablescope.yaml");
        std::fs::write(&path, "tables:\n  DB.S.T:\n    definition_file: ddl/t.sql\n")
            .expect("yaml");

        let config = InspectorConfig::load(&path).expect("load");
        let catalog = config.catalog().expect("catalog");
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_from_config() {
        use crate::catalog::Catalog;
        let config = InspectorConfig::from_yaml(YAML).expect("config");
        let catalog = config.catalog().expect("catalog");
        let ddl = catalog.table_definition("DB.PUBLIC.T1").await.expect("ddl");
        assert!(ddl.contains("VOL1"));
        let tables = catalog.list_tables(Some("DB")).await.expect("list");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].row_count, Some(10));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        assert!(matches!(
            InspectorConfig::load("/nonexistent/tablescope.yaml"),
            Err(InspectError::Configuration(_))
        ));
    }
}
