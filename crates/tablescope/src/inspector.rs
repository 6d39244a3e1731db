// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The inspection pipeline: definition, location, listing, download,
//! extraction and optional summary.

use crate::catalog::{Catalog, TableInfo, VolumeDirectory};
use crate::config::InspectorConfig;
use crate::descriptor::{DescriptorField, LocationDescriptor};
use crate::listing::{ObjectEntry, Selection, list_data_files, select};
use crate::oracle::TextOracle;
use crate::resolver::{ResolvedLocation, StorageMount, resolve};
use crate::scratch::ScratchDir;
use crate::store::ObjectSource;
use crate::summary::{DEFAULT_MAX_PROMPT_CHARS, summarize};
use crate::{InspectError, Result};
use diagnostics::*;
use filemeta::{ColumnarView, DEFAULT_MAX_RECORDS, ExtractOptions, Extracted, FileFormat};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_records: usize,
    pub sample_rows: usize,
    pub max_prompt_chars: usize,
    pub scratch_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            sample_rows: 100,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            scratch_root: None,
        }
    }
}

impl Settings {
    pub fn extract_options(&self, view: ColumnarView) -> ExtractOptions {
        ExtractOptions {
            max_records: self.max_records,
            sample_rows: self.sample_rows,
            view,
        }
    }
}

/// Where a table lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLocation {
    pub table: String,
    pub descriptor: LocationDescriptor,
    pub volume_root: String,
    pub mount: StorageMount,
    pub resolved: ResolvedLocation,
}

#[derive(Debug, Clone, Default)]
pub struct InspectRequest {
    pub table: String,
    /// `None` picks the only data file, and fails when there are several.
    pub selection: Option<Selection>,
    pub view: ColumnarView,
    pub summarize: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub table: TableInfo,
    pub location: TableLocation,
    pub object: ObjectEntry,
    pub content: Extracted,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

pub struct Inspector {
    catalog: Arc<dyn Catalog>,
    volumes: Arc<dyn VolumeDirectory>,
    objects: Arc<dyn ObjectSource>,
    oracle: Arc<dyn TextOracle>,
    settings: Settings,
}

impl Inspector {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        volumes: Arc<dyn VolumeDirectory>,
        objects: Arc<dyn ObjectSource>,
        oracle: Arc<dyn TextOracle>,
    ) -> Self {
        Self {
            catalog,
            volumes,
            objects,
            oracle,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Wire the config-backed collaborators.
    pub fn from_config(config: &InspectorConfig) -> Result<Self> {
        let settings = Settings {
            max_records: config.limits.max_records,
            sample_rows: config.limits.sample_rows,
            max_prompt_chars: config.limits.max_prompt_chars,
            scratch_root: config.scratch_root.clone(),
        };
        Ok(Self::new(
            Arc::new(config.catalog()?),
            Arc::new(config.volumes()),
            Arc::new(config.object_source()?),
            config.oracle()?,
        )
        .with_settings(settings))
    }

    pub async fn tables(&self, database: Option<&str>) -> Result<Vec<TableInfo>> {
        self.catalog.list_tables(database).await
    }

    /// Parse the table's definition and resolve it to a mount prefix.
    pub async fn locate(&self, table: &str) -> Result<TableLocation> {
        let definition = self.catalog.table_definition(table).await?;
        let descriptor = LocationDescriptor::parse(&definition);
        let missing = descriptor.missing();
        if !missing.is_empty() {
            let fields = missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            debug!("Definition of {table} lacks {fields}", table: table, fields: &fields);
        }

        let volume = descriptor.require(DescriptorField::ExternalVolume)?;
        let root = self.volumes.volume_root(volume).await?;
        let mounts = self.volumes.mounts().await?;
        let resolved = resolve(&descriptor, |_| root.clone(), &mounts)?;

        let mount = mounts
            .iter()
            .find(|m| m.mount_id == resolved.mount_id)
            .cloned()
            .ok_or_else(|| InspectError::UnknownMount(resolved.mount_id.clone()))?;

        let prefix = resolved.relative_prefix.as_str();
        let mount_id = resolved.mount_id.as_str();
        info!("Table {table} resolved to {mount_id}:{prefix}", table: table, mount_id: mount_id, prefix: prefix);

        Ok(TableLocation {
            table: table.to_string(),
            volume_root: root.unwrap_or_default(),
            descriptor,
            mount,
            resolved,
        })
    }

    pub async fn list_files(&self, location: &TableLocation) -> Result<Vec<ObjectEntry>> {
        list_data_files(
            self.objects.as_ref(),
            &location.resolved,
            &location.mount.root_path,
        )
        .await
    }

    /// Download one object into a fresh scratch directory and extract it.
    /// The directory is removed whether or not extraction succeeds.
    pub async fn inspect_object(
        &self,
        location: &TableLocation,
        entry: &ObjectEntry,
        view: ColumnarView,
    ) -> Result<Extracted> {
        // Unknown types fail before anything is downloaded.
        let _ = FileFormat::from_name(&entry.name)?;

        let scratch = ScratchDir::create(self.settings.scratch_root.as_deref())?;
        let outcome = self.fetch_and_extract(&scratch, location, entry, view).await;
        if let Err(e) = scratch.close() {
            let reason = e.to_string();
            warn!("Failed to remove scratch directory: {reason}", reason: &reason);
        }
        outcome
    }

    async fn fetch_and_extract(
        &self,
        scratch: &ScratchDir,
        location: &TableLocation,
        entry: &ObjectEntry,
        view: ColumnarView,
    ) -> Result<Extracted> {
        let local = self
            .objects
            .fetch(&location.resolved.mount_id, &entry.name, scratch.path())
            .await?;
        let options = self.settings.extract_options(view);
        let data = bytes::Bytes::from(tokio::fs::read(&local).await?);
        let name = entry.name.clone();
        let extracted =
            tokio::task::spawn_blocking(move || filemeta::extract(&name, data, &options))
                .await
                .map_err(|e| InspectError::Io(std::io::Error::other(e)))??;

        let name = entry.name.as_str();
        let format = extracted.format().to_string();
        debug!("Extracted {name} as {format}", name: name, format: &format);
        Ok(extracted)
    }

    /// Summary text for extracted content. Columnar files are summarized from
    /// their metadata, record files from their records.
    pub async fn summarize(&self, content: &Extracted) -> String {
        let max = self.settings.max_prompt_chars;
        match content {
            Extracted::Columnar { metadata, .. } => {
                summarize(self.oracle.as_ref(), metadata, max).await
            }
            Extracted::Records(records) => summarize(self.oracle.as_ref(), records, max).await,
        }
    }

    pub async fn inspect(&self, request: &InspectRequest) -> Result<InspectionReport> {
        let table = self.catalog.table_info(&request.table).await?;
        let location = self.locate(&request.table).await?;
        let entries = self.list_files(&location).await?;

        let object = match &request.selection {
            Some(selection) => select(&entries, selection)?,
            None => match entries.as_slice() {
                [only] => only.clone(),
                many => {
                    return Err(InspectError::AmbiguousSelection {
                        query: request.table.clone(),
                        candidates: many.iter().map(ObjectEntry::label).collect(),
                    });
                }
            },
        };

        let content = self.inspect_object(&location, &object, request.view).await?;
        let summary = if request.summarize {
            Some(self.summarize(&content).await)
        } else {
            None
        };

        Ok(InspectionReport {
            table,
            location,
            object,
            content,
            summary,
        })
    }
}
