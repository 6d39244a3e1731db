// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Locate and inspect the storage objects behind externally cataloged tables.
//!
//! A table's definition names an external volume and a base location. The
//! [`descriptor`] module pulls those out, [`resolver`] maps them onto a
//! registered storage mount, [`listing`] enumerates and picks data files,
//! and [`Inspector`] downloads one into a scratch directory and hands it to
//! the `filemeta` extractors. Summaries go through a [`TextOracle`] and
//! degrade to a placeholder when it is unavailable.

mod error;

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod format;
pub mod inspector;
pub mod listing;
pub mod oracle;
pub mod resolver;
pub mod scratch;
pub mod store;
pub mod summary;

pub use catalog::{Catalog, ConfigCatalog, ConfigVolumes, TableInfo, VolumeDirectory};
pub use config::{CONFIG_ENV, InspectorConfig};
pub use descriptor::{DescriptorField, LocationDescriptor};
pub use error::InspectError;
pub use format::{format_bytes, format_timestamp};
pub use inspector::{InspectRequest, InspectionReport, Inspector, Settings, TableLocation};
pub use listing::{ObjectEntry, Selection};
pub use oracle::{DisabledOracle, HttpOracle, OracleConfig, TextOracle};
pub use resolver::{ResolvedLocation, StorageMount};
pub use scratch::ScratchDir;
pub use store::{ObjectSource, StoreMounts};
pub use summary::{SKIPPED_PREFIX, summarize};

pub type Result<T> = std::result::Result<T, InspectError>;
