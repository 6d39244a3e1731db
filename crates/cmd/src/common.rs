// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use filemeta::ColumnarView;
use std::env;
use std::path::PathBuf;
use tablescope::{CONFIG_ENV, Inspector, InspectorConfig};

/// What to show for a Parquet file.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ViewChoice {
    /// Footer metadata and statistics (default)
    #[default]
    Metadata,
    /// First rows as a table
    Sample,
    /// Metadata followed by sample rows
    Both,
}

impl From<ViewChoice> for ColumnarView {
    fn from(choice: ViewChoice) -> Self {
        match choice {
            ViewChoice::Metadata => ColumnarView::Metadata,
            ViewChoice::Sample => ColumnarView::Sample,
            ViewChoice::Both => ColumnarView::Both,
        }
    }
}

/// Configuration path with an optional override, falling back to the
/// `TABLESCOPE_CONFIG` environment variable.
pub fn get_config_path_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("{CONFIG_ENV} environment variable not set and no --config given"))
}

/// Everything a command needs to reach the configured collaborators.
#[derive(Clone, Debug)]
pub struct InspectContext {
    config_path: Option<PathBuf>,
}

impl InspectContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn load_config(&self) -> Result<InspectorConfig> {
        let path = get_config_path_with_override(self.config_path.clone())?;
        InspectorConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Like [`Self::load_config`], but `None` when no configuration path is
    /// set or the file does not exist. A file that exists must load.
    pub fn load_config_if_present(&self) -> Result<Option<InspectorConfig>> {
        let Ok(path) = get_config_path_with_override(self.config_path.clone()) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        InspectorConfig::load(&path)
            .map(Some)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    pub fn inspector(&self) -> Result<Inspector> {
        let config = self.load_config()?;
        Inspector::from_config(&config).with_context(|| "Failed to set up collaborators")
    }
}
