// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{InspectContext, ViewChoice};
use crate::render::render_extracted;
use anyhow::{Context, Result};
use diagnostics::*;
use filemeta::{ColumnarView, ExtractOptions};
use std::path::Path;

/// Describe a local file with the same extractors `inspect` uses. Limits
/// come from the configuration when one exists; a configuration that fails
/// to load is an error.
pub async fn describe_command<F>(
    context: &InspectContext,
    path: &Path,
    view: ViewChoice,
    json: bool,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let view: ColumnarView = view.into();
    let options = match context.load_config_if_present()? {
        Some(config) => config.extract_options(view),
        None => {
            debug!("No configuration found, using default limits");
            ExtractOptions {
                view,
                ..Default::default()
            }
        }
    };

    let owned = path.to_path_buf();
    let content = tokio::task::spawn_blocking(move || filemeta::extract_path(&owned, &options))
        .await?
        .with_context(|| format!("Failed to describe {}", path.display()))?;

    if json {
        handler(&serde_json::to_string_pretty(&content)?);
    } else {
        let header = format!("File: {}\nFormat: {}\n\n", path.display(), content.format());
        handler(&(header + &render_extracted(&content, view)));
    }
    Ok(())
}
