// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::InspectContext;
use anyhow::Result;
use tablescope::TableLocation;

pub fn format_location(location: &TableLocation) -> String {
    let d = &location.descriptor;
    let mut out = String::new();
    out.push_str(&format!("Table: {}\n", location.table));
    out.push_str(&format!(
        "External volume: {}\n",
        d.external_volume.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("Catalog: {}\n", d.catalog.as_deref().unwrap_or("-")));
    out.push_str(&format!(
        "Base location: {}\n",
        d.base_location.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("Volume root: {}\n", location.volume_root));
    out.push_str(&format!(
        "Mount: {} ({})\n",
        location.mount.mount_id, location.mount.root_path
    ));
    out.push_str(&format!("Prefix: {}\n", location.resolved.relative_prefix));
    out.push_str(&format!("Pattern: {}", location.resolved.list_pattern));
    out
}

/// Show where a table's files live.
pub async fn resolve_command<F>(
    context: &InspectContext,
    table: &str,
    json: bool,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let inspector = context.inspector()?;
    let location = inspector.locate(table).await?;
    if json {
        handler(&serde_json::to_string_pretty(&location)?);
    } else {
        handler(&format_location(&location));
    }
    Ok(())
}
