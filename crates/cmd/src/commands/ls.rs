// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::InspectContext;
use anyhow::Result;
use tablescope::{ObjectEntry, format_bytes};

pub fn format_entry(entry: &ObjectEntry) -> String {
    format!("{}\t{}", entry.label(), format_bytes(entry.size))
}

/// List a table's data files, side-files excluded.
pub async fn ls_command<F>(
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
    let entries = inspector.list_files(&location).await?;
    if json {
        handler(&serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        handler(&format_entry(entry));
    }
    Ok(())
}
