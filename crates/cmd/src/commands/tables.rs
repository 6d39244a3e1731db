// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::InspectContext;
use anyhow::Result;
use diagnostics::*;
use tablescope::{TableInfo, format_bytes, format_timestamp};

fn or_na(value: Option<&str>) -> String {
    value.map_or_else(|| "N/A".to_string(), format_timestamp)
}

/// One line per table: name, rows, size, created, last DDL, dynamic flag.
pub fn format_table_line(table: &TableInfo) -> String {
    format!(
        "{}\trows={}\tsize={}\tcreated={}\tlast_ddl={}\tdynamic={}",
        table.name,
        table.row_count.map_or_else(|| "N/A".to_string(), |n| n.to_string()),
        format_bytes(table.bytes),
        or_na(table.created.as_deref()),
        or_na(table.last_ddl.as_deref()),
        table.is_dynamic.map_or_else(|| "N/A".to_string(), |d| d.to_string()),
    )
}

/// List external tables, optionally limited to one database.
pub async fn tables_command<F>(
    context: &InspectContext,
    database: Option<&str>,
    json: bool,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let inspector = context.inspector()?;
    let tables = inspector.tables(database).await?;
    debug!("Listed {count} tables", count: tables.len());

    if json {
        handler(&serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }
    if tables.is_empty() {
        handler("No external tables found");
    }
    for table in &tables {
        handler(&format_table_line(table));
    }
    Ok(())
}
