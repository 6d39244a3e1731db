// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{InspectContext, ViewChoice};
use crate::render::render_extracted;
use anyhow::{Context, Result};
use diagnostics::*;
use filemeta::ColumnarView;
use tablescope::{InspectRequest, InspectionReport, Selection};

#[derive(Clone, Debug, Default)]
pub struct InspectArgs {
    pub table: String,
    /// Exact object name or `name | timestamp` label.
    pub file: Option<String>,
    /// Case-insensitive fragment of the object name.
    pub search: Option<String>,
    pub view: ViewChoice,
    pub summarize: bool,
    pub json: bool,
}

impl InspectArgs {
    fn request(&self) -> InspectRequest {
        let selection = match (&self.file, &self.search) {
            (Some(file), _) => Some(Selection::Exact(file.clone())),
            (None, Some(fragment)) => Some(Selection::Search(fragment.clone())),
            (None, None) => None,
        };
        InspectRequest {
            table: self.table.clone(),
            selection,
            view: self.view.into(),
            summarize: self.summarize,
        }
    }
}

pub fn format_report(report: &InspectionReport, view: ColumnarView) -> String {
    let mut out = format!(
        "Table: {}\nFile: {}\nFormat: {}\n\n",
        report.table.name,
        report.object.label(),
        report.content.format()
    );
    out.push_str(&render_extracted(&report.content, view));
    if let Some(summary) = &report.summary {
        out.push_str("\n=== Summary ===\n");
        out.push_str(summary);
        out.push('\n');
    }
    out
}

/// Download one of a table's files and show what it contains.
pub async fn inspect_command<F>(context: &InspectContext, args: &InspectArgs, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let table = args.table.as_str();
    debug!("inspect_command called for {table}", table: table);

    let inspector = context.inspector()?;
    let request = args.request();
    let report = inspector
        .inspect(&request)
        .await
        .with_context(|| format!("Failed to inspect {table}"))?;

    if args.json {
        handler(&serde_json::to_string_pretty(&report)?);
    } else {
        handler(&format_report(&report, request.view));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_takes_precedence_over_search() {
        let args = InspectArgs {
            table: "T".to_string(),
            file: Some("a.parquet".to_string()),
            search: Some("a".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.request().selection,
            Some(Selection::Exact("a.parquet".to_string()))
        );

        let args = InspectArgs {
            table: "T".to_string(),
            view: ViewChoice::Both,
            ..Default::default()
        };
        let request = args.request();
        assert_eq!(request.selection, None);
        assert_eq!(request.view, ColumnarView::Both);
    }
}
