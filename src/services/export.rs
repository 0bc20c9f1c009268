//! JSON and CSV documents built from fetched leads.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::lead::LeadRecord;
use crate::dto::export::JsonExport;
use crate::dto::search::SearchView;

pub const EXPORT_FILE_STEM: &str = "find-people-results";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Which leads an export covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(clap::ValueEnum))]
pub enum ExportScope {
    /// Every lead fetched in the session, in fetch order.
    #[default]
    All,
    /// Leads of the selected page only.
    #[cfg_attr(feature = "client", value(name = "page"))]
    CurrentPage,
}

/// Union of record keys, in the order they are first seen.
pub fn collect_columns(leads: &[LeadRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in leads.iter().flat_map(|lead| lead.keys()) {
        if !columns.iter().any(|column| column == key) {
            columns.push(key.clone());
        }
    }
    columns
}

/// Text of a single CSV cell. Missing and `null` values are empty.
pub fn cell_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders the leads as CSV with a header row.
///
/// Cells containing a comma, a quote or a line break are quoted with inner
/// quotes doubled. Rows are joined by `\n` without a final line break.
pub fn leads_to_csv(leads: &[LeadRecord]) -> Result<String, ExportError> {
    let columns = collect_columns(leads);
    if columns.is_empty() {
        return Ok(String::new());
    }

    let mut rows = Vec::with_capacity(leads.len() + 1);
    rows.push(csv_row(&columns)?);
    for lead in leads {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| cell_value(lead.get(column)))
            .collect();
        rows.push(csv_row(&cells)?);
    }
    Ok(rows.join("\n"))
}

/// One CSV line without its terminator.
///
/// The csv writer quotes a lone empty field, so blank rows are written as
/// bare separators.
fn csv_row(cells: &[String]) -> Result<String, ExportError> {
    if cells.iter().all(String::is_empty) {
        return Ok(",".repeat(cells.len().saturating_sub(1)));
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(cells)?;

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    let mut line = String::from_utf8(bytes)?;
    line.pop();
    Ok(line)
}

/// Renders the pretty-printed JSON export document.
pub fn leads_to_json(
    total: Option<u64>,
    success: Option<bool>,
    leads: &[LeadRecord],
    downloaded_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let document = JsonExport {
        total,
        success,
        leads,
        downloaded_at,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Default download name, e.g. `find-people-results-2024-05-01.csv`.
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{EXPORT_FILE_STEM}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Renders the requested part of a search session.
pub fn export_view(
    view: &SearchView,
    format: ExportFormat,
    scope: ExportScope,
    now: DateTime<Utc>,
) -> Result<String, ExportError> {
    let leads = match scope {
        ExportScope::All => &view.all_leads,
        ExportScope::CurrentPage => &view.visible_leads,
    };

    match format {
        ExportFormat::Json => leads_to_json(view.total, view.success, leads, now),
        ExportFormat::Csv => leads_to_csv(leads),
    }
}

pub fn write_export(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    log::info!("Export written to {}", path.display());
    Ok(())
}
