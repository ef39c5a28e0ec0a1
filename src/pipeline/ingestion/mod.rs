// Pipeline ingestion: reading population and demographics tables from disk

pub mod csv_source;
pub mod demographics;
pub mod spreadsheet_source;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::SourcesConfig;
use crate::error::{DashboardError, Result};
use crate::types::{Diagnostic, DiagnosticKind, DiagnosticStage, Severity, StateRecord};

// 1-3 leading digits (no leading zero), then one or more ".ddd" groups
static GROUPED_INTEGER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{0,2}(\.[0-9]{3})+$").ok());

/// Rows that parsed, plus a diagnostic for every row that was dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedTable<T = StateRecord> {
    pub records: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for LoadedTable<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> LoadedTable<T> {
    pub(crate) fn reject(
        &mut self,
        kind: DiagnosticKind,
        row: usize,
        state_name: Option<&str>,
        description: String,
    ) {
        warn!(row, kind = ?kind, "Dropping source row: {}", description);
        crate::metrics::record_rejected(kind);
        self.diagnostics.push(Diagnostic {
            stage: DiagnosticStage::Load,
            kind,
            severity: Severity::Warning,
            description,
            row: Some(row),
            state_name: state_name.map(str::to_string),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") | Some("txt") => Ok(SourceFormat::Delimited),
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => Ok(SourceFormat::Spreadsheet),
            _ => Err(DashboardError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Fail fast when the source file is absent, naming the path
pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DashboardError::SourceNotFound {
            path: PathBuf::from(path),
        })
    }
}

/// Load the population table configured in `sources`
pub fn load_population(sources: &SourcesConfig) -> Result<LoadedTable> {
    let path = sources.population.as_path();
    ensure_exists(path)?;

    let table = match SourceFormat::from_path(path)? {
        SourceFormat::Delimited => csv_source::load(path, &csv_source::CsvLayout::try_from(sources)?)?,
        SourceFormat::Spreadsheet => spreadsheet_source::load(path)?,
    };

    info!(
        path = %path.display(),
        loaded = table.records.len(),
        rejected = table.diagnostics.len(),
        "Loaded population table"
    );
    crate::metrics::record_loaded(table.records.len());
    Ok(table)
}

/// Parse a population cell.
///
/// Follows the pt-BR convention for counts: a dot followed by groups of
/// exactly three digits ("44.000.000", "1.581") separates thousands. Other
/// cells go through [`parse_number`].
pub fn parse_population(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if is_grouped_integer(cell) {
        return cell.replace('.', "").parse::<f64>().ok();
    }
    parse_number(cell)
}

/// Parse a numeric cell that is not a count.
///
/// Plain numbers parse directly. Cells written with a decimal comma
/// ("1.234,5") have their thousands dots removed and the comma swapped.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    let value = cell.parse::<f64>().ok().or_else(|| {
        if cell.contains(',') {
            cell.replace('.', "").replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    })?;

    value.is_finite().then_some(value)
}

fn is_grouped_integer(cell: &str) -> bool {
    (*GROUPED_INTEGER)
        .as_ref()
        .map_or(false, |pattern| pattern.is_match(cell))
}
