//! Spreadsheet population source.
//!
//! Reads the first worksheet as a fixed two-column layout (state name,
//! population) with no header row: every non-empty row is treated as data.
//! Title rows, the national total and region subtotals therefore come through
//! as records and are filtered later by the lookup enrichment.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::pipeline::ingestion::{parse_population, LoadedTable};
use crate::types::{DiagnosticKind, StateRecord};

const STATE_COL: usize = 0;
const POPULATION_COL: usize = 1;

pub fn load(path: &Path) -> Result<LoadedTable> {
    let unreadable = |reason: String| DashboardError::SourceUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unreadable("workbook has no worksheets".to_string()))?
        .map_err(|e| unreadable(e.to_string()))?;

    debug!(path = %path.display(), "Reading first worksheet");
    Ok(read_range(&range))
}

/// Convert a worksheet range into state records
pub fn read_range(range: &Range<Data>) -> LoadedTable {
    let mut table = LoadedTable::default();
    // Absolute sheet row of the range's first row, for 1-based diagnostics
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    for (index, cells) in range.rows().enumerate() {
        let row = first_row + index + 1;

        if cells.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        if cells.len() <= POPULATION_COL {
            table.reject(
                DiagnosticKind::WrongColumnCount,
                row,
                None,
                format!("Expected 2 columns, found {}", cells.len()),
            );
            continue;
        }

        let state_name = match cell_text(&cells[STATE_COL]) {
            Some(name) => name,
            None => {
                table.reject(
                    DiagnosticKind::MissingStateName,
                    row,
                    None,
                    "State name cell is empty".to_string(),
                );
                continue;
            }
        };

        match cell_number(&cells[POPULATION_COL]) {
            Some(population) => table.records.push(StateRecord {
                state_name,
                population,
                source_row: row,
            }),
            None => {
                let description = format!(
                    "Population cell '{}' is not a number",
                    cells[POPULATION_COL]
                );
                table.reject(
                    DiagnosticKind::InvalidPopulation,
                    row,
                    Some(&state_name),
                    description,
                );
            }
        }
    }

    table
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Empty => None,
        other => Some(other.to_string()),
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::String(s) => parse_population(s),
        _ => None,
    }
}
