use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::SourcesConfig;
use crate::error::{DashboardError, Result};
use crate::pipeline::ingestion::{parse_population, LoadedTable};
use crate::types::{DiagnosticKind, StateRecord};

/// Column layout of a delimited population table with a header row
#[derive(Debug, Clone)]
pub struct CsvLayout {
    pub delimiter: u8,
    pub state_column: String,
    pub population_column: String,
}

impl TryFrom<&SourcesConfig> for CsvLayout {
    type Error = DashboardError;

    fn try_from(sources: &SourcesConfig) -> Result<Self> {
        Ok(Self {
            delimiter: sources.delimiter_byte()?,
            state_column: sources.state_column.clone(),
            population_column: sources.population_column.clone(),
        })
    }
}

pub fn load(path: &Path, layout: &CsvLayout) -> Result<LoadedTable> {
    let file = File::open(path).map_err(|e| DashboardError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read(file, layout)
}

/// Read state rows from any reader.
///
/// A missing header column is fatal. Individual bad rows are dropped with a
/// diagnostic.
pub fn read<R: Read>(reader: R, layout: &CsvLayout) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
    };
    let state_idx = column(&layout.state_column)?;
    let population_idx = column(&layout.population_column)?;
    let required = state_idx.max(population_idx) + 1;

    let mut table = LoadedTable::default();

    for (index, result) in reader.records().enumerate() {
        // Header is row 1
        let row = index + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                table.reject(DiagnosticKind::UnreadableRow, row, None, e.to_string());
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        if record.len() < required {
            table.reject(
                DiagnosticKind::WrongColumnCount,
                row,
                record.get(state_idx),
                format!("Expected at least {} columns, found {}", required, record.len()),
            );
            continue;
        }

        let state_name = &record[state_idx];
        if state_name.is_empty() {
            table.reject(
                DiagnosticKind::MissingStateName,
                row,
                None,
                "State name is empty".to_string(),
            );
            continue;
        }

        let cell = &record[population_idx];
        match parse_population(cell) {
            Some(population) => table.records.push(StateRecord {
                state_name: state_name.to_string(),
                population,
                source_row: row,
            }),
            None => table.reject(
                DiagnosticKind::InvalidPopulation,
                row,
                Some(state_name),
                format!("Population '{}' is not a number", cell),
            ),
        }
    }

    Ok(table)
}
