use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants::{
    DEMOGRAPHICS_FEMALE_COLUMN, DEMOGRAPHICS_MALE_COLUMN, DEMOGRAPHICS_REGION_COLUMN,
    DEMOGRAPHICS_STATE_COLUMN,
};
use crate::error::{DashboardError, Result};
use crate::pipeline::ingestion::{ensure_exists, parse_number, parse_population, LoadedTable};
use crate::types::{DiagnosticKind, Indicator};

/// One row of the demographics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRow {
    /// Empty when the table has no `estado` column
    pub state_name: Option<String>,
    /// Region label as written in the source (not resolved to `Region`)
    pub region_label: String,
    pub male: f64,
    pub female: f64,
    /// Indicator cells that were present; blank cells are absent
    pub indicators: BTreeMap<Indicator, f64>,
    pub source_row: usize,
}

impl DemographicRow {
    pub fn indicator(&self, indicator: Indicator) -> Option<f64> {
        self.indicators.get(&indicator).copied()
    }
}

pub fn load(path: &Path, delimiter: u8) -> Result<LoadedTable<DemographicRow>> {
    ensure_exists(path)?;
    let file = File::open(path).map_err(|e| DashboardError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read(file, delimiter)
}

/// Read demographics rows.
///
/// `regiao` and the sex split columns are required. `estado` and the
/// indicator columns are picked up when the header has them.
pub fn read<R: Read>(reader: R, delimiter: u8) -> Result<LoadedTable<DemographicRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let column = |name: &str| {
        position(name).ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
    };
    let region_idx = column(DEMOGRAPHICS_REGION_COLUMN)?;
    let male_idx = column(DEMOGRAPHICS_MALE_COLUMN)?;
    let female_idx = column(DEMOGRAPHICS_FEMALE_COLUMN)?;
    let required = region_idx.max(male_idx).max(female_idx) + 1;

    let state_idx = position(DEMOGRAPHICS_STATE_COLUMN);
    let indicator_columns: Vec<(Indicator, usize)> = Indicator::ALL
        .into_iter()
        .filter_map(|indicator| position(indicator.column()).map(|idx| (indicator, idx)))
        .collect();

    let mut table = LoadedTable::default();

    'rows: for (index, result) in reader.records().enumerate() {
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

        let state_name = state_idx
            .and_then(|idx| record.get(idx))
            .filter(|name| !name.is_empty());

        if record.len() < required {
            table.reject(
                DiagnosticKind::WrongColumnCount,
                row,
                state_name,
                format!("Expected at least {} columns, found {}", required, record.len()),
            );
            continue;
        }

        let region_label = &record[region_idx];
        if region_label.is_empty() {
            table.reject(
                DiagnosticKind::MissingRegion,
                row,
                state_name,
                "Region label is empty".to_string(),
            );
            continue;
        }

        let (male, female) = match (
            parse_population(&record[male_idx]),
            parse_population(&record[female_idx]),
        ) {
            (Some(male), Some(female)) => (male, female),
            _ => {
                table.reject(
                    DiagnosticKind::InvalidPopulation,
                    row,
                    state_name,
                    format!(
                        "Population split '{}' / '{}' is not numeric",
                        &record[male_idx], &record[female_idx]
                    ),
                );
                continue;
            }
        };

        let mut indicators = BTreeMap::new();
        for &(indicator, idx) in &indicator_columns {
            let cell = record.get(idx).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            let parsed = match indicator {
                Indicator::TotalPopulation => parse_population(cell),
                _ => parse_number(cell),
            };
            match parsed {
                Some(value) => {
                    indicators.insert(indicator, value);
                }
                None => {
                    table.reject(
                        DiagnosticKind::InvalidIndicator,
                        row,
                        state_name,
                        format!("{} '{}' is not a number", indicator.column(), cell),
                    );
                    continue 'rows;
                }
            }
        }

        table.records.push(DemographicRow {
            state_name: state_name.map(str::to_string),
            region_label: region_label.to_string(),
            male,
            female,
            indicators,
            source_row: row,
        });
    }

    Ok(table)
}
