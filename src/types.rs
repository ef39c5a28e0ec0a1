use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// Brazilian macro-region, one of the five standard statistical groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "North")]
    North,
    #[serde(rename = "Northeast")]
    Northeast,
    #[serde(rename = "Central-West")]
    CentralWest,
    #[serde(rename = "Southeast")]
    Southeast,
    #[serde(rename = "South")]
    South,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::North,
        Region::Northeast,
        Region::CentralWest,
        Region::Southeast,
        Region::South,
    ];

    /// Display label. Detail ordering compares these strings, not the variants.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::Northeast => "Northeast",
            Region::CentralWest => "Central-West",
            Region::Southeast => "Southeast",
            Region::South => "South",
        }
    }

    /// Portuguese name used in dashboard titles
    pub fn label_pt(&self) -> &'static str {
        match self {
            Region::North => "Norte",
            Region::Northeast => "Nordeste",
            Region::CentralWest => "Centro-Oeste",
            Region::Southeast => "Sudeste",
            Region::South => "Sul",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = DashboardError;

    /// Accepts the display label in any case, with or without the hyphen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        Region::ALL
            .into_iter()
            .find(|region| {
                let label: String = region
                    .as_str()
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect();
                label == key
            })
            .ok_or_else(|| DashboardError::UnknownRegion(s.to_string()))
    }
}

/// One row of the raw population table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub state_name: String,
    pub population: f64,
    /// 1-based row number in the source file, used in diagnostics
    pub source_row: usize,
}

/// A state record resolved against the lookup tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub state_name: String,
    pub population: f64,
    pub abbreviation: String,
    pub region: Region,
}

/// Per-region totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: Region,
    /// Sum of member populations, rounded to one decimal place
    pub total_population: f64,
    pub state_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub region: Region,
    pub state_name: String,
    pub population: f64,
}

/// Pipeline stage a diagnostic was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    Load,
    Enrich,
}

/// Kinds of row-level problems the pipeline tolerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Row has fewer columns than the layout requires
    WrongColumnCount,
    /// Population cell is empty or not a number
    InvalidPopulation,
    /// State name cell is empty
    MissingStateName,
    /// Row could not be decoded at all (bad UTF-8, broken quoting)
    UnreadableRow,
    /// State name has no abbreviation in the lookup table
    UnknownState,
    /// Abbreviation resolved but has no region
    UnknownAbbreviation,
    /// Demographics row has an empty region label
    MissingRegion,
    /// Demographics indicator cell is present but not a number
    InvalidIndicator,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::WrongColumnCount => "wrong_column_count",
            DiagnosticKind::InvalidPopulation => "invalid_population",
            DiagnosticKind::MissingStateName => "missing_state_name",
            DiagnosticKind::UnreadableRow => "unreadable_row",
            DiagnosticKind::UnknownState => "unknown_state",
            DiagnosticKind::UnknownAbbreviation => "unknown_abbreviation",
            DiagnosticKind::MissingRegion => "missing_region",
            DiagnosticKind::InvalidIndicator => "invalid_indicator",
        }
    }
}

/// Per-state indicator columns of the demographics table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "populacao_total")]
    TotalPopulation,
    #[serde(rename = "pib_per_capita")]
    GdpPerCapita,
    #[serde(rename = "crescimento_populacional")]
    PopulationGrowth,
    #[serde(rename = "natalidade")]
    BirthRate,
    #[serde(rename = "mortalidade")]
    MortalityRate,
    #[serde(rename = "expectativa_vida")]
    LifeExpectancy,
    #[serde(rename = "idh")]
    Hdi,
    #[serde(rename = "indice_saneamento")]
    Sanitation,
    #[serde(rename = "acesso_saude_publica")]
    PublicHealthAccess,
}

impl Indicator {
    pub const ALL: [Indicator; 9] = [
        Indicator::TotalPopulation,
        Indicator::GdpPerCapita,
        Indicator::PopulationGrowth,
        Indicator::BirthRate,
        Indicator::MortalityRate,
        Indicator::LifeExpectancy,
        Indicator::Hdi,
        Indicator::Sanitation,
        Indicator::PublicHealthAccess,
    ];

    /// Aggregated per region
    pub const REGIONAL: [Indicator; 5] = [
        Indicator::PopulationGrowth,
        Indicator::LifeExpectancy,
        Indicator::Hdi,
        Indicator::Sanitation,
        Indicator::PublicHealthAccess,
    ];

    /// Plotted per state
    pub const BY_STATE: [Indicator; 2] = [Indicator::TotalPopulation, Indicator::GdpPerCapita];

    /// Birth and mortality rates, melted into long form
    pub const VITAL_RATES: [Indicator; 2] = [Indicator::BirthRate, Indicator::MortalityRate];

    /// Source column name
    pub fn column(&self) -> &'static str {
        match self {
            Indicator::TotalPopulation => "populacao_total",
            Indicator::GdpPerCapita => "pib_per_capita",
            Indicator::PopulationGrowth => "crescimento_populacional",
            Indicator::BirthRate => "natalidade",
            Indicator::MortalityRate => "mortalidade",
            Indicator::LifeExpectancy => "expectativa_vida",
            Indicator::Hdi => "idh",
            Indicator::Sanitation => "indice_saneamento",
            Indicator::PublicHealthAccess => "acesso_saude_publica",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// A row dropped somewhere in the pipeline, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: DiagnosticStage,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub description: String,
    /// 1-based source row, when known
    pub row: Option<usize>,
    pub state_name: Option<String>,
}
