use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::pipeline::processing::lookup::StateLookup;
use crate::types::{
    Diagnostic, DiagnosticKind, DiagnosticStage, EnrichedRecord, Severity, StateRecord,
};

/// Records that resolved, plus a diagnostic for every record that did not
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentOutcome {
    pub records: Vec<EnrichedRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for enriching raw state records with lookup-derived fields
pub trait Enricher {
    /// Resolve a single record, or explain why it is excluded
    fn enrich(&self, record: &StateRecord) -> Result<EnrichedRecord, Diagnostic>;
}

/// Enricher backed by the two static lookup tables
pub struct LookupEnricher<'a> {
    lookup: &'a StateLookup,
}

impl<'a> LookupEnricher<'a> {
    pub fn new(lookup: &'a StateLookup) -> Self {
        Self { lookup }
    }

    /// Enrich a batch. Unresolvable records are dropped and reported, never fatal.
    pub fn enrich_all(&self, records: &[StateRecord]) -> EnrichmentOutcome {
        let mut outcome = EnrichmentOutcome::default();

        for record in records {
            match self.enrich(record) {
                Ok(enriched) => outcome.records.push(enriched),
                Err(diagnostic) => {
                    match diagnostic.severity {
                        Severity::Warning => warn!(
                            row = record.source_row,
                            state = %record.state_name,
                            "Dropping record: {}",
                            diagnostic.description
                        ),
                        Severity::Info => info!(
                            row = record.source_row,
                            state = %record.state_name,
                            "Dropping record: {}",
                            diagnostic.description
                        ),
                    }
                    crate::metrics::record_unmapped(diagnostic.kind);
                    outcome.diagnostics.push(diagnostic);
                }
            }
        }

        debug!(
            resolved = outcome.records.len(),
            dropped = outcome.diagnostics.len(),
            "Enrichment finished"
        );
        outcome
    }
}

impl Enricher for LookupEnricher<'_> {
    fn enrich(&self, record: &StateRecord) -> Result<EnrichedRecord, Diagnostic> {
        let abbreviation = self.lookup.abbreviation(&record.state_name).ok_or_else(|| {
            Diagnostic {
                stage: DiagnosticStage::Enrich,
                kind: DiagnosticKind::UnknownState,
                // Aggregate rows ("Brasil", region subtotals) land here in the IBGE sheet
                severity: Severity::Info,
                description: format!("State '{}' is not in the lookup table", record.state_name),
                row: Some(record.source_row),
                state_name: Some(record.state_name.clone()),
            }
        })?;

        let region = self.lookup.region(abbreviation).ok_or_else(|| Diagnostic {
            stage: DiagnosticStage::Enrich,
            kind: DiagnosticKind::UnknownAbbreviation,
            severity: Severity::Warning,
            description: format!(
                "Abbreviation '{}' for state '{}' has no region",
                abbreviation, record.state_name
            ),
            row: Some(record.source_row),
            state_name: Some(record.state_name.clone()),
        })?;

        Ok(EnrichedRecord {
            state_name: record.state_name.clone(),
            population: record.population,
            abbreviation: abbreviation.to_string(),
            region,
        })
    }
}

/// Enrich `records` against `lookup`
pub fn enrich(records: &[StateRecord], lookup: &StateLookup) -> EnrichmentOutcome {
    LookupEnricher::new(lookup).enrich_all(records)
}
