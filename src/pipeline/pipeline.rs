use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, info_span, instrument};

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::pipeline::ingestion::{self, LoadedTable};
use crate::pipeline::processing::choropleth::{choropleth_points, ChoroplethPoint};
use crate::pipeline::processing::shape::region_details;
use crate::pipeline::processing::{aggregate, enrich, shape, StateLookup};
use crate::types::{DetailRow, Diagnostic, Region, RegionSummary, StateRecord};

/// Everything the renderers consume, in final display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Choropleth join rows, in input order
    pub choropleth: Vec<ChoroplethPoint>,
    /// Descending by total population
    pub summary: Vec<RegionSummary>,
    /// Region ascending, then population descending
    pub details: Vec<DetailRow>,
    /// Load and enrichment diagnostics, in the order they were raised
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineOutput {
    /// Regions present in the output, ascending by label
    pub fn regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();
        for row in &self.details {
            if !regions.contains(&row.region) {
                regions.push(row.region);
            }
        }
        regions.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        regions
    }

    /// One region's states, population descending
    pub fn region_details(&self, region: Region) -> Vec<DetailRow> {
        region_details(&self.details, region)
    }

    pub fn total_population(&self) -> f64 {
        self.summary.iter().map(|s| s.total_population).sum()
    }
}

/// enrich → aggregate → shape, with choropleth shaping alongside
pub struct GeoPipeline<'a> {
    lookup: &'a StateLookup,
}

impl<'a> GeoPipeline<'a> {
    pub fn new(lookup: &'a StateLookup) -> Self {
        Self { lookup }
    }

    /// Run over already-loaded records. Pure; never fails.
    pub fn run(&self, records: &[StateRecord]) -> PipelineOutput {
        let enriched = {
            let _span = info_span!("enrich", records = records.len()).entered();
            enrich(records, self.lookup)
        };

        let aggregation = {
            let _span = info_span!("aggregate", records = enriched.records.len()).entered();
            aggregate(&enriched.records)
        };

        let shaped = shape(&aggregation);

        PipelineOutput {
            choropleth: choropleth_points(&enriched.records),
            summary: shaped.summary,
            details: shaped.details,
            diagnostics: enriched.diagnostics,
        }
    }

    /// Run over a loaded table, keeping its load diagnostics ahead of the
    /// enrichment ones
    pub fn run_table(&self, table: LoadedTable) -> PipelineOutput {
        let mut output = self.run(&table.records);
        let mut diagnostics = table.diagnostics;
        diagnostics.append(&mut output.diagnostics);
        output.diagnostics = diagnostics;
        output
    }

    /// Load the configured population source and run the full pipeline.
    ///
    /// A missing or unreadable source aborts before any stage runs.
    #[instrument(skip(self, sources), fields(path = %sources.population.display()))]
    pub fn load_and_run(&self, sources: &SourcesConfig) -> Result<PipelineOutput> {
        let started = Instant::now();

        let table = ingestion::load_population(sources)?;
        let output = self.run_table(table);

        let elapsed = started.elapsed().as_secs_f64();
        crate::metrics::record_run(elapsed);
        info!(
            regions = output.summary.len(),
            states = output.details.len(),
            diagnostics = output.diagnostics.len(),
            elapsed_secs = elapsed,
            "Pipeline finished"
        );
        Ok(output)
    }
}
