use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::pipeline::processing::aggregate::Aggregation;
use crate::types::{DetailRow, Region, RegionSummary};

/// Final display orderings handed to the table renderers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapedOutput {
    /// Descending by total population
    pub summary: Vec<RegionSummary>,
    /// Region ascending, then population descending
    pub details: Vec<DetailRow>,
}

/// Sort summaries by total population, largest first. Stable on ties.
pub fn order_summaries(summaries: &mut [RegionSummary]) {
    summaries.sort_by(|a, b| b.total_population.total_cmp(&a.total_population));
}

/// Sort details by region label, then population descending. Stable on ties.
pub fn order_details(details: &mut [DetailRow]) {
    details.sort_by(|a, b| compare_regions(a.region, b.region).then_with(|| {
        b.population.total_cmp(&a.population)
    }));
}

/// Lexicographic on the display label
fn compare_regions(a: Region, b: Region) -> Ordering {
    a.as_str().cmp(b.as_str())
}

pub fn shape(aggregation: &Aggregation) -> ShapedOutput {
    let mut summary = aggregation.summaries.clone();
    let mut details = aggregation.details.clone();
    order_summaries(&mut summary);
    order_details(&mut details);
    ShapedOutput { summary, details }
}

/// One region's states, population descending
pub fn region_details(details: &[DetailRow], region: Region) -> Vec<DetailRow> {
    let mut rows: Vec<DetailRow> = details
        .iter()
        .filter(|row| row.region == region)
        .cloned()
        .collect();
    order_details(&mut rows);
    rows
}
