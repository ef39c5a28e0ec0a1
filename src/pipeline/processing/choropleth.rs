//! Join-key shaping for the external choropleth renderer.
//!
//! No geometry happens here: the renderer fetches the GeoJSON boundaries itself
//! and matches `abbreviation` against the feature property named by
//! `MapSettings::feature_id_key`.

use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::constants::{MAP_SCOPE, POPULATION_HOVER_FORMAT};
use crate::types::{EnrichedRecord, Region};

/// One shaded location on the map, with its hover metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethPoint {
    /// Two-letter uppercase code, the GeoJSON join key
    pub abbreviation: String,
    pub population: f64,
    pub state_name: String,
    pub region: Region,
}

/// Rendering hints passed through untouched to the map component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    pub geojson_url: String,
    pub feature_id_key: String,
    pub locations: String,
    pub color: String,
    pub hover_name: String,
    pub hover_data: Vec<HoverField>,
    pub color_scale: String,
    pub value_label: String,
    pub scope: String,
    pub fit_bounds: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverField {
    pub field: String,
    /// Format spec for numeric fields; `None` shows the raw value
    pub format: Option<String>,
}

impl MapSettings {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            geojson_url: config.geojson_url.clone(),
            feature_id_key: config.feature_id_key.clone(),
            locations: "abbreviation".to_string(),
            color: "population".to_string(),
            hover_name: "state_name".to_string(),
            hover_data: vec![
                HoverField {
                    field: "region".to_string(),
                    format: None,
                },
                HoverField {
                    field: "population".to_string(),
                    format: Some(POPULATION_HOVER_FORMAT.to_string()),
                },
            ],
            color_scale: config.color_scale.clone(),
            value_label: config.value_label.clone(),
            scope: MAP_SCOPE.to_string(),
            fit_bounds: "locations".to_string(),
        }
    }
}

/// Shape enriched records into renderer join rows, preserving input order
pub fn choropleth_points(records: &[EnrichedRecord]) -> Vec<ChoroplethPoint> {
    records
        .iter()
        .map(|record| ChoroplethPoint {
            abbreviation: record.abbreviation.clone(),
            population: record.population,
            state_name: record.state_name.clone(),
            region: record.region,
        })
        .collect()
}

/// Points restricted to one region, for the per-region map pages
pub fn region_points(points: &[ChoroplethPoint], region: Region) -> Vec<ChoroplethPoint> {
    points
        .iter()
        .filter(|point| point.region == region)
        .cloned()
        .collect()
}
