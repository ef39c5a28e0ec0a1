//! Dashboard document generation.
//!
//! Builds a declarative JSON description of the dashboard pages (grid layout,
//! figures, tables and filter controls) from the pipeline output. Rendering
//! is left to whatever visualization layer consumes the document.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::ingestion::demographics;
use crate::pipeline::processing::choropleth::{region_points, ChoroplethPoint, MapSettings};
use crate::pipeline::processing::demographics::{summarize, DemographicsSummary};
use crate::pipeline::processing::StateLookup;
use crate::pipeline::{GeoPipeline, PipelineOutput};
use crate::types::{DetailRow, Indicator, Region};

pub const NATIONAL_PAGE_ID: &str = "visao_nacional";
pub const DEMOGRAPHICS_PAGE_ID: &str = "demografia";
pub const STATES_PAGE_ID: &str = "estados";
pub const QUALITY_OF_LIFE_PAGE_ID: &str = "qualidade_vida";
pub const VITAL_RATES_PAGE_ID: &str = "natalidade_mortalidade";
pub const HEALTH_PAGE_ID: &str = "saude";

/// Pipeline output plus everything else the pages need
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub output: PipelineOutput,
    pub map: MapSettings,
    pub demographics: Option<DemographicsSummary>,
}

impl DashboardData {
    /// Run the population pipeline and, when configured, load demographics
    pub fn load(config: &Config, lookup: &StateLookup) -> Result<Self> {
        let mut output = GeoPipeline::new(lookup).load_and_run(&config.sources)?;

        let demographics = match &config.sources.demographics {
            Some(path) => {
                let table = demographics::load(path, config.sources.delimiter_byte()?)?;
                info!(
                    path = %path.display(),
                    rows = table.records.len(),
                    rejected = table.diagnostics.len(),
                    "Loaded demographics table"
                );
                output.diagnostics.extend(table.diagnostics);
                Some(summarize(&table.records))
            }
            None => None,
        };

        Ok(Self {
            output,
            map: MapSettings::from_config(&config.map),
            demographics,
        })
    }
}

/// URL-safe page id for a region page
pub fn region_page_id(region: Region) -> String {
    region.as_str().to_lowercase()
}

/// Dashboard builder for generating the page document
pub struct DashboardBuilder<'a> {
    title: String,
    data: &'a DashboardData,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(data: &'a DashboardData) -> Self {
        Self {
            title: "Lumina BI".to_string(),
            data,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build the complete dashboard document
    pub fn build(&self) -> Value {
        let mut pages = vec![self.national_page()];
        for region in self.data.output.regions() {
            pages.push(self.region_page(region));
        }
        if let Some(demographics) = &self.data.demographics {
            pages.extend(self.demographics_pages(demographics));
        }

        json!({
            "title": self.title,
            "pages": pages,
        })
    }

    /// Map, regional summary and per-state detail, filterable by region
    pub fn national_page(&self) -> Value {
        let output = &self.data.output;
        json!({
            "id": NATIONAL_PAGE_ID,
            "title": "Visão Nacional",
            "layout": { "grid": [[0, 1], [2, 2]] },
            "components": [
                self.map_graph("Mapa de Distribuição Populacional", &output.choropleth),
                table(
                    "Dados por Região",
                    &["region", "total_population", "state_count"],
                    &output.summary,
                ),
                table(
                    "Dados por Estado",
                    &["region", "state_name", "population"],
                    &output.details,
                ),
            ],
            "controls": [
                { "type": "filter", "column": "region" }
            ],
        })
    }

    /// Regional map next to the region's states, largest first
    pub fn region_page(&self, region: Region) -> Value {
        let points = region_points(&self.data.output.choropleth, region);
        let rows: Vec<StateRow> = self
            .data
            .output
            .region_details(region)
            .into_iter()
            .map(StateRow::from)
            .collect();

        json!({
            "id": region_page_id(region),
            "title": format!("Região {}", region.label_pt()),
            "layout": { "grid": [[0, 1]] },
            "components": [
                self.map_graph(&format!("Mapa da Região {}", region.label_pt()), &points),
                table("Detalhes", &["state_name", "population"], &rows),
            ],
            "controls": [],
        })
    }

    /// Demographics pages, in order: sex split and growth, states,
    /// quality of life, birth vs mortality, health
    pub fn demographics_pages(&self, demographics: &DemographicsSummary) -> Vec<Value> {
        vec![
            self.demographics_page(demographics),
            self.states_page(demographics),
            self.quality_of_life_page(demographics),
            self.vital_rates_page(demographics),
            self.health_page(demographics),
        ]
    }

    /// Sex split donut next to population growth by region
    pub fn demographics_page(&self, demographics: &DemographicsSummary) -> Value {
        json!({
            "id": DEMOGRAPHICS_PAGE_ID,
            "title": "Demografia",
            "layout": { "grid": [[0, 1]] },
            "components": [
                {
                    "type": "graph",
                    "title": "População por Sexo",
                    "figure": {
                        "kind": "pie",
                        "hole": 0.5,
                        "names": "category",
                        "values": "total",
                        "data": [
                            { "category": "População Masculina", "total": demographics.totals.male },
                            { "category": "População Feminina", "total": demographics.totals.female },
                        ],
                    },
                },
                region_histogram(
                    "Crescimento Populacional por Região",
                    demographics,
                    Indicator::PopulationGrowth,
                    "v",
                ),
            ],
            "controls": [],
        })
    }

    pub fn states_page(&self, demographics: &DemographicsSummary) -> Value {
        json!({
            "id": STATES_PAGE_ID,
            "title": "Estados",
            "layout": { "grid": [[0, 1]] },
            "components": [
                state_histogram("Distribuição Populacional", demographics, Indicator::TotalPopulation),
                state_histogram("PIB per Capita por Estado", demographics, Indicator::GdpPerCapita),
            ],
            "controls": [
                { "type": "filter", "column": "state_name" }
            ],
        })
    }

    pub fn quality_of_life_page(&self, demographics: &DemographicsSummary) -> Value {
        json!({
            "id": QUALITY_OF_LIFE_PAGE_ID,
            "title": "Qualidade de Vida",
            "layout": { "grid": [[0, 1]] },
            "components": [
                region_histogram(
                    "Expectativa de Vida por Região",
                    demographics,
                    Indicator::LifeExpectancy,
                    "h",
                ),
                region_histogram("IDH por Região", demographics, Indicator::Hdi, "h"),
            ],
            "controls": [
                { "type": "filter", "column": "region_label" }
            ],
        })
    }

    /// Grouped bars over the melted birth/mortality table
    pub fn vital_rates_page(&self, demographics: &DemographicsSummary) -> Value {
        json!({
            "id": VITAL_RATES_PAGE_ID,
            "title": "Natalidade vs Mortalidade",
            "layout": { "grid": [[0]] },
            "components": [
                {
                    "type": "graph",
                    "title": "Natalidade vs Mortalidade",
                    "figure": {
                        "kind": "histogram",
                        "x": "state_name",
                        "y": "value",
                        "color": "indicator",
                        "barmode": "group",
                        "data": demographics.vital_rates,
                    },
                },
            ],
            "controls": [],
        })
    }

    pub fn health_page(&self, demographics: &DemographicsSummary) -> Value {
        json!({
            "id": HEALTH_PAGE_ID,
            "title": "Saúde",
            "layout": { "grid": [[0, 1]] },
            "components": [
                region_histogram("Índice de Saneamento", demographics, Indicator::Sanitation, "v"),
                region_histogram(
                    "Acesso à Saúde Pública",
                    demographics,
                    Indicator::PublicHealthAccess,
                    "v",
                ),
            ],
            "controls": [],
        })
    }

    fn map_graph(&self, title: &str, points: &[ChoroplethPoint]) -> Value {
        json!({
            "type": "graph",
            "title": title,
            "figure": {
                "kind": "choropleth",
                "settings": self.data.map,
                "data": points,
            },
        })
    }
}

#[derive(Debug, Serialize)]
struct StateRow {
    state_name: String,
    population: f64,
}

impl From<DetailRow> for StateRow {
    fn from(row: DetailRow) -> Self {
        Self {
            state_name: row.state_name,
            population: row.population,
        }
    }
}

/// Bars of one regional indicator; `sum` is the bar height
fn region_histogram(
    title: &str,
    demographics: &DemographicsSummary,
    indicator: Indicator,
    orientation: &str,
) -> Value {
    json!({
        "type": "graph",
        "title": title,
        "figure": {
            "kind": "histogram",
            "x": "region_label",
            "y": "sum",
            "orientation": orientation,
            "indicator": indicator,
            "data": demographics.region_indicator(indicator),
        },
    })
}

fn state_histogram(title: &str, demographics: &DemographicsSummary, indicator: Indicator) -> Value {
    json!({
        "type": "graph",
        "title": title,
        "figure": {
            "kind": "histogram",
            "x": "state_name",
            "y": "value",
            "indicator": indicator,
            "data": demographics.state_indicator(indicator),
        },
    })
}

fn table<T: Serialize>(title: &str, columns: &[&str], rows: &[T]) -> Value {
    json!({
        "type": "table",
        "title": title,
        "columns": columns,
        "rows": rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::pipeline::processing::demographics::{RegionIndicator, SexTotals, StateIndicator};
    use crate::types::StateRecord;

    fn data() -> DashboardData {
        let records: Vec<StateRecord> = [
            ("São Paulo", 44_000_000.0),
            ("Rio de Janeiro", 17_000_000.0),
            ("Acre", 900_000.0),
            ("Roraima", 650_000.0),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, population))| StateRecord {
            state_name: name.to_string(),
            population,
            source_row: i + 1,
        })
        .collect();

        DashboardData {
            output: GeoPipeline::new(StateLookup::brazil()).run(&records),
            map: MapSettings::from_config(&MapConfig::default()),
            demographics: None,
        }
    }

    fn grid_cells(page: &Value) -> usize {
        let mut max = 0;
        for row in page["layout"]["grid"].as_array().unwrap() {
            for cell in row.as_array().unwrap() {
                max = max.max(cell.as_u64().unwrap() as usize);
            }
        }
        max + 1
    }

    #[test]
    fn test_national_page_then_one_page_per_region() {
        let data = data();
        let doc = DashboardBuilder::new(&data).build();

        let ids: Vec<_> = doc["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["visao_nacional", "north", "southeast"]);
        assert_eq!(doc["title"], "Lumina BI");
    }

    #[test]
    fn test_grids_reference_every_component() {
        let data = data();
        let doc = DashboardBuilder::new(&data).build();

        for page in doc["pages"].as_array().unwrap() {
            let components = page["components"].as_array().unwrap().len();
            assert_eq!(grid_cells(page), components, "page {}", page["id"]);
        }
    }

    #[test]
    fn test_national_tables_use_display_orderings() {
        let data = data();
        let page = DashboardBuilder::new(&data).national_page();

        let summary = &page["components"][1]["rows"];
        assert_eq!(summary[0]["region"], "Southeast");
        assert_eq!(summary[0]["total_population"], 61_000_000.0);
        assert_eq!(summary[1]["region"], "North");

        let details = &page["components"][2]["rows"];
        assert_eq!(details[0]["state_name"], "Acre");
        assert_eq!(details[2]["state_name"], "São Paulo");

        assert_eq!(page["controls"][0]["column"], "region");
        let map = &page["components"][0]["figure"];
        assert_eq!(map["settings"]["feature_id_key"], "properties.sigla");
        assert_eq!(map["data"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_region_page_lists_only_its_states() {
        let data = data();
        let page = DashboardBuilder::new(&data).region_page(Region::North);

        assert_eq!(page["title"], "Região Norte");
        assert_eq!(page["components"][0]["title"], "Mapa da Região Norte");
        let rows = page["components"][1]["rows"].as_array().unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["state_name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Acre", "Roraima"]);
        let codes: Vec<_> = page["components"][0]["figure"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["abbreviation"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["AC", "RR"]);
    }

    #[test]
    fn test_demographics_pages_are_appended_when_present() {
        let mut data = data();
        data.demographics = Some(DemographicsSummary {
            totals: SexTotals {
                male: 98_532_431.0,
                female: 104_548_325.0,
            },
            region_indicators: vec![
                RegionIndicator {
                    region_label: "Norte".to_string(),
                    indicator: Indicator::PopulationGrowth,
                    sum: 1.8,
                    mean: 0.9,
                    count: 2,
                },
                RegionIndicator {
                    region_label: "Norte".to_string(),
                    indicator: Indicator::Hdi,
                    sum: 1.42,
                    mean: 0.71,
                    count: 2,
                },
            ],
            state_indicators: vec![],
            vital_rates: vec![
                StateIndicator {
                    state_name: "Acre".to_string(),
                    indicator: Indicator::BirthRate,
                    value: 16.2,
                },
                StateIndicator {
                    state_name: "Acre".to_string(),
                    indicator: Indicator::MortalityRate,
                    value: 4.9,
                },
            ],
        });

        let doc = DashboardBuilder::new(&data).with_title("Painel").build();
        let pages = doc["pages"].as_array().unwrap();
        let ids: Vec<_> = pages.iter().map(|p| p["id"].as_str().unwrap()).collect();
        assert_eq!(
            ids,
            vec![
                "visao_nacional",
                "north",
                "southeast",
                DEMOGRAPHICS_PAGE_ID,
                STATES_PAGE_ID,
                QUALITY_OF_LIFE_PAGE_ID,
                VITAL_RATES_PAGE_ID,
                HEALTH_PAGE_ID,
            ]
        );
        assert_eq!(doc["title"], "Painel");

        let demographics = &pages[3];
        assert_eq!(demographics["components"][0]["figure"]["data"][0]["total"], 98_532_431.0);
        let growth = &demographics["components"][1];
        assert_eq!(growth["title"], "Crescimento Populacional por Região");
        assert_eq!(growth["figure"]["data"].as_array().unwrap().len(), 1);
        assert_eq!(growth["figure"]["data"][0]["sum"], 1.8);

        let hdi = &pages[5]["components"][1]["figure"];
        assert_eq!(hdi["indicator"], "idh");
        assert_eq!(hdi["data"][0]["mean"], 0.71);

        let vital = &pages[6]["components"][0]["figure"];
        assert_eq!(vital["barmode"], "group");
        assert_eq!(vital["data"][1]["indicator"], "mortalidade");

        for page in pages {
            let components = page["components"].as_array().unwrap().len();
            assert_eq!(grid_cells(page), components, "page {}", page["id"]);
        }
    }
}
