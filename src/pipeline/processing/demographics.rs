use serde::{Deserialize, Serialize};

use crate::pipeline::ingestion::demographics::DemographicRow;
use crate::types::Indicator;

/// Donut-chart input: national population split by sex
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SexTotals {
    pub male: f64,
    pub female: f64,
}

/// One indicator aggregated over the states of a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionIndicator {
    pub region_label: String,
    pub indicator: Indicator,
    pub sum: f64,
    pub mean: f64,
    /// States that reported the indicator
    pub count: usize,
}

/// Long-form (state, indicator, value) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateIndicator {
    pub state_name: String,
    pub indicator: Indicator,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicsSummary {
    pub totals: SexTotals,
    /// Regions in first-appearance order, then `Indicator::REGIONAL` order
    pub region_indicators: Vec<RegionIndicator>,
    /// Total population and GDP per capita by state
    pub state_indicators: Vec<StateIndicator>,
    /// Birth and mortality rates melted into one long table
    pub vital_rates: Vec<StateIndicator>,
}

impl DemographicsSummary {
    pub fn region_indicator(&self, indicator: Indicator) -> Vec<&RegionIndicator> {
        self.region_indicators
            .iter()
            .filter(|r| r.indicator == indicator)
            .collect()
    }

    pub fn state_indicator(&self, indicator: Indicator) -> Vec<&StateIndicator> {
        self.state_indicators
            .iter()
            .filter(|s| s.indicator == indicator)
            .collect()
    }
}

pub fn summarize(rows: &[DemographicRow]) -> DemographicsSummary {
    let mut totals = SexTotals::default();
    for row in rows {
        totals.male += row.male;
        totals.female += row.female;
    }

    DemographicsSummary {
        totals,
        region_indicators: aggregate_by_region(rows, &Indicator::REGIONAL),
        state_indicators: melt(rows, &Indicator::BY_STATE),
        vital_rates: melt(rows, &Indicator::VITAL_RATES),
    }
}

/// Sum and mean of each indicator per region label
pub fn aggregate_by_region(rows: &[DemographicRow], indicators: &[Indicator]) -> Vec<RegionIndicator> {
    let mut labels: Vec<&str> = Vec::new();
    for row in rows {
        if !labels.contains(&row.region_label.as_str()) {
            labels.push(&row.region_label);
        }
    }

    let mut out = Vec::new();
    for label in labels {
        for &indicator in indicators {
            let values: Vec<f64> = rows
                .iter()
                .filter(|r| r.region_label == label)
                .filter_map(|r| r.indicator(indicator))
                .collect();
            if values.is_empty() {
                continue;
            }
            let sum: f64 = values.iter().sum();
            out.push(RegionIndicator {
                region_label: label.to_string(),
                indicator,
                sum,
                mean: sum / values.len() as f64,
                count: values.len(),
            });
        }
    }
    out
}

/// Unpivot indicator columns into (state, indicator, value) rows.
///
/// All rows of the first indicator come first, each block in source order.
/// Rows without a state name or without the value are left out.
pub fn melt(rows: &[DemographicRow], indicators: &[Indicator]) -> Vec<StateIndicator> {
    indicators
        .iter()
        .flat_map(|&indicator| {
            rows.iter().filter_map(move |row| {
                let state_name = row.state_name.as_ref()?;
                let value = row.indicator(indicator)?;
                Some(StateIndicator {
                    state_name: state_name.clone(),
                    indicator,
                    value,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(state: &str, region: &str, male: f64, female: f64, indicators: &[(Indicator, f64)]) -> DemographicRow {
        DemographicRow {
            state_name: Some(state.to_string()),
            region_label: region.to_string(),
            male,
            female,
            indicators: indicators.iter().copied().collect::<BTreeMap<_, _>>(),
            source_row: 0,
        }
    }

    #[test]
    fn test_sex_totals() {
        let summary = summarize(&[
            row("Acre", "Norte", 10.0, 12.0, &[]),
            row("Paraná", "Sul", 5.0, 6.0, &[]),
            row("Amapá", "Norte", 1.0, 2.0, &[]),
        ]);

        assert_eq!(summary.totals, SexTotals { male: 16.0, female: 20.0 });
        assert!(summary.region_indicators.is_empty());
        assert!(summary.vital_rates.is_empty());
    }

    #[test]
    fn test_region_indicators_group_in_first_appearance_order() {
        let rows = [
            row("Paraná", "Sul", 0.0, 0.0, &[(Indicator::Hdi, 0.75), (Indicator::PopulationGrowth, 0.4)]),
            row("Acre", "Norte", 0.0, 0.0, &[(Indicator::Hdi, 0.71)]),
            row("Santa Catarina", "Sul", 0.0, 0.0, &[(Indicator::Hdi, 0.79)]),
        ];
        let summary = summarize(&rows);

        let hdi = summary.region_indicator(Indicator::Hdi);
        assert_eq!(hdi.len(), 2);
        assert_eq!(hdi[0].region_label, "Sul");
        assert_eq!(hdi[0].count, 2);
        assert!((hdi[0].sum - 1.54).abs() < 1e-9);
        assert!((hdi[0].mean - 0.77).abs() < 1e-9);
        assert_eq!(hdi[1].region_label, "Norte");

        let growth = summary.region_indicator(Indicator::PopulationGrowth);
        assert_eq!(growth.len(), 1);
        assert_eq!(growth[0].sum, 0.4);

        // Sul first, then Norte; within a region, REGIONAL order
        let order: Vec<_> = summary
            .region_indicators
            .iter()
            .map(|r| (r.region_label.as_str(), r.indicator))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Sul", Indicator::PopulationGrowth),
                ("Sul", Indicator::Hdi),
                ("Norte", Indicator::Hdi),
            ]
        );
    }

    #[test]
    fn test_vital_rates_melt_birth_block_then_mortality_block() {
        let rows = [
            row("Acre", "Norte", 0.0, 0.0, &[(Indicator::BirthRate, 16.2), (Indicator::MortalityRate, 4.9)]),
            row("Bahia", "Nordeste", 0.0, 0.0, &[(Indicator::BirthRate, 13.1)]),
        ];
        let summary = summarize(&rows);

        let melted: Vec<_> = summary
            .vital_rates
            .iter()
            .map(|v| (v.state_name.as_str(), v.indicator, v.value))
            .collect();
        assert_eq!(
            melted,
            vec![
                ("Acre", Indicator::BirthRate, 16.2),
                ("Bahia", Indicator::BirthRate, 13.1),
                ("Acre", Indicator::MortalityRate, 4.9),
            ]
        );
    }

    #[test]
    fn test_state_indicators_skip_rows_without_state() {
        let mut anonymous = row("", "Sul", 0.0, 0.0, &[(Indicator::TotalPopulation, 1.0)]);
        anonymous.state_name = None;
        let rows = [
            row("Acre", "Norte", 0.0, 0.0, &[(Indicator::TotalPopulation, 830_018.0), (Indicator::GdpPerCapita, 21_374.0)]),
            anonymous,
        ];
        let summary = summarize(&rows);

        let population = summary.state_indicator(Indicator::TotalPopulation);
        assert_eq!(population.len(), 1);
        assert_eq!(population[0].state_name, "Acre");
        assert_eq!(summary.state_indicator(Indicator::GdpPerCapita)[0].value, 21_374.0);
    }
}
