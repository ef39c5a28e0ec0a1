use serde::{Deserialize, Serialize};

use crate::types::{DetailRow, EnrichedRecord, Region, RegionSummary};

/// Unordered aggregation result: summaries in first-appearance order of their
/// region, details in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub summaries: Vec<RegionSummary>,
    pub details: Vec<DetailRow>,
}

/// Round to one decimal place, ties to even.
///
/// Scales by ten and rounds the scaled value half-to-even, so `0.25 -> 0.2`
/// and `0.75 -> 0.8`. Values whose binary form is not exactly on a tie round
/// to the nearest representable result as usual.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Group enriched records by region.
///
/// Totals are summed in input order and rounded once per region.
pub fn aggregate(records: &[EnrichedRecord]) -> Aggregation {
    // (region, running total, count); a Vec keeps first-appearance order
    let mut groups: Vec<(Region, f64, usize)> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|(region, _, _)| *region == record.region) {
            Some((_, total, count)) => {
                *total += record.population;
                *count += 1;
            }
            None => groups.push((record.region, record.population, 1)),
        }
    }

    let summaries = groups
        .into_iter()
        .map(|(region, total, state_count)| RegionSummary {
            region,
            total_population: round_one_decimal(total),
            state_count,
        })
        .collect();

    let details = records
        .iter()
        .map(|record| DetailRow {
            region: record.region,
            state_name: record.state_name.clone(),
            population: record.population,
        })
        .collect();

    Aggregation { summaries, details }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched(name: &str, abbr: &str, region: Region, population: f64) -> EnrichedRecord {
        EnrichedRecord {
            state_name: name.to_string(),
            population,
            abbreviation: abbr.to_string(),
            region,
        }
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        assert_eq!(round_one_decimal(0.25), 0.2);
        assert_eq!(round_one_decimal(0.75), 0.8);
        assert_eq!(round_one_decimal(1.25), 1.2);
        assert_eq!(round_one_decimal(-0.25), -0.2);
        assert_eq!(round_one_decimal(61_000_000.0), 61_000_000.0);
        assert_eq!(round_one_decimal(3.14159), 3.1);
        assert_eq!(round_one_decimal(2.96), 3.0);
    }

    #[test]
    fn test_aggregate_groups_in_first_appearance_order() {
        let records = vec![
            enriched("São Paulo", "SP", Region::Southeast, 44_000_000.0),
            enriched("Acre", "AC", Region::North, 900_000.0),
            enriched("Rio de Janeiro", "RJ", Region::Southeast, 17_000_000.0),
        ];

        let aggregation = aggregate(&records);

        assert_eq!(
            aggregation.summaries,
            vec![
                RegionSummary {
                    region: Region::Southeast,
                    total_population: 61_000_000.0,
                    state_count: 2,
                },
                RegionSummary {
                    region: Region::North,
                    total_population: 900_000.0,
                    state_count: 1,
                },
            ]
        );
        assert_eq!(aggregation.details.len(), 3);
        assert_eq!(aggregation.details[1].state_name, "Acre");
    }

    #[test]
    fn test_totals_are_rounded_after_summing() {
        // 0.125 + 0.125 = 0.25 exactly, which rounds to 0.2 under ties-to-even
        let records = vec![
            enriched("Paraná", "PR", Region::South, 0.125),
            enriched("Santa Catarina", "SC", Region::South, 0.125),
        ];

        let aggregation = aggregate(&records);
        assert_eq!(aggregation.summaries[0].total_population, 0.2);
        // Details keep the unrounded population
        assert_eq!(aggregation.details[0].population, 0.125);
    }

    #[test]
    fn test_state_count_matches_detail_rows_per_region() {
        let records = vec![
            enriched("Bahia", "BA", Region::Northeast, 14_141.6),
            enriched("Ceará", "CE", Region::Northeast, 8_794.9),
            enriched("Goiás", "GO", Region::CentralWest, 7_056.5),
            enriched("Sergipe", "SE", Region::Northeast, 2_210.0),
        ];

        let aggregation = aggregate(&records);

        for summary in &aggregation.summaries {
            let details = aggregation
                .details
                .iter()
                .filter(|d| d.region == summary.region)
                .count();
            assert_eq!(summary.state_count, details);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(&[]), Aggregation::default());
    }
}
