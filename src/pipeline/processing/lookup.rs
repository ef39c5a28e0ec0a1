//! Static lookup tables for Brazil's 27 federative units.
//!
//! Enrichment takes a `&StateLookup` explicitly; `StateLookup::brazil()` is the
//! process-wide instance built from the tables below, and tests build smaller
//! fixture tables with `StateLookup::new`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::types::Region;

/// State name (as spelled in the IBGE spreadsheets) to two-letter code
pub const STATE_ABBREVIATIONS: [(&str, &str); 27] = [
    ("Acre", "AC"),
    ("Alagoas", "AL"),
    ("Amapá", "AP"),
    ("Amazonas", "AM"),
    ("Bahia", "BA"),
    ("Ceará", "CE"),
    ("Distrito Federal", "DF"),
    ("Espírito Santo", "ES"),
    ("Goiás", "GO"),
    ("Maranhão", "MA"),
    ("Mato Grosso", "MT"),
    ("Mato Grosso do Sul", "MS"),
    ("Minas Gerais", "MG"),
    ("Pará", "PA"),
    ("Paraíba", "PB"),
    ("Paraná", "PR"),
    ("Pernambuco", "PE"),
    ("Piauí", "PI"),
    ("Rio de Janeiro", "RJ"),
    ("Rio Grande do Norte", "RN"),
    ("Rio Grande do Sul", "RS"),
    ("Rondônia", "RO"),
    ("Roraima", "RR"),
    ("Santa Catarina", "SC"),
    ("São Paulo", "SP"),
    ("Sergipe", "SE"),
    ("Tocantins", "TO"),
];

pub const STATE_REGIONS: [(&str, Region); 27] = [
    ("AC", Region::North),
    ("AP", Region::North),
    ("AM", Region::North),
    ("PA", Region::North),
    ("RO", Region::North),
    ("RR", Region::North),
    ("TO", Region::North),
    ("AL", Region::Northeast),
    ("BA", Region::Northeast),
    ("CE", Region::Northeast),
    ("MA", Region::Northeast),
    ("PB", Region::Northeast),
    ("PE", Region::Northeast),
    ("PI", Region::Northeast),
    ("RN", Region::Northeast),
    ("SE", Region::Northeast),
    ("DF", Region::CentralWest),
    ("GO", Region::CentralWest),
    ("MT", Region::CentralWest),
    ("MS", Region::CentralWest),
    ("ES", Region::Southeast),
    ("MG", Region::Southeast),
    ("RJ", Region::Southeast),
    ("SP", Region::Southeast),
    ("PR", Region::South),
    ("RS", Region::South),
    ("SC", Region::South),
];

static BRAZIL: Lazy<StateLookup> =
    Lazy::new(|| StateLookup::new(STATE_ABBREVIATIONS, STATE_REGIONS));

/// Read-only state name → abbreviation → region mapping
#[derive(Debug, Clone, Default)]
pub struct StateLookup {
    abbreviations: HashMap<String, String>,
    regions: HashMap<String, Region>,
}

impl StateLookup {
    pub fn new<N, A, R>(
        abbreviations: impl IntoIterator<Item = (N, A)>,
        regions: impl IntoIterator<Item = (R, Region)>,
    ) -> Self
    where
        N: Into<String>,
        A: Into<String>,
        R: Into<String>,
    {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|(name, abbr)| (name.into(), abbr.into()))
                .collect(),
            regions: regions
                .into_iter()
                .map(|(abbr, region)| (abbr.into(), region))
                .collect(),
        }
    }

    /// The embedded 27-unit table, built once per process
    pub fn brazil() -> &'static StateLookup {
        &BRAZIL
    }

    /// Exact, case- and accent-sensitive match on the state name
    pub fn abbreviation(&self, state_name: &str) -> Option<&str> {
        self.abbreviations.get(state_name).map(String::as_str)
    }

    pub fn region(&self, abbreviation: &str) -> Option<Region> {
        self.regions.get(abbreviation).copied()
    }

    pub fn len(&self) -> usize {
        self.abbreviations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abbreviations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_brazil_table_covers_every_federative_unit() {
        let lookup = StateLookup::brazil();
        assert_eq!(lookup.len(), 27);

        for (name, abbr) in STATE_ABBREVIATIONS {
            assert_eq!(lookup.abbreviation(name), Some(abbr));
            assert!(lookup.region(abbr).is_some(), "{} has no region", abbr);
        }
    }

    #[test]
    fn test_abbreviations_are_two_uppercase_letters_and_unique() {
        let mut seen = HashSet::new();
        for (_, abbr) in STATE_ABBREVIATIONS {
            assert_eq!(abbr.len(), 2);
            assert!(abbr.chars().all(|c| c.is_ascii_uppercase()));
            assert!(seen.insert(abbr), "duplicate abbreviation {}", abbr);
        }
    }

    #[test]
    fn test_region_membership_counts() {
        let count = |region: Region| STATE_REGIONS.iter().filter(|(_, r)| *r == region).count();
        assert_eq!(count(Region::North), 7);
        assert_eq!(count(Region::Northeast), 9);
        assert_eq!(count(Region::CentralWest), 4);
        assert_eq!(count(Region::Southeast), 4);
        assert_eq!(count(Region::South), 3);
    }

    #[test]
    fn test_lookup_is_accent_and_case_sensitive() {
        let lookup = StateLookup::brazil();
        assert_eq!(lookup.abbreviation("São Paulo"), Some("SP"));
        assert_eq!(lookup.abbreviation("Sao Paulo"), None);
        assert_eq!(lookup.abbreviation("são paulo"), None);
        // Sergipe's code is not the Southeast region
        assert_eq!(lookup.region("SE"), Some(Region::Northeast));
    }

    #[test]
    fn test_fixture_table() {
        let lookup = StateLookup::new([("Acre", "AC")], [("AC", Region::North)]);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.abbreviation("Acre"), Some("AC"));
        assert_eq!(lookup.region("AC"), Some(Region::North));
        assert_eq!(lookup.abbreviation("Bahia"), None);
    }
}
