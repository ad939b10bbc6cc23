use std::collections::HashSet;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::types::Destination;

/// City names offered as filters on one destination page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityFilters {
    pub destination: Destination,
    pub cities: Vec<String>,
}

/// Per-destination city filter lists held for the life of the process.
///
/// Constructed once and shared through application state; each test builds
/// its own instance.
#[derive(Debug, Default)]
pub struct CityFilterRegistry {
    filters: DashMap<Destination, Vec<String>>,
}

impl CityFilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated from configured seed lists.
    pub fn seeded<I, C>(seeds: I) -> Self
    where
        I: IntoIterator<Item = (Destination, C)>,
        C: IntoIterator<Item = String>,
    {
        let registry = Self::new();
        for (destination, cities) in seeds {
            registry.replace(destination, cities);
        }
        registry
    }

    /// Current list; empty when nothing was set for `destination`.
    pub fn get(&self, destination: &Destination) -> CityFilters {
        let cities = self
            .filters
            .get(destination)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        CityFilters {
            destination: destination.clone(),
            cities,
        }
    }

    /// Replace the list. Names are trimmed; blanks and case-insensitive
    /// duplicates are dropped, keeping first-seen order.
    pub fn replace<C>(&self, destination: Destination, cities: C) -> CityFilters
    where
        C: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let cleaned: Vec<String> = cities
            .into_iter()
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty() && seen.insert(city.to_lowercase()))
            .collect();

        self.filters.insert(destination.clone(), cleaned.clone());
        CityFilters {
            destination,
            cities: cleaned,
        }
    }

    /// Drop the list. Returns `true` when one existed.
    pub fn clear(&self, destination: &Destination) -> bool {
        self.filters.remove(destination).is_some()
    }

    /// Destinations with a stored list, sorted.
    pub fn destinations(&self) -> Vec<Destination> {
        let mut keys: Vec<Destination> = self.filters.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(tag: &str) -> Destination {
        Destination::parse(tag).unwrap()
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_destination_is_empty() {
        let registry = CityFilterRegistry::new();
        assert!(registry.get(&dest("bali")).cities.is_empty());
    }

    #[test]
    fn replace_cleans_and_dedups() {
        let registry = CityFilterRegistry::new();
        let saved = registry.replace(dest("bali"), cities(&[" Ubud", "Seminyak", "", "ubud", "Canggu "]));
        assert_eq!(saved.cities, vec!["Ubud", "Seminyak", "Canggu"]);
        assert_eq!(registry.get(&dest("Bali")), saved);
    }

    #[test]
    fn clear_and_destinations() {
        let registry = CityFilterRegistry::seeded([
            (dest("dubai"), cities(&["Deira"])),
            (dest("bali"), cities(&["Ubud"])),
        ]);
        assert_eq!(registry.destinations(), vec![dest("bali"), dest("dubai")]);

        assert!(registry.clear(&dest("bali")));
        assert!(!registry.clear(&dest("bali")));
        assert_eq!(registry.destinations(), vec![dest("dubai")]);
    }
}
