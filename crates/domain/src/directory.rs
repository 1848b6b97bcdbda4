//! Bus directory - Static lookup table of scheduled routes
//!
//! The directory is built once and never mutated. Filtering never fails:
//! a query with no matches yields an empty list.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::entities::BusRoute;
use crate::value_objects::{GeoLocation, RouteId};

/// How origin/destination queries are compared against route records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Names must be identical
    #[default]
    Exact,
    /// Query must appear somewhere in the name, ignoring case
    CaseInsensitiveSubstring,
}

impl MatchMode {
    /// Check whether a record field matches a query under this mode
    ///
    /// A blank query never matches.
    #[must_use]
    pub fn matches(self, candidate: &str, query: &str) -> bool {
        match self {
            Self::Exact => !query.is_empty() && candidate == query,
            Self::CaseInsensitiveSubstring => {
                let query = query.trim();
                !query.is_empty() && candidate.to_lowercase().contains(&query.to_lowercase())
            },
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "substring" | "case_insensitive_substring" => Ok(Self::CaseInsensitiveSubstring),
            _ => Err(format!(
                "Invalid match mode: {s}. Use 'exact' or 'substring'"
            )),
        }
    }
}

/// In-memory directory of scheduled bus routes
#[derive(Debug, Clone, Default)]
pub struct BusDirectory {
    routes: Vec<BusRoute>,
}

impl BusDirectory {
    /// Build a directory from route records, keeping their order
    #[must_use]
    pub fn new(routes: Vec<BusRoute>) -> Self {
        Self { routes }
    }

    /// The bundled KSRTC sample schedule
    #[must_use]
    pub fn sample() -> Self {
        Self::new(vec![
            BusRoute::new(
                1,
                "KSRTC 123",
                "Ernakulam",
                "Kozhikode",
                at(8, 30),
                GeoLocation::kochi(),
            ),
            BusRoute::new(
                2,
                "KSRTC 456",
                "Ernakulam",
                "Trivandrum",
                at(9, 15),
                GeoLocation::kochi(),
            ),
            BusRoute::new(
                3,
                "KSRTC 789",
                "Kozhikode",
                "Ernakulam",
                at(7, 45),
                GeoLocation::kozhikode(),
            ),
            BusRoute::new(
                4,
                "KSRTC 234",
                "Trivandrum",
                "Ernakulam",
                at(6, 30),
                GeoLocation::trivandrum(),
            ),
            BusRoute::new(
                5,
                "KSRTC 567",
                "Kozhikode",
                "Trivandrum",
                at(10, 0),
                GeoLocation::kozhikode(),
            ),
            BusRoute::new(
                6,
                "KSRTC 890",
                "Trivandrum",
                "Kozhikode",
                at(11, 30),
                GeoLocation::trivandrum(),
            ),
        ])
    }

    /// All routes in insertion order
    #[must_use]
    pub fn routes(&self) -> &[BusRoute] {
        &self.routes
    }

    /// Number of routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the directory holds no routes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Look up a route by ID
    #[must_use]
    pub fn get(&self, id: RouteId) -> Option<&BusRoute> {
        self.routes.iter().find(|route| route.id == id)
    }

    /// Find routes matching an origin and destination
    ///
    /// Results keep the directory's insertion order.
    #[must_use]
    pub fn find(&self, origin: &str, destination: &str, mode: MatchMode) -> Vec<&BusRoute> {
        self.routes
            .iter()
            .filter(|route| {
                mode.matches(&route.origin, origin) && mode.matches(&route.destination, destination)
            })
            .collect()
    }

    /// Sorted, de-duplicated set of every origin and destination name
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.routes
            .iter()
            .flat_map(|route| [route.origin.as_str(), route.destination.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(routes: &[&BusRoute]) -> Vec<u32> {
        routes.iter().map(|route| route.id.get()).collect()
    }

    #[test]
    fn exact_match_finds_single_route() {
        let directory = BusDirectory::sample();
        let found = directory.find("Ernakulam", "Kozhikode", MatchMode::Exact);
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let directory = BusDirectory::sample();
        assert!(
            directory
                .find("ernakulam", "kozhikode", MatchMode::Exact)
                .is_empty()
        );
    }

    #[test]
    fn no_match_returns_empty() {
        let directory = BusDirectory::sample();
        assert!(
            directory
                .find("Kannur", "Thrissur", MatchMode::Exact)
                .is_empty()
        );
        assert!(
            directory
                .find("Kannur", "Thrissur", MatchMode::CaseInsensitiveSubstring)
                .is_empty()
        );
    }

    #[test]
    fn substring_match_ignores_case() {
        let directory = BusDirectory::sample();
        let found = directory.find("erna", "KOZHI", MatchMode::CaseInsensitiveSubstring);
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn substring_match_keeps_insertion_order() {
        let directory = BusDirectory::sample();
        // Origins containing "a": Ernakulam, Trivandrum; destinations containing "m": same
        let found = directory.find("A", "M", MatchMode::CaseInsensitiveSubstring);
        assert_eq!(ids(&found), vec![2, 4]);
    }

    #[test]
    fn blank_query_never_matches() {
        let directory = BusDirectory::sample();
        assert!(directory.find("", "", MatchMode::Exact).is_empty());
        assert!(
            directory
                .find("  ", "Kozhikode", MatchMode::CaseInsensitiveSubstring)
                .is_empty()
        );
    }

    #[test]
    fn locations_are_sorted_and_unique() {
        let directory = BusDirectory::sample();
        assert_eq!(
            directory.locations(),
            vec!["Ernakulam", "Kozhikode", "Trivandrum"]
        );
    }

    #[test]
    fn get_by_id() {
        let directory = BusDirectory::sample();
        let route = directory.get(RouteId::new(3)).unwrap();
        assert_eq!(route.name, "KSRTC 789");
        assert_eq!(route.depot, GeoLocation::kozhikode());
        assert!(directory.get(RouteId::new(99)).is_none());
    }

    #[test]
    fn sample_has_six_routes() {
        let directory = BusDirectory::sample();
        assert_eq!(directory.len(), 6);
        assert!(!directory.is_empty());
        assert!(BusDirectory::default().is_empty());
    }

    #[test]
    fn match_mode_from_str() {
        assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!(
            "Substring".parse::<MatchMode>().unwrap(),
            MatchMode::CaseInsensitiveSubstring
        );
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
