//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{BusDirectory, MatchMode, value_objects::GeoLocation};
use proptest::prelude::*;

// ============================================================================
// GeoLocation Property Tests
// ============================================================================

mod geo_location_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_coordinates_create_location(
            lat in -90.0f64..=90.0f64,
            lon in -180.0f64..=180.0f64
        ) {
            let result = GeoLocation::new(lat, lon);
            prop_assert!(result.is_ok());

            let loc = result.unwrap();
            prop_assert!((loc.latitude() - lat).abs() < f64::EPSILON);
            prop_assert!((loc.longitude() - lon).abs() < f64::EPSILON);
        }

        #[test]
        fn invalid_latitude_rejected(
            lat in prop_oneof![
                (-1000.0f64..-90.1f64),
                (90.1f64..1000.0f64)
            ],
            lon in -180.0f64..=180.0f64
        ) {
            prop_assert!(GeoLocation::new(lat, lon).is_err());
        }

        #[test]
        fn invalid_longitude_rejected(
            lat in -90.0f64..=90.0f64,
            lon in prop_oneof![
                (-1000.0f64..-180.1f64),
                (180.1f64..1000.0f64)
            ]
        ) {
            prop_assert!(GeoLocation::new(lat, lon).is_err());
        }

        #[test]
        fn distance_to_self_is_zero(
            lat in -90.0f64..=90.0f64,
            lon in -180.0f64..=180.0f64
        ) {
            let loc = GeoLocation::new_unchecked(lat, lon);
            prop_assert!(loc.distance_km(&loc).abs() < 0.001);
        }

        #[test]
        fn distance_is_symmetric(
            lat1 in -90.0f64..=90.0f64,
            lon1 in -180.0f64..=180.0f64,
            lat2 in -90.0f64..=90.0f64,
            lon2 in -180.0f64..=180.0f64
        ) {
            let a = GeoLocation::new_unchecked(lat1, lon1);
            let b = GeoLocation::new_unchecked(lat2, lon2);
            prop_assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-6);
        }

        #[test]
        fn distance_is_non_negative_and_bounded(
            lat1 in -90.0f64..=90.0f64,
            lon1 in -180.0f64..=180.0f64,
            lat2 in -90.0f64..=90.0f64,
            lon2 in -180.0f64..=180.0f64
        ) {
            let a = GeoLocation::new_unchecked(lat1, lon1);
            let b = GeoLocation::new_unchecked(lat2, lon2);
            let distance = a.distance_km(&b);
            // Half the Earth's circumference
            prop_assert!(distance >= 0.0);
            prop_assert!(distance <= 20_016.0);
        }
    }
}

// ============================================================================
// BusDirectory Property Tests
// ============================================================================

mod directory_tests {
    use super::*;

    proptest! {
        #[test]
        fn filtering_never_fails_and_only_returns_matches(
            origin in "[A-Za-z ]{0,12}",
            destination in "[A-Za-z ]{0,12}"
        ) {
            let directory = BusDirectory::sample();
            for mode in [MatchMode::Exact, MatchMode::CaseInsensitiveSubstring] {
                let found = directory.find(&origin, &destination, mode);
                prop_assert!(found.len() <= directory.len());
                for route in found {
                    prop_assert!(mode.matches(&route.origin, &origin));
                    prop_assert!(mode.matches(&route.destination, &destination));
                }
            }
        }

        #[test]
        fn exact_results_are_subset_of_substring_results(
            origin_index in 0usize..3,
            destination_index in 0usize..3
        ) {
            let directory = BusDirectory::sample();
            let locations = directory.locations();
            let origin = locations[origin_index];
            let destination = locations[destination_index];

            let exact = directory.find(origin, destination, MatchMode::Exact);
            let fuzzy = directory.find(origin, destination, MatchMode::CaseInsensitiveSubstring);
            for route in exact {
                prop_assert!(fuzzy.iter().any(|candidate| candidate.id == route.id));
            }
        }
    }
}
