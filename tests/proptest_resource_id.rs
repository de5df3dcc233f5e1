//! Property-based tests for ARM resource-id parsing using proptest
//!
//! The parser must never fail, even on malformed ids; these tests pin the
//! degradation behavior as well as the happy path.

use apim_usage::azure::resource_id::parse_resource_id;
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    /// Parsing is total: arbitrary input never panics
    #[test]
    fn parser_never_panics(id in ".*") {
        let _ = parse_resource_id(&id);
    }

    /// Well-formed alternating type/name ids round-trip every pair
    #[test]
    fn alternating_pairs_round_trip(
        pairs in prop::collection::vec(("[a-z][a-z0-9]{0,9}", "[a-zA-Z0-9.-]{1,12}"), 1..8)
    ) {
        // Duplicate type segments would overwrite; keep first occurrences only
        let mut seen = HashSet::new();
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(key, _)| seen.insert(key.clone()))
            .collect();

        let id: String = pairs
            .iter()
            .map(|(key, value)| format!("/{}/{}", key, value))
            .collect();

        let parsed = parse_resource_id(&id);
        prop_assert_eq!(parsed.len(), pairs.len());
        for (key, value) in &pairs {
            prop_assert_eq!(parsed.get(key.as_str()), Some(value));
        }
    }

    /// An odd trailing segment becomes a key with an empty value
    #[test]
    fn odd_trailing_key_maps_to_empty(key in "[a-z]{1,10}") {
        let id = format!("/resourceGroups/rg/{}", key);
        let parsed = parse_resource_id(&id);
        prop_assert_eq!(parsed.get(key.as_str()), Some(&String::new()));
    }

    /// Entry count is bounded by the number of segment pairs
    #[test]
    fn entry_count_bounded_by_segments(id in "(/[a-zA-Z0-9]{0,6}){0,12}") {
        let segments = id.split('/').count();
        let parsed = parse_resource_id(&id);
        prop_assert!(parsed.len() <= segments / 2 + 1);
    }
}

/// The canonical APIM service id shape
#[test]
fn parses_canonical_service_id() {
    let parsed = parse_resource_id(
        "/subscriptions/S/resourceGroups/RG/providers/Microsoft.ApiManagement/service/NAME",
    );
    assert_eq!(parsed["subscriptions"], "S");
    assert_eq!(parsed["resourceGroups"], "RG");
    assert_eq!(parsed["providers"], "Microsoft.ApiManagement");
    assert_eq!(parsed["service"], "NAME");
}
