//! ARM resource-id parsing
//!
//! ARM resource ids are path-style strings of alternating type/name
//! segments, e.g.
//! `/subscriptions/S/resourceGroups/RG/providers/Microsoft.ApiManagement/service/NAME`.

use std::collections::HashMap;

/// Split an ARM resource id into a type-segment → name-segment map.
///
/// Walks the slash-separated segments two at a time, starting after the
/// leading empty segment. There is no structural validation: callers must
/// supply well-formed ids. An odd trailing segment maps its key to an empty
/// string, and a path that does not alternate type/name silently yields a
/// wrong mapping; on a duplicate type segment the later pair wins.
pub fn parse_resource_id(id: &str) -> HashMap<String, String> {
    let parts: Vec<&str> = id.split('/').collect();
    let mut result = HashMap::new();

    let mut i = 1;
    while i < parts.len() {
        let key = parts[i];
        let value = parts.get(i + 1).copied().unwrap_or("");
        result.insert(key.to_string(), value.to_string());
        i += 2;
    }

    result
}
