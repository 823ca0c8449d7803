//! Free-text entity lookup
//!
//! Resolves a user query to one entity and builds ranked autocomplete
//! suggestions. Matching is on the entity's `id` when the query is all digits,
//! otherwise on the trimmed, lowercased `name`: exact, then prefix, then
//! substring, each in original list order.

use crate::data::{record_id, str_field, Record};

/// Maximum number of autocomplete suggestions
pub const SUGGESTION_LIMIT: usize = 20;

/// Anything the resolver can match against
pub trait Entity {
    fn entity_id(&self) -> Option<i64>;
    fn entity_name(&self) -> &str;
}

impl Entity for Record {
    fn entity_id(&self) -> Option<i64> {
        record_id(self)
    }

    fn entity_name(&self) -> &str {
        str_field(self, "name").unwrap_or("")
    }
}

/// Trim and case-fold for comparisons
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// True if the trimmed text is a non-empty run of ASCII digits
pub fn is_unsigned_int(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve `query` to a single entity.
///
/// A numeric query matches ids only and never falls back to names.
pub fn resolve<'a, E: Entity>(query: &str, entities: &'a [E]) -> Option<&'a E> {
    if is_unsigned_int(query) {
        let id: i64 = query.trim().parse().ok()?;
        return entities.iter().find(|e| e.entity_id() == Some(id));
    }

    let q = normalize(query);
    let names: Vec<String> = entities.iter().map(|e| normalize(e.entity_name())).collect();

    names
        .iter()
        .position(|name| *name == q)
        .or_else(|| names.iter().position(|name| name.starts_with(&q)))
        .or_else(|| names.iter().position(|name| name.contains(&q)))
        .map(|idx| &entities[idx])
}

/// Ranked suggestions for `query`, at most `SUGGESTION_LIMIT`.
///
/// Prefix matches come first, then other substring matches, both in list
/// order. An empty query returns the head of the list unfiltered.
pub fn suggest<'a, E: Entity>(query: &str, entities: &'a [E]) -> Vec<&'a E> {
    let q = normalize(query);
    if q.is_empty() {
        return entities.iter().take(SUGGESTION_LIMIT).collect();
    }

    let names: Vec<String> = entities.iter().map(|e| normalize(e.entity_name())).collect();
    let prefixed = names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.starts_with(&q));
    let contained = names
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.starts_with(&q) && name.contains(&q));

    prefixed
        .chain(contained)
        .map(|(idx, _)| &entities[idx])
        .take(SUGGESTION_LIMIT)
        .collect()
}

/// Case-insensitive substring filter over plain names, capped and in order
pub fn suggest_names<'a>(query: &str, names: &'a [String]) -> Vec<&'a str> {
    let q = normalize(query);
    names
        .iter()
        .filter(|name| q.is_empty() || normalize(name).contains(&q))
        .map(String::as_str)
        .take(SUGGESTION_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entities() -> Vec<Record> {
        vec![
            json!({"id": 1, "name": "Gold"}),
            json!({"id": 2, "name": "Golden Ore"}),
        ]
    }

    #[test]
    fn test_exact_match_beats_prefix() {
        let list = entities();
        let found = resolve("gold", &list).unwrap();
        assert_eq!(found.entity_id(), Some(1));
    }

    #[test]
    fn test_numeric_query_matches_id_only() {
        let list = vec![
            json!({"id": 1, "name": "Agricium 2"}),
            json!({"id": 2, "name": "Gold"}),
        ];
        assert_eq!(resolve("2", &list).unwrap().entity_id(), Some(2));
        assert_eq!(resolve(" 2 ", &list).unwrap().entity_id(), Some(2));
        assert!(resolve("3", &list).is_none(), "no name fallback for digits");
    }

    #[test]
    fn test_substring_fallback_uses_list_order() {
        let list = vec![
            json!({"id": 5, "name": "Iron"}),
            json!({"id": 6, "name": "Cold Ore"}),
            json!({"id": 7, "name": "Bold Metal"}),
        ];
        assert_eq!(resolve("old", &list).unwrap().entity_id(), Some(6));
    }

    #[test]
    fn test_prefix_match_and_normalization() {
        let list = entities();
        assert_eq!(resolve("  GOLDEN ", &list).unwrap().entity_id(), Some(2));
    }

    #[test]
    fn test_no_match_returns_none() {
        let list = entities();
        assert!(resolve("titanium", &list).is_none());
        let empty: Vec<Record> = Vec::new();
        assert!(resolve("gold", &empty).is_none());
    }

    #[test]
    fn test_is_unsigned_int() {
        assert!(is_unsigned_int("42"));
        assert!(is_unsigned_int(" 007 "));
        assert!(!is_unsigned_int(""));
        assert!(!is_unsigned_int("-1"));
        assert!(!is_unsigned_int("4a"));
    }

    #[test]
    fn test_suggest_ranks_prefix_before_substring() {
        let list = vec![
            json!({"id": 1, "name": "Recycled Material Composite"}),
            json!({"id": 2, "name": "Medical Supplies"}),
            json!({"id": 3, "name": "Processed Food"}),
            json!({"id": 4, "name": "Medimax"}),
        ];
        let ids: Vec<i64> = suggest("med", &list)
            .iter()
            .filter_map(|e| e.entity_id())
            .collect();
        assert_eq!(ids, vec![2, 4]);

        let ids: Vec<i64> = suggest("d", &list)
            .iter()
            .filter_map(|e| e.entity_id())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_suggest_no_duplicates() {
        let list = vec![json!({"id": 1, "name": "Stims"}), json!({"id": 2, "name": "Distilled Spirits"})];
        let ids: Vec<i64> = suggest("s", &list)
            .iter()
            .filter_map(|e| e.entity_id())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_suggest_caps_results() {
        let list: Vec<Record> = (0..50)
            .map(|i| json!({"id": i, "name": format!("Ore {}", i)}))
            .collect();
        assert_eq!(suggest("", &list).len(), SUGGESTION_LIMIT);
        assert_eq!(suggest("ore", &list).len(), SUGGESTION_LIMIT);
        assert_eq!(suggest("", &list)[0].entity_id(), Some(0));
    }

    #[test]
    fn test_suggest_names_filters_case_insensitively() {
        let names = vec!["Hydrogen Fuel".to_string(), "Quantum Fuel".to_string()];
        assert_eq!(suggest_names("QUANT", &names), vec!["Quantum Fuel"]);
        assert_eq!(suggest_names("", &names).len(), 2);
    }
}
