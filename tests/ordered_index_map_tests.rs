//! Scenario tests for `OrderedIndexMap`.
//!
//! Each test builds a small map, applies a chain of operations, and checks
//! the resulting entry order and contents.

use persista::persistent::{OrderedIndexMap, Pair};
use rstest::{fixture, rstest};
use std::collections::HashMap;

// =============================================================================
// Fixtures
// =============================================================================

/// Keys `k1..k5` bound to `v1..v5`, in that order.
#[fixture]
fn five() -> OrderedIndexMap<String, String> {
    (1..=5)
        .map(|number| (format!("k{number}"), format!("v{number}")))
        .collect()
}

fn keys_of<V: Clone>(map: &OrderedIndexMap<String, V>) -> Vec<String> {
    map.keys().to_vec()
}

// =============================================================================
// Remove / Tail
// =============================================================================

#[rstest]
fn test_removing_first_key_matches_tail(five: OrderedIndexMap<String, String>) {
    let removed = five.remove("k1");

    assert_eq!(removed.len(), 4);
    assert_eq!(keys_of(&removed), keys_of(&five.tail()));
    assert_eq!(removed, five.tail());
}

#[rstest]
fn test_remove_middle_key_keeps_lookups_working(five: OrderedIndexMap<String, String>) {
    let removed = five.remove("k3");

    assert_eq!(keys_of(&removed), vec!["k1", "k2", "k4", "k5"]);
    for pair in &removed {
        assert_eq!(removed.get(&pair.key), Some(pair));
    }
    assert_eq!(removed.get("k3"), None);
}

#[rstest]
fn test_remove_absent_key_is_same_snapshot(five: OrderedIndexMap<String, String>) {
    let removed = five.remove("k9");

    assert!(removed.ptr_eq(&five));
    assert_eq!(removed, five);
}

#[rstest]
fn test_tail_walk_visits_every_pair(five: OrderedIndexMap<String, String>) {
    let mut current = five.clone();
    let mut visited = Vec::new();
    while let Some(head) = current.head() {
        visited.push(head.value.clone());
        current = current.tail();
    }

    assert_eq!(visited, five.values().to_vec());
}

// =============================================================================
// Join
// =============================================================================

#[rstest]
fn test_join_with_identical_subset_changes_nothing(five: OrderedIndexMap<String, String>) {
    let subset = five.filter(|key, _| ["k2", "k4", "k5"].contains(&key.as_str()));
    assert_eq!(subset.len(), 3);

    let joined = five.join(&subset);

    assert_eq!(joined.to_map(), five.to_map());
    assert_eq!(joined, five);
}

#[rstest]
fn test_join_receiver_wins_and_new_keys_follow_in_order(five: OrderedIndexMap<String, String>) {
    let other: OrderedIndexMap<String, String> = [
        ("k7", "seven"),
        ("k2", "replaced"),
        ("k6", "six"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();

    let joined = five.join(&other);

    assert_eq!(
        keys_of(&joined),
        vec!["k1", "k2", "k3", "k4", "k5", "k7", "k6"]
    );
    assert_eq!(joined.get_value("k2").map(String::as_str), Some("v2"));
    assert_eq!(joined.get_value("k6").map(String::as_str), Some("six"));
}

#[rstest]
fn test_join_with_empty_is_identity(five: OrderedIndexMap<String, String>) {
    assert_eq!(five.join(&OrderedIndexMap::new()), five);
    assert_eq!(OrderedIndexMap::new().join(&five), five);
}

// =============================================================================
// SetKeys / SetValues
// =============================================================================

#[rstest]
fn test_set_values_pads_with_default(five: OrderedIndexMap<String, String>) {
    let replaced = five.set_values(["a".to_string(), "b".to_string()]);

    assert_eq!(replaced.values().to_vec(), vec!["a", "b", "", "", ""]);
    assert_eq!(keys_of(&replaced), keys_of(&five));
}

#[rstest]
fn test_set_values_or_pads_with_given_value(five: OrderedIndexMap<String, String>) {
    let replaced = five.set_values_or(["a".to_string()], "?".to_string());

    assert_eq!(replaced.values().to_vec(), vec!["a", "?", "?", "?", "?"]);
}

#[rstest]
fn test_set_values_ignores_surplus() {
    let map: OrderedIndexMap<char, i32> = [('x', 0), ('y', 0)].into_iter().collect();

    assert_eq!(map.set_values(1..=10).values().to_vec(), vec![1, 2]);
}

#[rstest]
fn test_set_keys_keeps_values_of_surviving_keys(five: OrderedIndexMap<String, String>) {
    let reshaped = five.set_keys(["k5", "new", "k1", "k5"].map(String::from));

    assert_eq!(keys_of(&reshaped), vec!["k5", "new", "k1"]);
    assert_eq!(reshaped.values().to_vec(), vec!["v5", "", "v1"]);
    assert_eq!(reshaped.get_value("new").map(String::as_str), Some(""));
}

#[rstest]
fn test_set_keys_to_nothing_empties_the_map(five: OrderedIndexMap<String, String>) {
    assert!(five.set_keys(Vec::new()).is_empty());
}

// =============================================================================
// Lookups
// =============================================================================

#[rstest]
#[case("k1", Some("v1"))]
#[case("k5", Some("v5"))]
#[case("k0", None)]
fn test_get_value(
    five: OrderedIndexMap<String, String>,
    #[case] key: &str,
    #[case] expected: Option<&str>,
) {
    assert_eq!(five.get_value(key).map(String::as_str), expected);
    assert_eq!(five.contains_key(key), expected.is_some());
}

#[rstest]
fn test_get_returns_the_stored_pair(five: OrderedIndexMap<String, String>) {
    let pair = five.get("k2").expect("k2 is present");

    assert_eq!(
        pair.as_ref().cloned(),
        Pair::new("k2".to_string(), "v2".to_string())
    );
}

#[rstest]
fn test_get_or_else(five: OrderedIndexMap<String, String>) {
    assert_eq!(five.get_or_else("k4", "none".to_string()), "v4");
    assert_eq!(five.get_or_else("k8", "none".to_string()), "none");
}

#[rstest]
fn test_find_returns_first_match_in_order(five: OrderedIndexMap<String, String>) {
    let found = five.find(|_, value| value.as_str() > "v2");

    assert_eq!(found.map(|pair| pair.key.as_str()), Some("k3"));
}

#[rstest]
fn test_contains_by_value(five: OrderedIndexMap<String, String>) {
    assert!(five.contains(&"v3".to_string()));
    assert!(!five.contains(&"k3".to_string()));
}

// =============================================================================
// Ordering
// =============================================================================

#[rstest]
fn test_sort_then_reverse() {
    let map: OrderedIndexMap<&str, u8> = [("c", 3), ("a", 1), ("b", 2)].into_iter().collect();

    let ascending = map.sort(Ord::cmp);
    let descending = ascending.reversed();

    assert_eq!(ascending.keys().to_vec(), vec!["a", "b", "c"]);
    assert_eq!(descending.keys().to_vec(), vec!["c", "b", "a"]);
    assert_eq!(map.keys().to_vec(), vec!["c", "a", "b"]);
}

#[rstest]
fn test_sort_by_key_descending(five: OrderedIndexMap<String, String>) {
    let sorted = five.sort_by_key(|left, right| right.cmp(left));

    assert_eq!(keys_of(&sorted), vec!["k5", "k4", "k3", "k2", "k1"]);
    assert_eq!(sorted.get_value("k5").map(String::as_str), Some("v5"));
}

// =============================================================================
// Conversions
// =============================================================================

#[rstest]
fn test_from_hash_map() {
    let source: HashMap<String, i32> = [("x".to_string(), 1), ("y".to_string(), 2)].into();
    let map = OrderedIndexMap::from(source.clone());

    assert_eq!(map.len(), 2);
    assert_eq!(map.to_map(), source);
}

#[rstest]
fn test_to_vec_and_to_sequence_agree(five: OrderedIndexMap<String, String>) {
    assert_eq!(five.to_vec(), five.to_sequence().to_vec());
    assert_eq!(five.as_slice(), five.to_vec().as_slice());
}

#[rstest]
fn test_collect_from_pairs(five: OrderedIndexMap<String, String>) {
    let rebuilt: OrderedIndexMap<String, String> = five.clone().into_iter().collect();

    assert_eq!(rebuilt, five);
    assert!(!rebuilt.ptr_eq(&five));
}

#[rstest]
fn test_map_then_fold(five: OrderedIndexMap<String, String>) {
    let lengths = five.map(|key, value| key.len() + value.len());
    let total = lengths.fold_left(0, |accumulator, _, length| accumulator + length);

    assert_eq!(total, 20);
}
