//! Integration tests for `PersistentSequence`.

#![cfg(feature = "derive")]

use persista::equality::Equatable;
use persista::persistent::PersistentSequence;
use persista::typeclass::Foldable;
use proptest::prelude::*;
use rstest::rstest;

// =============================================================================
// Basic Operations
// =============================================================================

#[rstest]
fn test_singleton() {
    let sequence = PersistentSequence::singleton("only");
    assert_eq!(sequence.len(), 1);
    assert_eq!(sequence.head(), sequence.last());
}

#[rstest]
#[case(0, Some(&10))]
#[case(2, Some(&30))]
#[case(3, None)]
fn test_get(#[case] index: usize, #[case] expected: Option<&i32>) {
    let sequence: PersistentSequence<i32> = vec![10, 20, 30].into();
    assert_eq!(sequence.get(index), expected);
}

#[rstest]
fn test_transformations_leave_original_untouched() {
    let original: PersistentSequence<i32> = (1..=6).collect();

    let _ = original.append([7]);
    let _ = original.filter(|value| value % 2 == 0);
    let _ = original.reversed();
    let _ = original.sort_by(|left, right| right.cmp(left));
    let _ = original.tail();

    assert_eq!(original.to_vec(), vec![1, 2, 3, 4, 5, 6]);
}

#[rstest]
fn test_find_variants() {
    let sequence: PersistentSequence<&str> = vec!["apple", "banana", "cherry"].into();

    assert_eq!(sequence.find(|word| word.starts_with('b')), Some(&"banana"));
    assert_eq!(sequence.find(|word| word.is_empty()), None);
    assert_eq!(
        sequence.find_with_index(|index, _| index == 2),
        Some((2, &"cherry"))
    );
}

#[rstest]
fn test_map_changes_element_type() {
    let sequence: PersistentSequence<i32> = vec![1, 2, 3].into();
    let rendered = sequence.map(ToString::to_string);
    assert_eq!(rendered.to_vec(), vec!["1", "2", "3"]);
}

#[rstest]
fn test_limit_and_join() {
    let first: PersistentSequence<i32> = (1..=5).collect();
    let second: PersistentSequence<i32> = (6..=7).collect();

    assert_eq!(first.limit(2).join(&second).to_vec(), vec![1, 2, 6, 7]);
}

// =============================================================================
// Equality-Based Operations
// =============================================================================

#[derive(Debug, Clone, Equatable)]
struct Sample {
    label: String,
    reading: f64,
}

fn sample(label: &str, reading: f64) -> Sample {
    Sample {
        label: label.to_string(),
        reading,
    }
}

#[rstest]
fn test_index_of_uses_deep_equality() {
    let samples: PersistentSequence<Sample> =
        vec![sample("a", 0.5), sample("b", 1.5), sample("a", 0.5)].into();

    assert_eq!(samples.index_of(&sample("b", 1.5)), Some(1));
    assert_eq!(samples.index_of(&sample("b", 2.5)), None);
    assert!(samples.contains(&sample("a", 0.5)));
}

#[rstest]
fn test_unique_uses_deep_equality() {
    let samples: PersistentSequence<Sample> =
        vec![sample("a", 0.5), sample("b", 1.5), sample("a", 0.5)].into();

    let unique = samples.unique();

    assert_eq!(unique.len(), 2);
    assert!(unique[0].equals(&sample("a", 0.5)));
    assert!(unique[1].equals(&sample("b", 1.5)));
}

// =============================================================================
// Foldable
// =============================================================================

#[rstest]
fn test_foldable_to_list() {
    let sequence: PersistentSequence<char> = "xyz".chars().collect();
    assert_eq!(sequence.to_list(), vec!['x', 'y', 'z']);
}

#[rstest]
fn test_foldable_length_matches_len() {
    let sequence: PersistentSequence<i32> = (0..17).collect();
    assert_eq!(Foldable::length(&sequence), sequence.len());
}

// =============================================================================
// Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_sorted_is_non_decreasing(values in prop::collection::vec(any::<i16>(), 0..60)) {
        let sorted = PersistentSequence::from(values).sorted();
        prop_assert!(sorted.as_slice().windows(2).all(|window| window[0] <= window[1]));
    }
}

proptest! {
    #[test]
    fn prop_unique_has_no_repeats(values in prop::collection::vec(0u8..10, 0..60)) {
        let unique = PersistentSequence::from(values.clone()).unique();

        for (index, value) in unique.iter().enumerate() {
            prop_assert_eq!(unique.index_of(value), Some(index));
        }
        for value in &values {
            prop_assert!(unique.contains(value));
        }
    }
}

proptest! {
    #[test]
    fn prop_fold_left_matches_iterator_fold(values in prop::collection::vec(any::<i32>(), 0..60)) {
        let sequence = PersistentSequence::from(values.clone());
        let folded = sequence.fold_left(0_i64, |sum, value| sum + i64::from(value));

        prop_assert_eq!(folded, values.iter().map(|value| i64::from(*value)).sum::<i64>());
    }
}
