//! Persistent (immutable) insertion-ordered map.
//!
//! This module provides [`OrderedIndexMap`], which keeps its entries in the
//! order they were first inserted while answering key lookups in O(1).
//!
//! # Overview
//!
//! The map is made of two immutable parts, each behind a reference counter:
//!
//! - `pairs`: the entries, in order, with no repeated key
//! - `index`: a `HashMap` from every key to its position in `pairs`
//!
//! Lookups go through the index; positional reads, iteration, and folds go
//! through the pairs. Every operation that adds, removes, or reorders
//! entries copies the pairs and rebuilds the index. Operations that only
//! replace values reuse the receiver's index, which is still exact.
//!
//! # Examples
//!
//! ```rust
//! use persista::persistent::OrderedIndexMap;
//!
//! let scores = OrderedIndexMap::new()
//!     .update("carol", 7)
//!     .update("alice", 9)
//!     .update("bob", 4);
//!
//! let ranked = scores.sort(|left, right| right.cmp(left));
//! assert_eq!(ranked.keys().to_vec(), vec!["alice", "carol", "bob"]);
//!
//! let passing = scores.filter(|_, score| *score >= 5);
//! assert_eq!(passing.keys().to_vec(), vec!["carol", "alice"]);
//!
//! assert_eq!(scores.len(), 3); // Original unchanged
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

use super::{Pair, PersistentSequence, ReferenceCounter};
use crate::equality::Equatable;

#[cfg(feature = "serde")]
use crate::codec::{self, CodecError, FrameHeader, FrameKind};

// =============================================================================
// OrderedIndexMap Definition
// =============================================================================

/// A persistent (immutable) map that remembers insertion order.
///
/// Updating an existing key keeps its position; new keys go to the end.
/// All operations return a new map and leave the receiver unchanged.
///
/// # Time Complexity
///
/// | Operation                 | Complexity |
/// |---------------------------|------------|
/// | `get` / `contains_key`    | O(1)       |
/// | `head` / `len`            | O(1)       |
/// | `clone`                   | O(1)       |
/// | `update` / `remove`       | O(n)       |
/// | `join`                    | O(n + m)   |
/// | `filter` / `map`          | O(n)       |
/// | `sort` / `sort_by_key`    | O(n log n) |
/// | `contains` (by value)     | O(n)       |
///
/// # Examples
///
/// ```rust
/// use persista::persistent::OrderedIndexMap;
///
/// let map = OrderedIndexMap::new()
///     .update("x".to_string(), 1)
///     .update("y".to_string(), 2);
///
/// let pair = map.get("x").unwrap();
/// assert_eq!((pair.key.as_str(), pair.value), ("x", 1));
///
/// let without_x = map.remove("x");
/// assert!(!without_x.contains_key("x"));
/// assert!(map.contains_key("x"));
/// ```
pub struct OrderedIndexMap<K, V> {
    pairs: ReferenceCounter<Vec<Pair<K, V>>>,
    index: ReferenceCounter<HashMap<K, usize>>,
}

impl<K, V> OrderedIndexMap<K, V> {
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<String, i32> = OrderedIndexMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            pairs: ReferenceCounter::new(Vec::new()),
            index: ReferenceCounter::new(HashMap::new()),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the first entry.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&Pair<K, V>> {
        self.pairs.first()
    }

    /// Returns the first entry, in order, satisfying `predicate`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    /// let found = map.find(|_, value| value % 2 == 1 && *value > 1);
    /// assert_eq!(found.map(|pair| pair.key), Some("c"));
    /// ```
    #[must_use]
    pub fn find<P>(&self, mut predicate: P) -> Option<&Pair<K, V>>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.pairs
            .iter()
            .find(|pair| predicate(&pair.key, &pair.value))
    }

    /// Folds the entries from first to last.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let rendered = map.fold_left(String::new(), |accumulator, key, value| {
    ///     format!("{accumulator}{key}={value};")
    /// });
    /// assert_eq!(rendered, "a=1;b=2;");
    /// ```
    pub fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.pairs.iter().fold(init, |accumulator, pair| {
            function(accumulator, &pair.key, &pair.value)
        })
    }

    /// Folds the entries from last to first.
    ///
    /// Equivalent to [`fold_left`](Self::fold_left) on the reversed map.
    pub fn fold_right<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.pairs.iter().rev().fold(init, |accumulator, pair| {
            function(accumulator, &pair.key, &pair.value)
        })
    }

    /// Returns an iterator over the entries in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Pair<K, V>> {
        self.pairs.iter()
    }

    /// Borrows the entries, in order, as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Pair<K, V>] {
        &self.pairs
    }

    /// Returns `true` when both maps share the same storage.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map = OrderedIndexMap::new().update(1, "one");
    /// assert!(map.remove(&2).ptr_eq(&map));
    /// assert!(!map.remove(&1).ptr_eq(&map));
    /// ```
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.pairs, &other.pairs)
    }
}

impl<K: Hash + Eq, V> OrderedIndexMap<K, V> {
    /// Returns the entry stored under `key`.
    ///
    /// The key may be any borrowed form of the map's key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::{OrderedIndexMap, Pair};
    ///
    /// let map = OrderedIndexMap::new().update("k".to_string(), 10);
    /// assert_eq!(map.get("k"), Some(&Pair::new("k".to_string(), 10)));
    /// assert_eq!(map.get("missing"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&Pair<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let position = *self.index.get(key)?;
        self.pairs.get(position)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get_value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).map(|pair| &pair.value)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Applies `function` to every entry, keeping keys and order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
    /// let labelled = map.map(|key, value| format!("{key}{value}"));
    /// assert_eq!(labelled.values().to_vec(), vec!["b2", "a1"]);
    /// ```
    #[must_use]
    pub fn map<W, F>(&self, mut function: F) -> OrderedIndexMap<K, W>
    where
        K: Clone,
        F: FnMut(&K, &V) -> W,
    {
        let pairs: Vec<Pair<K, W>> = self
            .pairs
            .iter()
            .map(|pair| Pair::new(pair.key.clone(), function(&pair.key, &pair.value)))
            .collect();
        OrderedIndexMap {
            pairs: ReferenceCounter::new(pairs),
            index: ReferenceCounter::clone(&self.index),
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> OrderedIndexMap<K, V> {
    /// Builds a map from entries whose keys are known to be distinct.
    fn from_distinct_pairs(pairs: Vec<Pair<K, V>>) -> Self {
        let index = pairs
            .iter()
            .enumerate()
            .map(|(position, pair)| (pair.key.clone(), position))
            .collect();
        Self {
            pairs: ReferenceCounter::new(pairs),
            index: ReferenceCounter::new(index),
        }
    }

    /// Builds a map whose values are replaced but whose keys and order are
    /// those of `self`.
    fn with_values(&self, pairs: Vec<Pair<K, V>>) -> Self {
        debug_assert_eq!(pairs.len(), self.pairs.len());
        Self {
            pairs: ReferenceCounter::new(pairs),
            index: ReferenceCounter::clone(&self.index),
        }
    }

    /// Returns the value stored under `key`, or `default` when absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map = OrderedIndexMap::new().update("a", 1);
    /// assert_eq!(map.get_or_else("a", 0), 1);
    /// assert_eq!(map.get_or_else("b", 0), 0);
    /// ```
    #[must_use]
    pub fn get_or_else<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_value(key).cloned().unwrap_or(default)
    }

    /// Returns a map with `key` bound to `value`.
    ///
    /// An existing key keeps its position; a new key is appended.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map = OrderedIndexMap::new().update("a", 1).update("b", 2);
    /// let updated = map.update("a", 10).update("c", 3);
    ///
    /// assert_eq!(updated.keys().to_vec(), vec!["a", "b", "c"]);
    /// assert_eq!(updated.get_value("a"), Some(&10));
    /// assert_eq!(map.get_value("a"), Some(&1));
    /// ```
    #[must_use]
    pub fn update(&self, key: K, value: V) -> Self {
        let mut pairs = self.to_vec();
        if let Some(&position) = self.index.get(&key) {
            if let Some(pair) = pairs.get_mut(position) {
                pair.value = value;
            }
            return self.with_values(pairs);
        }

        pairs.push(Pair::new(key, value));
        Self::from_distinct_pairs(pairs)
    }

    /// Returns a map without `key`, keeping the order of the other entries.
    ///
    /// When `key` is absent, the result shares the receiver's storage.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<i32, char> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
    /// let removed = map.remove(&2);
    /// assert_eq!(removed.keys().to_vec(), vec![1, 3]);
    /// assert_eq!(removed.get_value(&3), Some(&'c'));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&position) = self.index.get(key) else {
            return self.clone();
        };

        let mut pairs = self.to_vec();
        pairs.remove(position);
        Self::from_distinct_pairs(pairs)
    }

    /// Returns the entries of `self` followed by the entries of `other`
    /// whose keys `self` does not have.
    ///
    /// On a key present in both maps, the receiver's value wins and keeps
    /// its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let left: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let right: OrderedIndexMap<&str, i32> = [("c", 3), ("a", 100)].into_iter().collect();
    ///
    /// let joined = left.join(&right);
    /// assert_eq!(joined.keys().to_vec(), vec!["a", "b", "c"]);
    /// assert_eq!(joined.get_value("a"), Some(&1));
    /// ```
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut pairs = Vec::with_capacity(self.len() + other.len());
        pairs.extend_from_slice(&self.pairs);
        pairs.extend(
            other
                .iter()
                .filter(|pair| !self.index.contains_key(&pair.key))
                .cloned(),
        );
        Self::from_distinct_pairs(pairs)
    }

    /// Returns a map with exactly `keys`, in the given order.
    ///
    /// Keys already present keep their values; new keys get `V::default()`.
    /// A key repeated in `keys` is kept once, at its first position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let reshaped = map.set_keys(["c", "a", "c"]);
    ///
    /// assert_eq!(reshaped.keys().to_vec(), vec!["c", "a"]);
    /// assert_eq!(reshaped.values().to_vec(), vec![0, 1]);
    /// ```
    #[must_use]
    pub fn set_keys<I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        V: Default,
    {
        let mut pairs = Vec::new();
        let mut index = HashMap::new();

        for key in keys {
            if index.contains_key(&key) {
                continue;
            }
            let value = self.get_value(&key).cloned().unwrap_or_default();
            index.insert(key.clone(), pairs.len());
            pairs.push(Pair::new(key, value));
        }

        Self {
            pairs: ReferenceCounter::new(pairs),
            index: ReferenceCounter::new(index),
        }
    }

    /// Replaces values by position.
    ///
    /// Values beyond the map's length are ignored; entries beyond the
    /// number of values get `V::default()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    /// assert_eq!(map.set_values([7]).values().to_vec(), vec![7, 0, 0]);
    /// ```
    #[must_use]
    pub fn set_values<I>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Default,
    {
        self.set_values_or(values, V::default())
    }

    /// Replaces values by position, padding with `default`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    /// assert_eq!(map.set_values_or([7], -1).values().to_vec(), vec![7, -1, -1]);
    /// ```
    #[must_use]
    pub fn set_values_or<I>(&self, values: I, default: V) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut values = values.into_iter();
        let pairs = self
            .pairs
            .iter()
            .map(|pair| {
                let value = values.next().unwrap_or_else(|| default.clone());
                Pair::new(pair.key.clone(), value)
            })
            .collect();
        self.with_values(pairs)
    }

    /// Returns all entries but the first. An empty map stays empty.
    #[must_use]
    pub fn tail(&self) -> Self {
        self.pairs.split_first().map_or_else(Self::new, |(_, rest)| {
            Self::from_distinct_pairs(rest.to_vec())
        })
    }

    /// Keeps the entries satisfying `predicate`, in order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        Self::from_distinct_pairs(
            self.pairs
                .iter()
                .filter(|pair| predicate(&pair.key, &pair.value))
                .cloned()
                .collect(),
        )
    }

    /// Returns the entries stably sorted by value.
    #[must_use]
    pub fn sort<F>(&self, mut compare: F) -> Self
    where
        F: FnMut(&V, &V) -> Ordering,
    {
        let mut pairs = self.to_vec();
        pairs.sort_by(|left, right| compare(&left.value, &right.value));
        Self::from_distinct_pairs(pairs)
    }

    /// Returns the entries stably sorted by key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map: OrderedIndexMap<i32, char> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
    /// let sorted = map.sort_by_key(|left, right| left.cmp(right));
    /// assert_eq!(sorted.values().to_vec(), vec!['a', 'b', 'c']);
    /// ```
    #[must_use]
    pub fn sort_by_key<F>(&self, mut compare: F) -> Self
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let mut pairs = self.to_vec();
        pairs.sort_by(|left, right| compare(&left.key, &right.key));
        Self::from_distinct_pairs(pairs)
    }

    /// Returns the entries in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::from_distinct_pairs(self.pairs.iter().rev().cloned().collect())
    }

    /// Returns the keys in order.
    #[must_use]
    pub fn keys(&self) -> PersistentSequence<K> {
        self.pairs.iter().map(|pair| pair.key.clone()).collect()
    }

    /// Returns the values in order.
    #[must_use]
    pub fn values(&self) -> PersistentSequence<V> {
        self.pairs.iter().map(|pair| pair.value.clone()).collect()
    }

    /// Copies the entries into an unordered `HashMap`.
    #[must_use]
    pub fn to_map(&self) -> HashMap<K, V> {
        self.pairs
            .iter()
            .map(|pair| (pair.key.clone(), pair.value.clone()))
            .collect()
    }

    /// Copies the entries, in order, into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Pair<K, V>> {
        self.pairs.to_vec()
    }

    /// Copies the entries, in order, into a [`PersistentSequence`].
    #[must_use]
    pub fn to_sequence(&self) -> PersistentSequence<Pair<K, V>> {
        self.pairs.iter().cloned().collect()
    }
}

impl<K, V: Equatable> OrderedIndexMap<K, V> {
    /// Returns `true` if some entry holds a value equal to `value`.
    ///
    /// Values are compared with [`Equatable`], so they need not implement
    /// `PartialEq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::OrderedIndexMap;
    ///
    /// let map = OrderedIndexMap::new().update("a", vec![1.5, 2.5]);
    /// assert!(map.contains(&vec![1.5, 2.5]));
    /// assert!(!map.contains(&vec![1.5]));
    /// ```
    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.pairs.iter().any(|pair| pair.value.equals(value))
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> OrderedIndexMap<K, V> {
    /// Encodes the map into a binary frame holding its entries in order.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when a key or value fails to
    /// serialize.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode_framed(FrameHeader::of::<(K, V)>(FrameKind::OrderedIndexMap), self)
    }
}

#[cfg(feature = "serde")]
impl<K, V> OrderedIndexMap<K, V>
where
    K: serde::de::DeserializeOwned + Clone + Hash + Eq,
    V: serde::de::DeserializeOwned,
{
    /// Decodes a map from a frame produced by [`encode`](Self::encode).
    ///
    /// The entry order is restored exactly and the index is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the frame is malformed, was written by
    /// another container kind or element type, or lists a key twice.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode_framed(FrameHeader::of::<(K, V)>(FrameKind::OrderedIndexMap), bytes)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An owning iterator over the entries of an [`OrderedIndexMap`].
pub struct OrderedIndexMapIntoIterator<K, V> {
    pairs: std::vec::IntoIter<Pair<K, V>>,
}

impl<K, V> Iterator for OrderedIndexMapIntoIterator<K, V> {
    type Item = Pair<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.pairs.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pairs.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for OrderedIndexMapIntoIterator<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.pairs.next_back()
    }
}

impl<K, V> ExactSizeIterator for OrderedIndexMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Clone for OrderedIndexMap<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            pairs: ReferenceCounter::clone(&self.pairs),
            index: ReferenceCounter::clone(&self.index),
        }
    }
}

impl<K, V> Default for OrderedIndexMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V> FromIterator<Pair<K, V>> for OrderedIndexMap<K, V> {
    /// Collects entries in iteration order. A repeated key replaces the
    /// earlier value and keeps the earlier position.
    fn from_iter<I: IntoIterator<Item = Pair<K, V>>>(iter: I) -> Self {
        let mut pairs: Vec<Pair<K, V>> = Vec::new();
        let mut index: HashMap<K, usize> = HashMap::new();

        for pair in iter {
            if let Some(&position) = index.get(&pair.key) {
                pairs[position].value = pair.value;
            } else {
                index.insert(pair.key.clone(), pairs.len());
                pairs.push(pair);
            }
        }

        Self {
            pairs: ReferenceCounter::new(pairs),
            index: ReferenceCounter::new(index),
        }
    }
}

impl<K: Clone + Hash + Eq, V> FromIterator<(K, V)> for OrderedIndexMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().map(Pair::from).collect()
    }
}

impl<K: Clone + Hash + Eq, V, S> From<HashMap<K, V, S>> for OrderedIndexMap<K, V> {
    /// Takes the entries in the `HashMap`'s iteration order, which is
    /// unspecified.
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Clone, V: Clone> IntoIterator for OrderedIndexMap<K, V> {
    type Item = Pair<K, V>;
    type IntoIter = OrderedIndexMapIntoIterator<K, V>;

    /// Moves the pairs out when this is the last snapshot holding them,
    /// and clones them otherwise.
    fn into_iter(self) -> Self::IntoIter {
        OrderedIndexMapIntoIterator {
            pairs: ReferenceCounter::unwrap_or_clone(self.pairs).into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedIndexMap<K, V> {
    type Item = &'a Pair<K, V>;
    type IntoIter = std::slice::Iter<'a, Pair<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedIndexMap<K, V> {
    /// Two maps are equal when they hold equal entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.pairs == other.pairs
    }
}

impl<K: Eq, V: Eq> Eq for OrderedIndexMap<K, V> {}

impl<K: Equatable, V: Equatable> Equatable for OrderedIndexMap<K, V> {
    fn equals(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.as_slice().equals(other.as_slice())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedIndexMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(self.iter().map(|pair| (&pair.key, &pair.value)))
            .finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for OrderedIndexMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for pair in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{pair}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for OrderedIndexMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for pair in self {
            seq.serialize_element(pair)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedIndexMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<K, V> OrderedIndexMapVisitor<K, V> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for OrderedIndexMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de>,
{
    type Value = OrderedIndexMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of key/value pairs with distinct keys")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        use serde::de::Error;

        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut pairs: Vec<Pair<K, V>> = Vec::with_capacity(capacity);
        let mut index: HashMap<K, usize> = HashMap::with_capacity(capacity);

        while let Some(pair) = seq.next_element::<Pair<K, V>>()? {
            if index.contains_key(&pair.key) {
                return Err(A::Error::custom(format_args!(
                    "duplicate key at position {}",
                    pairs.len()
                )));
            }
            index.insert(pair.key.clone(), pairs.len());
            pairs.push(pair);
        }

        Ok(OrderedIndexMap {
            pairs: ReferenceCounter::new(pairs),
            index: ReferenceCounter::new(index),
        })
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedIndexMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Hash + Eq,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedIndexMapVisitor::new())
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(OrderedIndexMap<String, i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn letters() -> OrderedIndexMap<&'static str, i32> {
        [("a", 1), ("b", 2), ("c", 3)].into_iter().collect()
    }

    /// Checks that the index points at every pair's position and nothing else.
    fn assert_index_consistent<K, V>(map: &OrderedIndexMap<K, V>)
    where
        K: Hash + Eq + fmt::Debug,
    {
        assert_eq!(map.index.len(), map.pairs.len());
        for (position, pair) in map.pairs.iter().enumerate() {
            assert_eq!(map.index.get(&pair.key), Some(&position), "{:?}", pair.key);
        }
    }

    #[rstest]
    fn test_new_is_empty() {
        let map: OrderedIndexMap<String, i32> = OrderedIndexMap::new();
        assert!(map.is_empty());
        assert_eq!(map.head(), None);
        assert_index_consistent(&map);
    }

    #[rstest]
    fn test_update_appends_new_key(letters: OrderedIndexMap<&'static str, i32>) {
        let updated = letters.update("d", 4);
        assert_eq!(updated.keys().to_vec(), vec!["a", "b", "c", "d"]);
        assert_eq!(letters.len(), 3);
        assert_index_consistent(&updated);
    }

    #[rstest]
    fn test_update_existing_key_keeps_position(letters: OrderedIndexMap<&'static str, i32>) {
        let updated = letters.update("b", 20);
        assert_eq!(updated.values().to_vec(), vec![1, 20, 3]);
        assert_eq!(letters.get_value("b"), Some(&2));
        assert_index_consistent(&updated);
    }

    #[rstest]
    fn test_remove_preserves_order(letters: OrderedIndexMap<&'static str, i32>) {
        let removed = letters.remove("a");
        assert_eq!(removed.keys().to_vec(), vec!["b", "c"]);
        assert_eq!(removed.get("b"), Some(&Pair::new("b", 2)));
        assert_index_consistent(&removed);
    }

    #[rstest]
    fn test_remove_absent_shares_storage(letters: OrderedIndexMap<&'static str, i32>) {
        assert!(letters.remove("z").ptr_eq(&letters));
    }

    #[rstest]
    fn test_join_keeps_receiver_on_collision(letters: OrderedIndexMap<&'static str, i32>) {
        let other: OrderedIndexMap<&str, i32> = [("d", 4), ("b", 200)].into_iter().collect();
        let joined = letters.join(&other);
        assert_eq!(joined.keys().to_vec(), vec!["a", "b", "c", "d"]);
        assert_eq!(joined.get_value("b"), Some(&2));
        assert_index_consistent(&joined);
    }

    #[rstest]
    fn test_structural_changes_rebuild_index(letters: OrderedIndexMap<&'static str, i32>) {
        let appended = letters.update("d", 4);
        let joined = letters.join(&appended);
        let revalued = letters.update("a", 10);

        assert!(!ReferenceCounter::ptr_eq(&appended.index, &letters.index));
        assert!(!ReferenceCounter::ptr_eq(&joined.index, &letters.index));
        assert!(ReferenceCounter::ptr_eq(&revalued.index, &letters.index));
        assert_index_consistent(&joined);
        assert_eq!(letters.index.len(), 3);
    }

    /// Panics on clone, so iterating it proves the values were moved.
    #[derive(Debug, PartialEq)]
    struct MoveOnly(u32);

    impl Clone for MoveOnly {
        fn clone(&self) -> Self {
            panic!("value {} was cloned", self.0)
        }
    }

    #[rstest]
    fn test_into_iter_moves_out_of_last_snapshot() {
        let map: OrderedIndexMap<u32, MoveOnly> =
            (1..=3).map(|key| (key, MoveOnly(key * 10))).collect();

        let entries: Vec<(u32, MoveOnly)> = map
            .into_iter()
            .map(|pair| (pair.key, pair.value))
            .collect();
        assert_eq!(
            entries,
            vec![(1, MoveOnly(10)), (2, MoveOnly(20)), (3, MoveOnly(30))]
        );
    }

    #[rstest]
    fn test_into_iter_clones_shared_snapshot(letters: OrderedIndexMap<&'static str, i32>) {
        let snapshot = letters.clone();
        let keys: Vec<&str> = letters.into_iter().rev().map(|pair| pair.key).collect();

        assert_eq!(keys, vec!["c", "b", "a"]);
        assert_eq!(snapshot.len(), 3);
        assert_index_consistent(&snapshot);
    }

    #[rstest]
    fn test_set_keys_defaults_new_keys(letters: OrderedIndexMap<&'static str, i32>) {
        let reshaped = letters.set_keys(["c", "x", "c", "a"]);
        assert_eq!(reshaped.keys().to_vec(), vec!["c", "x", "a"]);
        assert_eq!(reshaped.values().to_vec(), vec![3, 0, 1]);
        assert_index_consistent(&reshaped);
    }

    #[rstest]
    #[case(vec![], vec![0, 0, 0])]
    #[case(vec![9], vec![9, 0, 0])]
    #[case(vec![7, 8, 9, 10], vec![7, 8, 9])]
    fn test_set_values(
        letters: OrderedIndexMap<&'static str, i32>,
        #[case] values: Vec<i32>,
        #[case] expected: Vec<i32>,
    ) {
        let replaced = letters.set_values(values);
        assert_eq!(replaced.values().to_vec(), expected);
        assert_eq!(replaced.keys(), letters.keys());
    }

    #[rstest]
    fn test_tail(letters: OrderedIndexMap<&'static str, i32>) {
        let tail = letters.tail();
        assert_eq!(tail.keys().to_vec(), vec!["b", "c"]);
        assert_index_consistent(&tail);
        assert!(OrderedIndexMap::<i32, i32>::new().tail().is_empty());
    }

    #[rstest]
    fn test_filter_and_find(letters: OrderedIndexMap<&'static str, i32>) {
        let odd = letters.filter(|_, value| value % 2 == 1);
        assert_eq!(odd.keys().to_vec(), vec!["a", "c"]);
        assert_index_consistent(&odd);
        assert_eq!(letters.find(|key, _| *key > "a"), Some(&Pair::new("b", 2)));
        assert_eq!(letters.find(|_, value| *value > 10), None);
    }

    #[rstest]
    fn test_map_reuses_keys(letters: OrderedIndexMap<&'static str, i32>) {
        let doubled = letters.map(|_, value| f64::from(*value) * 0.5);
        assert_eq!(doubled.get_value("c"), Some(&1.5));
        assert_index_consistent(&doubled);
    }

    #[rstest]
    fn test_folds_visit_in_order(letters: OrderedIndexMap<&'static str, i32>) {
        let concat = |accumulator: String, key: &&str, _: &i32| accumulator + *key;
        assert_eq!(letters.fold_left(String::new(), concat), "abc");
        assert_eq!(letters.fold_right(String::new(), concat), "cba");
    }

    #[rstest]
    fn test_sort_is_stable() {
        let map: OrderedIndexMap<&str, i32> =
            [("w", 2), ("x", 1), ("y", 2), ("z", 1)].into_iter().collect();
        let sorted = map.sort(Ord::cmp);
        assert_eq!(sorted.keys().to_vec(), vec!["x", "z", "w", "y"]);
        assert_index_consistent(&sorted);
    }

    #[rstest]
    fn test_reversed(letters: OrderedIndexMap<&'static str, i32>) {
        let reversed = letters.reversed();
        assert_eq!(reversed.keys().to_vec(), vec!["c", "b", "a"]);
        assert_index_consistent(&reversed);
    }

    #[rstest]
    fn test_contains_by_value(letters: OrderedIndexMap<&'static str, i32>) {
        assert!(letters.contains(&2));
        assert!(!letters.contains(&5));
    }

    #[rstest]
    fn test_from_iter_replaces_repeated_key_in_place() {
        let map: OrderedIndexMap<&str, i32> = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(map.keys().to_vec(), vec!["a", "b"]);
        assert_eq!(map.values().to_vec(), vec![3, 2]);
        assert_index_consistent(&map);
    }

    #[rstest]
    fn test_from_hash_map_keeps_every_entry() {
        let source: HashMap<i32, i32> = (0..10).map(|key| (key, key * key)).collect();
        let map = OrderedIndexMap::from(source.clone());
        assert_eq!(map.to_map(), source);
        assert_index_consistent(&map);
    }

    #[rstest]
    fn test_owned_iteration_yields_pairs(letters: OrderedIndexMap<&'static str, i32>) {
        let tuples: Vec<(&str, i32)> = letters.into_iter().map(Pair::into_tuple).collect();
        assert_eq!(tuples, vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[rstest]
    fn test_equality_is_order_sensitive(letters: OrderedIndexMap<&'static str, i32>) {
        assert_eq!(letters, letters.reversed().reversed());
        assert_ne!(letters, letters.reversed());
        assert!(letters.equals(&letters.update("a", 1)));
    }

    #[rstest]
    fn test_display_and_debug(letters: OrderedIndexMap<&'static str, i32>) {
        assert_eq!(letters.to_string(), "{a: 1, b: 2, c: 3}");
        assert_eq!(format!("{letters:?}"), r#"{"a": 1, "b": 2, "c": 3}"#);
    }
}
