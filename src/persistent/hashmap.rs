//! Persistent (immutable) unordered map.
//!
//! This module provides [`PersistentMap`], a copy-on-write wrapper around
//! `std::collections::HashMap`.
//!
//! # Overview
//!
//! The entries live in a single `HashMap` that is never modified once
//! built. Reads go straight to it; `update`, `remove`, `join` and the other
//! transformations clone it, change the clone, and wrap the result.
//!
//! - O(1) get, `contains_key`, len, clone
//! - O(n) update, remove, join, filter, map
//!
//! Iteration order is the `HashMap`'s, which is unspecified. Use
//! [`OrderedIndexMap`] when the order of entries matters.
//!
//! # Examples
//!
//! ```rust
//! use persista::persistent::PersistentMap;
//!
//! let map = PersistentMap::new()
//!     .update("one".to_string(), 1)
//!     .update("two".to_string(), 2)
//!     .update("three".to_string(), 3);
//!
//! assert_eq!(map.get_value("one"), Some(&1));
//!
//! let updated = map.update("one".to_string(), 100);
//! assert_eq!(map.get_value("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get_value("one"), Some(&100)); // New version
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;

use super::{OrderedIndexMap, Pair, PersistentSequence, ReferenceCounter};
use crate::equality::Equatable;

#[cfg(feature = "serde")]
use crate::codec::{self, CodecError, FrameHeader, FrameKind};

// =============================================================================
// PersistentMap Definition
// =============================================================================

/// A persistent (immutable) unordered map.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `get`          | O(1)       |
/// | `contains_key` | O(1)       |
/// | `update`       | O(n)       |
/// | `remove`       | O(n)       |
/// | `join`         | O(n + m)   |
/// | `len`          | O(1)       |
///
/// # Examples
///
/// ```rust
/// use persista::persistent::PersistentMap;
///
/// let map = PersistentMap::singleton("key".to_string(), 42);
/// let pair = map.get("key").unwrap();
/// assert_eq!(*pair.value, 42);
/// ```
pub struct PersistentMap<K, V> {
    entries: ReferenceCounter<HashMap<K, V>>,
}

impl<K, V> PersistentMap<K, V> {
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentMap;
    ///
    /// let map: PersistentMap<String, i32> = PersistentMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_entries(HashMap::new())
    }

    #[inline]
    fn from_entries(entries: HashMap<K, V>) -> Self {
        Self {
            entries: ReferenceCounter::new(entries),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns some entry satisfying `predicate`.
    ///
    /// When several entries match, which one is returned is unspecified.
    #[must_use]
    pub fn find<P>(&self, mut predicate: P) -> Option<Pair<&K, &V>>
    where
        P: FnMut(&K, &V) -> bool,
    {
        self.entries
            .iter()
            .find(|(key, value)| predicate(key, value))
            .map(Pair::from)
    }

    /// Folds the entries in iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentMap;
    ///
    /// let map: PersistentMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// let sum = map.fold_left(0, |accumulator, _, value| accumulator + value);
    /// assert_eq!(sum, 3);
    /// ```
    pub fn fold_left<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.entries
            .iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Returns an iterator over the entries in unspecified order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Returns `true` when both maps share the same storage.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.entries, &other.entries)
    }
}

impl<K: Hash + Eq, V> PersistentMap<K, V> {
    /// Returns the entry stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::{Pair, PersistentMap};
    ///
    /// let map = PersistentMap::singleton(1, "one");
    /// assert_eq!(map.get(&1), Some(Pair::new(&1, &"one")));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<Pair<&K, &V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_key_value(key).map(Pair::from)
    }

    /// Returns the value stored under `key`.
    #[inline]
    #[must_use]
    pub fn get_value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentMap<K, V> {
    /// Creates a map holding a single entry.
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::from_entries(HashMap::from([(key, value)]))
    }

    /// Returns the value stored under `key`, or `default` when absent.
    #[must_use]
    pub fn get_or_else<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_value(key).cloned().unwrap_or(default)
    }

    /// Returns a map with `key` bound to `value`.
    #[must_use]
    pub fn update(&self, key: K, value: V) -> Self {
        let mut entries = HashMap::clone(&self.entries);
        entries.insert(key, value);
        Self::from_entries(entries)
    }

    /// Returns a map without `key`.
    ///
    /// When `key` is absent, the result shares the receiver's storage.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentMap;
    ///
    /// let map = PersistentMap::singleton("a", 1);
    /// assert!(map.remove("b").ptr_eq(&map));
    /// assert!(map.remove("a").is_empty());
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return self.clone();
        }
        let mut entries = HashMap::clone(&self.entries);
        entries.remove(key);
        Self::from_entries(entries)
    }

    /// Returns the entries of both maps. On a key present in both, the
    /// receiver's value wins.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut entries = HashMap::clone(&self.entries);
        for (key, value) in other {
            entries
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Self::from_entries(entries)
    }

    /// Keeps the entries satisfying `predicate`.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        Self::from_entries(
            self.entries
                .iter()
                .filter(|(key, value)| predicate(key, value))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Applies `function` to every entry, keeping the keys.
    #[must_use]
    pub fn map<W, F>(&self, mut function: F) -> PersistentMap<K, W>
    where
        F: FnMut(&K, &V) -> W,
    {
        PersistentMap::from_entries(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), function(key, value)))
                .collect(),
        )
    }

    /// Returns the keys in unspecified order.
    #[must_use]
    pub fn keys(&self) -> PersistentSequence<K> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the values in unspecified order.
    #[must_use]
    pub fn values(&self) -> PersistentSequence<V> {
        self.entries.values().cloned().collect()
    }

    /// Copies the entries into a plain `HashMap`.
    #[must_use]
    pub fn to_map(&self) -> HashMap<K, V> {
        HashMap::clone(&self.entries)
    }

    /// Copies the entries into a `Vec`, in unspecified order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Pair<K, V>> {
        self.entries
            .iter()
            .map(|(key, value)| Pair::new(key.clone(), value.clone()))
            .collect()
    }

    /// Converts into an [`OrderedIndexMap`] whose order is this map's
    /// iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentMap;
    ///
    /// let map: PersistentMap<i32, i32> = (0..5).map(|key| (key, key * 10)).collect();
    /// let ordered = map.to_ordered().sort_by_key(|left, right| left.cmp(right));
    /// assert_eq!(ordered.values().to_vec(), vec![0, 10, 20, 30, 40]);
    /// ```
    #[must_use]
    pub fn to_ordered(&self) -> OrderedIndexMap<K, V> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K, V: Equatable> PersistentMap<K, V> {
    /// Returns `true` if some entry holds a value equal to `value`, as
    /// decided by [`Equatable`].
    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.entries.values().any(|candidate| candidate.equals(value))
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> PersistentMap<K, V> {
    /// Encodes the map into a binary frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when a key or value fails to
    /// serialize.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode_framed(FrameHeader::of::<(K, V)>(FrameKind::PersistentMap), self)
    }
}

#[cfg(feature = "serde")]
impl<K, V> PersistentMap<K, V>
where
    K: serde::de::DeserializeOwned + Hash + Eq,
    V: serde::de::DeserializeOwned,
{
    /// Decodes a map from a frame produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the frame is malformed or was written
    /// by another container kind or element type.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode_framed(FrameHeader::of::<(K, V)>(FrameKind::PersistentMap), bytes)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An owning iterator over the entries of a [`PersistentMap`].
pub struct PersistentMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentMapIntoIterator<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Clone for PersistentMap<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            entries: ReferenceCounter::clone(&self.entries),
        }
    }
}

impl<K, V> Default for PersistentMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for PersistentMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

impl<K, V> From<HashMap<K, V>> for PersistentMap<K, V> {
    #[inline]
    fn from(entries: HashMap<K, V>) -> Self {
        Self::from_entries(entries)
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentMapIntoIterator<K, V>;

    /// Moves the entries out when this is the last snapshot holding them,
    /// and clones them otherwise.
    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = match ReferenceCounter::try_unwrap(self.entries) {
            Ok(owned) => owned.into_iter().collect(),
            Err(shared) => shared
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };
        PersistentMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for PersistentMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.entries == other.entries
    }
}

impl<K: Hash + Eq, V: Eq> Eq for PersistentMap<K, V> {}

impl<K: Hash + Eq, V: Equatable> Equatable for PersistentMap<K, V> {
    fn equals(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.entries.equals(&other.entries)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for PersistentMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<K, V> PersistentMapVisitor<K, V> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Hash + Eq,
    V: serde::Deserialize<'de>,
{
    type Value = PersistentMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = access.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut entries = HashMap::with_capacity(capacity);
        while let Some((key, value)) = access.next_entry()? {
            entries.insert(key, value);
        }
        Ok(PersistentMap::from_entries(entries))
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentMap<K, V>
where
    K: serde::Deserialize<'de> + Hash + Eq,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentMapVisitor::new())
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentMap<String, i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
