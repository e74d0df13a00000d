//! Key/value pair, the stored unit of the associative containers.

use std::fmt;

use crate::equality::Equatable;

/// A key together with its value.
///
/// [`OrderedIndexMap`](super::OrderedIndexMap) stores its entries as a
/// sequence of `Pair`s, and lookups hand them back by reference. The fields
/// are public: a pair has no invariant of its own.
///
/// # Examples
///
/// ```rust
/// use persista::persistent::Pair;
///
/// let pair = Pair::new("answer", 42);
/// assert_eq!(pair.key, "answer");
/// assert_eq!(pair.value, 42);
///
/// let (key, value) = pair.into_tuple();
/// assert_eq!((key, value), ("answer", 42));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pair<K, V> {
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

impl<K, V> Pair<K, V> {
    /// Creates a pair.
    #[inline]
    #[must_use]
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Borrows both halves.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::Pair;
    ///
    /// let pair = Pair::new("k".to_string(), vec![1]);
    /// let borrowed = pair.as_ref();
    /// assert_eq!(borrowed.key, "k");
    /// assert_eq!(borrowed.value, &vec![1]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn as_ref(&self) -> Pair<&K, &V> {
        Pair {
            key: &self.key,
            value: &self.value,
        }
    }

    /// Splits the pair into a tuple.
    #[inline]
    pub fn into_tuple(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Replaces the value, keeping the key.
    #[inline]
    #[must_use]
    pub fn with_value<W>(self, value: W) -> Pair<K, W> {
        Pair {
            key: self.key,
            value,
        }
    }
}

impl<K: Clone, V: Clone> Pair<&K, &V> {
    /// Clones both halves out of a borrowed pair.
    #[inline]
    #[must_use]
    pub fn cloned(self) -> Pair<K, V> {
        Pair {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K, V> From<(K, V)> for Pair<K, V> {
    #[inline]
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

impl<K, V> From<Pair<K, V>> for (K, V) {
    #[inline]
    fn from(pair: Pair<K, V>) -> Self {
        pair.into_tuple()
    }
}

impl<K: Equatable, V: Equatable> Equatable for Pair<K, V> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        self.key.equals(&other.key) && self.value.equals(&other.value)
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Pair<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.key, self.value)
    }
}
