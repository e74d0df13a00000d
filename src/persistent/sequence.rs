//! Persistent (immutable) ordered sequence.
//!
//! This module provides [`PersistentSequence`], a copy-on-write array with
//! functional transformations.
//!
//! # Overview
//!
//! The elements live in one contiguous, immutable allocation behind a
//! reference counter. Reads borrow from it directly; every transformation
//! builds a fresh allocation and leaves the receiver as it was.
//!
//! - O(1) `get`, `head`, `last`, `len`, `clone`
//! - O(n) every transformation (`tail`, `append`, `map`, `filter`, `sort_by`, ...)
//! - O(n²) `unique`, which only relies on [`Equatable`]
//!
//! # Examples
//!
//! ```rust
//! use persista::persistent::PersistentSequence;
//!
//! let sequence: PersistentSequence<i32> = (1..=5).collect();
//! let evens = sequence.filter(|value| value % 2 == 0);
//!
//! assert_eq!(evens.to_vec(), vec![2, 4]);
//! assert_eq!(sequence.len(), 5); // Original unchanged
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;

use super::ReferenceCounter;
use crate::equality::Equatable;
use crate::typeclass::{Foldable, TypeConstructor};

#[cfg(feature = "serde")]
use crate::codec::{self, CodecError, FrameHeader, FrameKind};

// =============================================================================
// PersistentSequence Definition
// =============================================================================

/// A persistent (immutable) ordered sequence.
///
/// # Time Complexity
///
/// | Operation        | Complexity |
/// |------------------|------------|
/// | `new`            | O(1)       |
/// | `get` / `head`   | O(1)       |
/// | `len`            | O(1)       |
/// | `clone`          | O(1)       |
/// | `tail`           | O(n)       |
/// | `append`         | O(n + m)   |
/// | `map` / `filter` | O(n)       |
/// | `sort_by`        | O(n log n) |
/// | `index_of`       | O(n)       |
/// | `unique`         | O(n²)      |
///
/// # Examples
///
/// ```rust
/// use persista::persistent::PersistentSequence;
///
/// let sequence = PersistentSequence::singleton(1).append([2, 3]);
/// assert_eq!(sequence.head(), Some(&1));
/// assert_eq!(sequence.tail().to_vec(), vec![2, 3]);
/// ```
pub struct PersistentSequence<T> {
    elements: ReferenceCounter<Vec<T>>,
}

impl<T> PersistentSequence<T> {
    /// Creates an empty sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<i32> = PersistentSequence::new();
    /// assert!(sequence.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    #[inline]
    fn from_vec(elements: Vec<T>) -> Self {
        Self {
            elements: ReferenceCounter::new(elements),
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the sequence has no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element at `index`, or `None` when out of bounds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<char> = "abc".chars().collect();
    /// assert_eq!(sequence.get(1), Some(&'b'));
    /// assert_eq!(sequence.get(3), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    /// Returns the first element.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Option<&T> {
        self.elements.first()
    }

    /// Returns the last element.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.elements.last()
    }

    /// Returns the first element satisfying `predicate`.
    #[must_use]
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.elements.iter().find(|element| predicate(element))
    }

    /// Returns the first element satisfying `predicate` together with its
    /// position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<i32> = vec![5, 6, 7].into();
    /// assert_eq!(sequence.find_with_index(|_, value| *value > 5), Some((1, &6)));
    /// ```
    #[must_use]
    pub fn find_with_index<P>(&self, mut predicate: P) -> Option<(usize, &T)>
    where
        P: FnMut(usize, &T) -> bool,
    {
        self.elements
            .iter()
            .enumerate()
            .find(|(index, element)| predicate(*index, element))
    }

    /// Applies `function` to every element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let words: PersistentSequence<&str> = vec!["a", "bb", "ccc"].into();
    /// let lengths = words.map(|word| word.len());
    /// assert_eq!(lengths.to_vec(), vec![1, 2, 3]);
    /// ```
    #[must_use]
    pub fn map<U, F>(&self, function: F) -> PersistentSequence<U>
    where
        F: FnMut(&T) -> U,
    {
        PersistentSequence::from_vec(self.elements.iter().map(function).collect())
    }

    /// Applies `function` to every element and its position.
    #[must_use]
    pub fn map_with_index<U, F>(&self, mut function: F) -> PersistentSequence<U>
    where
        F: FnMut(usize, &T) -> U,
    {
        PersistentSequence::from_vec(
            self.elements
                .iter()
                .enumerate()
                .map(|(index, element)| function(index, element))
                .collect(),
        )
    }

    /// Returns an iterator over the elements.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Borrows the elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Returns `true` when both sequences share the same storage.
    ///
    /// Sharing implies equal contents; the converse does not hold.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.elements, &other.elements)
    }
}

impl<T: Clone> PersistentSequence<T> {
    /// Creates a sequence holding a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::from_vec(vec![element])
    }

    /// Returns all elements but the first. An empty sequence stays empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<i32> = vec![1, 2, 3].into();
    /// assert_eq!(sequence.tail().to_vec(), vec![2, 3]);
    /// assert!(PersistentSequence::<i32>::new().tail().is_empty());
    /// ```
    #[must_use]
    pub fn tail(&self) -> Self {
        self.elements
            .split_first()
            .map_or_else(Self::new, |(_, rest)| Self::from_vec(rest.to_vec()))
    }

    /// Returns a sequence with `values` added at the end.
    #[must_use]
    pub fn append<I>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut elements = self.to_vec();
        elements.extend(values);
        Self::from_vec(elements)
    }

    /// Returns this sequence followed by `other`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        self.append(other.iter().cloned())
    }

    /// Keeps the elements satisfying `predicate`, in order.
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        Self::from_vec(
            self.elements
                .iter()
                .filter(|element| predicate(element))
                .cloned()
                .collect(),
        )
    }

    /// Drops the elements satisfying `predicate`, in order.
    #[must_use]
    pub fn filter_not<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool,
    {
        self.filter(|element| !predicate(element))
    }

    /// Keeps the elements for which `predicate(position, element)` holds.
    #[must_use]
    pub fn filter_with_index<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(usize, &T) -> bool,
    {
        Self::from_vec(
            self.elements
                .iter()
                .enumerate()
                .filter(|(index, element)| predicate(*index, element))
                .map(|(_, element)| element.clone())
                .collect(),
        )
    }

    /// Returns the elements in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::from_vec(self.elements.iter().rev().cloned().collect())
    }

    /// Returns at most the first `count` elements.
    #[must_use]
    pub fn limit(&self, count: usize) -> Self {
        Self::from_vec(self.elements.iter().take(count).cloned().collect())
    }

    /// Returns the elements stably sorted by `compare`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<i32> = vec![3, 1, 2].into();
    /// let descending = sequence.sort_by(|left, right| right.cmp(left));
    /// assert_eq!(descending.to_vec(), vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn sort_by<F>(&self, compare: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut elements = self.to_vec();
        elements.sort_by(compare);
        Self::from_vec(elements)
    }

    /// Copies the elements into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.elements.to_vec()
    }
}

impl<T: Clone + Ord> PersistentSequence<T> {
    /// Returns the elements stably sorted in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Self {
        self.sort_by(Ord::cmp)
    }
}

impl<T: Clone + Equatable> PersistentSequence<T> {
    /// Returns the position of the first element equal to `element`.
    ///
    /// Equality is decided by [`Equatable`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<Vec<f64>> = vec![vec![0.5], vec![1.5]].into();
    /// assert_eq!(sequence.index_of(&vec![1.5]), Some(1));
    /// assert_eq!(sequence.index_of(&vec![2.5]), None);
    /// ```
    #[must_use]
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.elements
            .iter()
            .position(|candidate| candidate.equals(element))
    }

    /// Returns `true` if an element equal to `element` is present.
    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }

    /// Removes repeated elements, keeping the first occurrence of each.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persista::persistent::PersistentSequence;
    ///
    /// let sequence: PersistentSequence<i32> = vec![3, 1, 3, 2, 1].into();
    /// assert_eq!(sequence.unique().to_vec(), vec![3, 1, 2]);
    /// ```
    #[must_use]
    pub fn unique(&self) -> Self {
        let mut kept: Vec<T> = Vec::with_capacity(self.len());
        for element in self {
            if !kept.iter().any(|existing| existing.equals(element)) {
                kept.push(element.clone());
            }
        }
        Self::from_vec(kept)
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> PersistentSequence<T> {
    /// Encodes the sequence into a binary frame, preserving element order.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] when an element fails to serialize.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode_framed(FrameHeader::of::<T>(FrameKind::Sequence), self)
    }
}

#[cfg(feature = "serde")]
impl<T: serde::de::DeserializeOwned> PersistentSequence<T> {
    /// Decodes a sequence from a frame produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the frame is malformed or was written
    /// by another container kind or element type.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::decode_framed(FrameHeader::of::<T>(FrameKind::Sequence), bytes)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An owning iterator over the elements of a [`PersistentSequence`].
pub struct PersistentSequenceIntoIterator<T> {
    elements: std::vec::IntoIter<T>,
}

impl<T> Iterator for PersistentSequenceIntoIterator<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<T> DoubleEndedIterator for PersistentSequenceIntoIterator<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.elements.next_back()
    }
}

impl<T> ExactSizeIterator for PersistentSequenceIntoIterator<T> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentSequence<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            elements: ReferenceCounter::clone(&self.elements),
        }
    }
}

impl<T> Default for PersistentSequence<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for PersistentSequence<T> {
    #[inline]
    fn from(elements: Vec<T>) -> Self {
        Self::from_vec(elements)
    }
}

impl<T> FromIterator<T> for PersistentSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone> IntoIterator for PersistentSequence<T> {
    type Item = T;
    type IntoIter = PersistentSequenceIntoIterator<T>;

    /// Moves the elements out when this is the last snapshot holding them,
    /// and clones them otherwise.
    fn into_iter(self) -> Self::IntoIter {
        PersistentSequenceIntoIterator {
            elements: ReferenceCounter::unwrap_or_clone(self.elements).into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Index<usize> for PersistentSequence<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<T: PartialEq> PartialEq for PersistentSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.elements == other.elements
    }
}

impl<T: Eq> Eq for PersistentSequence<T> {}

impl<T: Equatable> Equatable for PersistentSequence<T> {
    fn equals(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.as_slice().equals(other.as_slice())
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentSequence<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentSequence<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<T> TypeConstructor for PersistentSequence<T> {
    type Inner = T;
    type WithType<B> = PersistentSequence<B>;
}

impl<T: Clone> Foldable for PersistentSequence<T> {
    fn fold_left<B, F>(self, init: B, function: F) -> B
    where
        F: FnMut(B, T) -> B,
    {
        self.into_iter().fold(init, function)
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(T, B) -> B,
    {
        self.elements
            .iter()
            .rev()
            .cloned()
            .fold(init, |accumulator, element| function(element, accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    fn length(&self) -> usize {
        self.elements.len()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentSequence<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentSequenceVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<T> PersistentSequenceVisitor<T> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentSequenceVisitor<T>
where
    T: serde::Deserialize<'de>,
{
    type Value = PersistentSequence<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut elements = Vec::with_capacity(capacity);
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        Ok(PersistentSequence::from_vec(elements))
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentSequence<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentSequenceVisitor::new())
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentSequence<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
