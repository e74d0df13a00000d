//! Equality by canonical encoding.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::Equatable;
use crate::codec;

/// Compares the wrapped values by their binary encoding.
///
/// `Canonical` makes any `Serialize` type usable with the containers'
/// value lookups, without deriving or implementing [`Equatable`]. Two values
/// are equal when their encodings are byte-for-byte identical; a value that
/// fails to serialize is equal to nothing.
///
/// The encoding follows the value's serialization order, so types whose
/// iteration order is unspecified (such as `HashMap`) may compare unequal
/// to an equal value.
///
/// # Examples
///
/// ```rust
/// use persista::equality::{Canonical, Equatable};
/// use persista::persistent::OrderedIndexMap;
/// use serde::Serialize;
///
/// #[derive(Clone, Serialize)]
/// struct Reading {
///     sensor: String,
///     celsius: f32,
/// }
///
/// let readings = OrderedIndexMap::new().update(
///     1,
///     Canonical::new(Reading { sensor: "north".to_string(), celsius: 20.5 }),
/// );
///
/// assert!(readings.contains(&Canonical::new(Reading {
///     sensor: "north".to_string(),
///     celsius: 20.5,
/// })));
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Canonical<T>(pub T);

impl<T> Canonical<T> {
    /// Wraps a value.
    #[inline]
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Unwraps the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Canonical<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Serialize> Equatable for Canonical<T> {
    fn equals(&self, other: &Self) -> bool {
        match (codec::payload(&self.0), codec::payload(&other.0)) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}
