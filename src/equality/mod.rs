//! Equality oracle for value-based lookups.
//!
//! Containers in this crate answer "does this value occur?" questions
//! (`contains`, `index_of`, `unique`) through the [`Equatable`] trait rather
//! than through `PartialEq`, so that value types without a native equality
//! remain usable. The capability is chosen statically, per type:
//!
//! - **Native**: primitives, strings, and std sets compare through their own
//!   `PartialEq`.
//! - **Structural**: std wrappers and collections (`Option`, `Box`, `Vec`,
//!   tuples, maps, ...) compare element by element through `Equatable`, so a
//!   `Vec<T>` is comparable whenever `T` is, whether or not `T: PartialEq`.
//! - **Derived**: user composites get a field-by-field implementation from
//!   `#[derive(Equatable)]` (`derive` feature).
//! - **Canonical**: [`Canonical<T>`] compares any serializable value by its
//!   binary encoding (`serde` feature).
//!
//! # Examples
//!
//! ```rust
//! use persista::equality::{Equatable, equals};
//!
//! assert!(equals(&vec![Some(1), None], &vec![Some(1), None]));
//! assert!(!"left".equals("right"));
//! ```
//!
//! Floats compare natively, so `NaN` is never equal to itself. Comparison of
//! reference-counted values follows the pointers and does not detect cycles.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "serde")]
mod canonical;

#[cfg(feature = "serde")]
pub use canonical::Canonical;

#[cfg(feature = "derive")]
pub use persista_derive::Equatable;

/// Decides whether two values of the same type are equal.
///
/// # Laws
///
/// Implementations should behave like an equivalence relation on the values
/// they consider comparable:
///
/// 1. **Symmetry**: `a.equals(&b) == b.equals(&a)`
/// 2. **Transitivity**: `a.equals(&b) && b.equals(&c)` implies `a.equals(&c)`
///
/// Reflexivity is not required, matching `PartialEq` (`f64::NAN`).
///
/// # Examples
///
/// ```rust
/// use persista::equality::Equatable;
///
/// struct Celsius(f64);
///
/// impl Equatable for Celsius {
///     fn equals(&self, other: &Self) -> bool {
///         self.0.equals(&other.0)
///     }
/// }
///
/// assert!(Celsius(21.5).equals(&Celsius(21.5)));
/// assert!(vec![Celsius(1.0)].equals(&vec![Celsius(1.0)]));
/// ```
pub trait Equatable {
    /// Returns `true` when `self` and `other` are equal.
    fn equals(&self, other: &Self) -> bool;
}

/// Compares two values through [`Equatable`].
///
/// # Examples
///
/// ```rust
/// use persista::equality::equals;
///
/// assert!(equals(&(1, "a"), &(1, "a")));
/// assert!(!equals(&[1, 2][..], &[1, 2, 3][..]));
/// ```
#[inline]
pub fn equals<T: Equatable + ?Sized>(left: &T, right: &T) -> bool {
    left.equals(right)
}

// =============================================================================
// Native Equality
// =============================================================================

macro_rules! native_equatable {
    ($($type:ty),* $(,)?) => {
        $(
            impl Equatable for $type {
                #[inline]
                #[allow(clippy::float_cmp)]
                fn equals(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

native_equatable!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (),
    str, String, Ordering, Duration,
);

impl<T: Eq + Hash, S: BuildHasher> Equatable for HashSet<T, S> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: Ord> Equatable for BTreeSet<T> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

// =============================================================================
// Structural Equality: pointers and wrappers
// =============================================================================

impl<T: Equatable + ?Sized> Equatable for &T {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        (**self).equals(*other)
    }
}

impl<T: Equatable + ?Sized> Equatable for Box<T> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        (**self).equals(&**other)
    }
}

impl<T: Equatable + ?Sized> Equatable for Rc<T> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || (**self).equals(&**other)
    }
}

impl<T: Equatable + ?Sized> Equatable for Arc<T> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || (**self).equals(&**other)
    }
}

impl<T: ?Sized> Equatable for PhantomData<T> {
    #[inline]
    fn equals(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: Equatable> Equatable for Option<T> {
    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(left), Some(right)) => left.equals(right),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Equatable, E: Equatable> Equatable for Result<T, E> {
    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Ok(left), Ok(right)) => left.equals(right),
            (Err(left), Err(right)) => left.equals(right),
            _ => false,
        }
    }
}

macro_rules! tuple_equatable {
    ($(($($name:ident $index:tt),+)),+ $(,)?) => {
        $(
            impl<$($name: Equatable),+> Equatable for ($($name,)+) {
                #[inline]
                fn equals(&self, other: &Self) -> bool {
                    $(self.$index.equals(&other.$index))&&+
                }
            }
        )+
    };
}

tuple_equatable!(
    (A 0),
    (A 0, B 1),
    (A 0, B 1, C 2),
    (A 0, B 1, C 2, D 3),
    (A 0, B 1, C 2, D 3, E 4),
    (A 0, B 1, C 2, D 3, E 4, F 5),
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6),
    (A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7),
);

// =============================================================================
// Structural Equality: sequences
// =============================================================================

impl<T: Equatable> Equatable for [T] {
    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|(left, right)| left.equals(right))
    }
}

impl<T: Equatable, const N: usize> Equatable for [T; N] {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        self.as_slice().equals(other.as_slice())
    }
}

impl<T: Equatable> Equatable for Vec<T> {
    #[inline]
    fn equals(&self, other: &Self) -> bool {
        self.as_slice().equals(other.as_slice())
    }
}

impl<T: Equatable> Equatable for VecDeque<T> {
    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|(left, right)| left.equals(right))
    }
}

// =============================================================================
// Structural Equality: maps (keys native, values deep)
// =============================================================================

impl<K: Eq + Hash, V: Equatable, S: BuildHasher> Equatable for HashMap<K, V, S> {
    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(key, value)| {
                other
                    .get(key)
                    .is_some_and(|other_value| value.equals(other_value))
            })
    }
}

impl<K: Ord, V: Equatable> Equatable for BTreeMap<K, V> {
    fn equals(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((left_key, left_value), (right_key, right_value))| {
                    left_key == right_key && left_value.equals(right_value)
                })
    }
}

// =============================================================================
// Tests
// =============================================================================
