//! Higher-kinded type emulation through generic associated types.
//!
//! Rust cannot abstract over a type constructor such as `Option<_>` or
//! `PersistentSequence<_>` directly. [`TypeConstructor`] names the element
//! type a structure is applied to and the same structure applied to another
//! type, which is all [`Foldable`](super::Foldable) needs.
//!
//! # Example
//!
//! ```rust
//! use persista::persistent::PersistentSequence;
//! use persista::typeclass::TypeConstructor;
//!
//! fn element_count<T>(_: &T) -> &'static str
//! where
//!     T: TypeConstructor<Inner = i32>,
//! {
//!     "i32 elements"
//! }
//!
//! let sequence: PersistentSequence<i32> = (1..=3).collect();
//! assert_eq!(element_count(&sequence), "i32 elements");
//! ```

/// A type constructor applied to its element type.
///
/// # Laws
///
/// `<F as TypeConstructor>::WithType<F::Inner>` should be `F` itself.
pub trait TypeConstructor {
    /// The element type, e.g. `i32` for `Option<i32>`.
    type Inner;

    /// The same constructor applied to `B`, e.g. `Option<B>` for `Option<i32>`.
    type WithType<B>: TypeConstructor<Inner = B>;
}

impl<A> TypeConstructor for Option<A> {
    type Inner = A;
    type WithType<B> = Option<B>;
}

impl<T> TypeConstructor for Vec<T> {
    type Inner = T;
    type WithType<B> = Vec<B>;
}
