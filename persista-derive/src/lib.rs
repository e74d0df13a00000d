//! Derive macro for persista's structural equality.
//!
//! This crate provides [`Equatable`], which generates an implementation of
//! `persista::equality::Equatable` that compares two values field by field.
//! Containers such as `OrderedIndexMap` route their by-value lookups
//! (`contains`, `index_of`, `unique`) through that trait, so deriving it makes
//! a composite value type usable in those lookups even when it has no
//! `PartialEq`.
//!
//! # Example
//!
//! ```rust,ignore
//! use persista::equality::Equatable;
//! use persista_derive::Equatable;
//!
//! #[derive(Clone, Equatable)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let a = Point { x: 1, y: 2 };
//! let b = Point { x: 1, y: 2 };
//! assert!(a.equals(&b));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod attributes;
mod equatable;

use proc_macro::TokenStream;

/// Derive macro for `persista::equality::Equatable`.
///
/// The generated `equals` compares every field through `Equatable`, so nested
/// composites are compared deeply.
///
/// # Structs
///
/// Named, tuple, and unit structs are supported. A unit struct is always
/// equal to itself.
///
/// # Enums
///
/// Two enum values are equal when they are the same variant and all of the
/// variant's fields are equal. An enum without variants has no values, so its
/// `equals` is an empty match.
///
/// # Attributes
///
/// - `#[equatable(native)]` on the type: delegate to the type's own
///   `PartialEq` instead of comparing fields.
/// - `#[equatable(skip)]` on a field: leave the field out of the comparison.
///
/// ```rust,ignore
/// #[derive(Clone, Equatable)]
/// struct Document {
///     body: String,
///     #[equatable(skip)]
///     cached_length: usize,
/// }
///
/// #[derive(Clone, PartialEq, Equatable)]
/// #[equatable(native)]
/// struct Identifier(u64);
/// ```
///
/// # Generics
///
/// Every type parameter receives an `Equatable` bound in the generated impl:
///
/// ```rust,ignore
/// #[derive(Clone, Equatable)]
/// struct Labelled<T> {
///     label: String,
///     value: T,
/// }
/// // impl<T: Equatable> Equatable for Labelled<T> { ... }
/// ```
///
/// # Unions
///
/// Unions are rejected with a compile error.
#[proc_macro_derive(Equatable, attributes(equatable))]
pub fn derive_equatable(input: TokenStream) -> TokenStream {
    equatable::derive_equatable_impl(input)
}
