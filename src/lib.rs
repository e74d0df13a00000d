//! # persista
//!
//! Persistent collections with functional-style transformations.
//!
//! ## Overview
//!
//! Every "mutating" operation in this library returns a new collection and
//! leaves the receiver untouched, so any snapshot that was handed out stays
//! valid and can be read without coordination. Lookups that may fail return
//! `Option` instead of sentinel values.
//!
//! - **Ordered index map**: [`OrderedIndexMap`](persistent::OrderedIndexMap),
//!   an insertion-ordered key/value map backed by a key-to-position index
//! - **Sequence**: [`PersistentSequence`](persistent::PersistentSequence)
//! - **Unordered map**: [`PersistentMap`](persistent::PersistentMap)
//! - **Equality oracle**: [`Equatable`](equality::Equatable), native equality
//!   where the type has it and deep structural equality where it does not
//! - **Type classes**: [`Foldable`](typeclass::Foldable)
//! - **Codec**: self-describing binary frames for every container, tagged
//!   with the container kind and a fingerprint of its element types
//!
//! ## Feature Flags
//!
//! - `derive`: `#[derive(Equatable)]` for composite value types
//! - `serde`: serde support, binary encode/decode, [`Canonical`](equality::Canonical)
//! - `arc`: thread-safe snapshots (`Arc` instead of `Rc`)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use persista::prelude::*;
//!
//! let map = OrderedIndexMap::new()
//!     .update("one".to_string(), 1)
//!     .update("two".to_string(), 2)
//!     .update("three".to_string(), 3);
//!
//! let doubled = map.map(|_, value| value * 2);
//! assert_eq!(doubled.get_value("two"), Some(&4));
//! assert_eq!(map.get_value("two"), Some(&2)); // Original unchanged
//!
//! let keys: Vec<String> = map.keys().to_vec();
//! assert_eq!(keys, vec!["one", "two", "three"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Lets `#[derive(Equatable)]` expand to `::persista::...` inside this crate too.
extern crate self as persista;

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use persista::prelude::*;
/// ```
pub mod prelude {
    pub use crate::equality::*;
    pub use crate::persistent::*;
    pub use crate::typeclass::*;

    #[cfg(feature = "serde")]
    pub use crate::codec::CodecError;
}

pub mod equality;
pub mod persistent;
pub mod typeclass;

#[cfg(feature = "serde")]
pub mod codec;
