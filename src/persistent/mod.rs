//! Persistent (immutable) collections.
//!
//! Every container in this module is a snapshot: operations that would
//! modify it return a new container instead, and the receiver stays valid
//! and unchanged.
//!
//! - [`PersistentSequence`]: ordered sequence
//! - [`OrderedIndexMap`]: insertion-ordered key/value pairs with O(1) key lookup
//! - [`PersistentMap`]: unordered key/value map
//! - [`Pair`]: the key/value unit stored by the maps
//!
//! # Copy on Write
//!
//! The containers do not share structure between versions. Each keeps its
//! contents in a single immutable allocation behind a reference counter, so
//! cloning a snapshot is O(1), while every modification copies the whole
//! contents into a fresh allocation.
//!
//! # Examples
//!
//! ## `OrderedIndexMap`
//!
//! ```rust
//! use persista::persistent::OrderedIndexMap;
//!
//! let map = OrderedIndexMap::new()
//!     .update("b", 2)
//!     .update("a", 1);
//!
//! // Insertion order is kept
//! assert_eq!(map.keys().to_vec(), vec!["b", "a"]);
//!
//! let updated = map.update("b", 20);
//! assert_eq!(map.get_value("b"), Some(&2));      // Original unchanged
//! assert_eq!(updated.get_value("b"), Some(&20)); // New version
//! assert_eq!(updated.keys().to_vec(), vec!["b", "a"]);
//! ```
//!
//! ## `PersistentMap`
//!
//! ```rust
//! use persista::persistent::PersistentMap;
//!
//! let map = PersistentMap::new()
//!     .update("one".to_string(), 1)
//!     .update("two".to_string(), 2);
//! assert_eq!(map.get_value("one"), Some(&1));
//!
//! let removed = map.remove("one");
//! assert_eq!(map.len(), 2);     // Original unchanged
//! assert_eq!(removed.len(), 1); // New version
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer holding a container's storage.
///
/// With the `arc` feature (default) this is `std::sync::Arc`, which makes
/// the containers `Send + Sync`. Without it, `std::rc::Rc`.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod hashmap;
mod ordered_index_map;
mod pair;
mod sequence;

pub use hashmap::PersistentMap;
pub use hashmap::PersistentMapIntoIterator;
pub use ordered_index_map::OrderedIndexMap;
pub use ordered_index_map::OrderedIndexMapIntoIterator;
pub use pair::Pair;
pub use sequence::PersistentSequence;
pub use sequence::PersistentSequenceIntoIterator;

// =============================================================================
// Tests
// =============================================================================
