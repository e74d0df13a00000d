//! Type class traits shared by the persistent containers.
//!
//! - [`TypeConstructor`]: higher-kinded type emulation through GATs
//! - [`Foldable`]: reducing a structure to a summary value
//!
//! # Examples
//!
//! ```rust
//! use persista::typeclass::Foldable;
//!
//! let product = vec![1, 2, 3, 4].fold_left(1, |accumulator, element| accumulator * element);
//! assert_eq!(product, 24);
//! ```

mod foldable;
mod higher;

pub use foldable::Foldable;
pub use higher::TypeConstructor;
