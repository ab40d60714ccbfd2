//! Selection algebra.
//!
//! ## Modules
//!
//! - [`set`] - Writing selection flags between two endpoints
//! - [`iterate`] - Walking the selected units without changing the tree
//! - [`collect`] - Read helpers built on the walk

pub mod collect;
pub mod iterate;
pub mod set;

#[cfg(test)]
mod tests;

pub use collect::*;
pub use iterate::*;
pub use set::*;
