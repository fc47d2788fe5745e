//! # Memory Management
//!
//! Index structures backing the registry's storage.
//!
//! ## Design Philosophy
//!
//! - Sparse indices are paged so memory tracks the slots actually used
//! - Dense arrays stay packed; removal is swap-and-pop
//! - Growth is amortized; steady-state frames do not allocate

mod dense_set;
mod pages;

pub use dense_set::EntitySet;
pub use pages::{SparsePages, PAGE_SIZE};
