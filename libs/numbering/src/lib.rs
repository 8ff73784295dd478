//! # backoffice-numbering
//!
//! Sequential, collision-free document numbering for back-office workflows.
//!
//! Document-creation flows (invoicing, warehouse movements, and similar) need
//! a human-readable number that is never issued twice within its scope. A
//! scope is the tuple (tenant, document type, optional sub-scope, year,
//! month); each scope owns an independent monotonic counter.
//!
//! ## Design principles
//!
//! - Counters live in a durable store behind the [`SequenceStore`] trait; the
//!   allocator holds no mutable state of its own, so any number of allocator
//!   instances (including in separate processes) stay correct as long as they
//!   share a store.
//! - The store contract is a single atomic unit: lock-or-create the counter
//!   row, increment by one, commit before releasing. Exclusivity is per row,
//!   never per table, so unrelated scopes never block each other.
//! - Failures never move a counter. A failed call leaves the sequence exactly
//!   where it was; the would-be number is neither skipped nor reused.
//! - Gaps are tolerated (a caller may obtain a number and then abandon its
//!   document), duplicates are not.
//!
//! ## Canonical format
//!
//! ```text
//! {tenant}/{document_type}[/{sub_scope}]/{year}/{month:02}/{sequence:04}
//! ```
//!
//! e.g. `ABC/WZ/01/2025/03/0007`, or `ABC/FV/2025/03/0007` without a
//! sub-scope. [`DocumentNumber`] round-trips through this representation
//! with strict parsing.

mod allocator;
mod error;
mod memory;
mod number;
mod period;
mod scope;
mod store;

pub use allocator::Allocator;
pub use error::{AllocateError, NumberParseError, ScopeError};
pub use memory::MemoryStore;
pub use number::DocumentNumber;
pub use period::Period;
pub use scope::{DocumentScope, ScopeKey};
pub use store::{SequenceIncrement, SequenceStore, StoreError};
