//! Document numbering API server.
//!
//! Exposes the sequence allocator from `backoffice-numbering` over HTTP for
//! document-creation workflows (invoicing, warehouse movements, and other
//! back-office features) that need a collision-free document number.
//!
//! Counters are durably stored in Postgres, incremented under a row-level
//! `SELECT ... FOR UPDATE` lock; dev mode swaps in the in-memory store so
//! the service runs without a database.

pub mod api;
pub mod config;
pub mod db;
pub mod state;
