//! Pure domain logic for the agenda contact service.
//!
//! Everything in this crate is synchronous and side-effect-free: no
//! database access, no async, no I/O. The `db` and `api` crates compose
//! these building blocks into the persistent import pipeline.

pub mod csv;
pub mod duplicates;
pub mod error;
pub mod export;
pub mod import;
pub mod pagination;
pub mod types;
pub mod validation;
