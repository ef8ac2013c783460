//! Domain logic for the FCA audit backend.
//!
//! Everything in this crate is pure: no database, no network. The `db` and
//! `api` crates depend on it for types, validation and the small
//! computations that shape their responses.

pub mod audit;
pub mod error;
pub mod notification;
pub mod pagination;
pub mod photo;
pub mod regroup;
pub mod report;
pub mod types;
