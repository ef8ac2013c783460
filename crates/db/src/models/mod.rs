//! Row structs and DTOs.
//!
//! Rows derive `FromRow` + `Serialize` and serialize in camelCase, the
//! shape the inspection front end consumes.

pub mod audit;
pub mod catalog;
pub mod defect;
pub mod notification;
pub mod photo;
pub mod report;
