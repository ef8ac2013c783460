//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement writes run in a
//! single transaction.

pub mod audit_repo;
pub mod catalog_repo;
pub mod defect_repo;
pub mod notification_repo;
pub mod photo_repo;
pub mod user_repo;

pub use audit_repo::AuditRepo;
pub use catalog_repo::CatalogRepo;
pub use defect_repo::DefectRepo;
pub use notification_repo::NotificationRepo;
pub use photo_repo::PhotoRepo;
pub use user_repo::UserRepo;
