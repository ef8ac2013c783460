pub mod audits;
pub mod catalog;
pub mod notifications;
pub mod photos;
pub mod reports;
