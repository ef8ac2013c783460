use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// Client-input variants (`MissingField`, `InvalidValue`,
/// `InvalidDefectEntry`) are raised before any storage call is made.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid defect entry at index {index}: {reason}")]
    InvalidDefectEntry { index: usize, reason: String },

    #[error("Payload too large: {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { limit: usize, actual: usize },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a natural key (plant, purchase order) matched nothing.
    #[error("Entity not found: {entity} '{key}'")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A collaborating service (mail transport) failed.
    #[error("Upstream service error: {0}")]
    Upstream(String),
}

impl CoreError {
    /// Shorthand for an [`CoreError::InvalidValue`] with a formatted reason.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
