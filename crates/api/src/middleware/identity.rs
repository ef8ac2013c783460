//! Caller identity extractor.
//!
//! The caller's account is supplied by the upstream gateway in the
//! `X-User-Email` header and trusted as-is.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use fca_core::error::CoreError;

use crate::error::AppError;

/// Header carrying the caller's e-mail address.
pub const IDENTITY_HEADER: &str = "x-user-email";

/// The caller's e-mail address, trimmed and non-empty.
///
/// Extract `Identity` in handlers that require a caller and
/// `Option<Identity>` where the caller is only a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn read_identity(parts: &Parts) -> Result<Option<Identity>, AppError> {
    let Some(value) = parts.headers.get(IDENTITY_HEADER) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        AppError::Core(CoreError::Unauthorized(
            "X-User-Email header is not valid text".into(),
        ))
    })?;
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(Identity(value.to_string())))
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        read_identity(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing X-User-Email header".into(),
            ))
        })
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        read_identity(parts)
    }
}
