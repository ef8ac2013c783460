//! Handlers for defect photo upload, download, listing and deletion.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use fca_core::error::CoreError;
use fca_core::photo::{sanitize_file_name, validate_upload};
use fca_core::types::DbId;
use fca_db::models::photo::NewPhoto;
use fca_db::repositories::PhotoRepo;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Multipart field names accepted for the photo file.
const PHOTO_FIELDS: &[&str] = &["photo", "file"];

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Body of a successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    pub photo_id: DbId,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

// ---------------------------------------------------------------------------
// POST /audits/{audit_id}/defects/{defect_id}/photos
// ---------------------------------------------------------------------------

/// Attach a photo (multipart field `photo`) to an existing defect.
///
/// The defect must belong to the audit in the path; otherwise 404 and
/// nothing is stored.
pub async fn upload_photo(
    State(state): State<AppState>,
    Path((audit_id, defect_id)): Path<(DbId, DbId)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut upload: Option<NewPhoto> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if !PHOTO_FIELDS.contains(&name.as_str()) {
            continue; // ignore unknown fields
        }
        let file_name = field.file_name().unwrap_or("").to_string();
        let mime_type = field.content_type().unwrap_or("").to_string();
        let content = field.bytes().await.map_err(multipart_error)?;
        upload = Some(NewPhoto {
            file_name,
            mime_type,
            content: content.to_vec(),
        });
    }

    let mut photo = upload.ok_or(AppError::Core(CoreError::MissingField { field: "photo" }))?;
    validate_upload(
        &photo.file_name,
        &photo.mime_type,
        photo.content.len(),
        state.config.photo_max_bytes,
    )?;
    photo.file_name = sanitize_file_name(&photo.file_name);

    let meta = PhotoRepo::attach(&state.pool, audit_id, defect_id, &photo)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Defect",
            id: defect_id,
        }))?;

    tracing::info!(
        photo_id = meta.id,
        audit_id,
        defect_id,
        size_bytes = meta.size_bytes,
        "Defect photo uploaded",
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadedPhoto {
            photo_id: meta.id,
            file_name: meta.file_name,
            mime_type: meta.mime_type,
            size_bytes: meta.size_bytes,
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /photos/{id}
// ---------------------------------------------------------------------------

/// Stream a photo's bytes with its stored content type.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let photo = PhotoRepo::find_content(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Photo", id }))?;

    let content_type = HeaderValue::from_str(&photo.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_MIME_TYPE));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&photo.file_name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (CONTENT_TYPE, content_type),
            (CONTENT_DISPOSITION, disposition),
            (CONTENT_LENGTH, HeaderValue::from(photo.content.len())),
        ],
        photo.content,
    ))
}

// ---------------------------------------------------------------------------
// GET /defects/{id}/photos
// ---------------------------------------------------------------------------

/// Photo metadata for a defect, newest first.
pub async fn list_defect_photos(
    State(state): State<AppState>,
    Path(defect_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let photos = PhotoRepo::list_by_defect(&state.pool, defect_id).await?;
    Ok(Json(DataResponse { data: photos }))
}

// ---------------------------------------------------------------------------
// DELETE /photos/{id}
// ---------------------------------------------------------------------------

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !PhotoRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Photo", id }));
    }

    tracing::info!(photo_id = id, "Defect photo deleted");
    Ok(Json(MessageResponse::new("Photo deleted successfully")))
}
