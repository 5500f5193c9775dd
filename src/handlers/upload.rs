// src/handlers/upload.rs

use std::path::Path;

use axum::{Json, extract::{Multipart, State}, response::IntoResponse};
use uuid::Uuid;

use crate::{config::Config, error::AppError};

/// Accepts a single image blob under the multipart field `image`, writes
/// it to the upload directory under a generated name and returns the
/// relative reference path. The blob content is never inspected.
pub async fn upload_image(
    State(config): State<Config>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let file_name = format!("{}{}", Uuid::new_v4(), extension);
        let dir = Path::new(&config.upload_dir);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;
        tokio::fs::write(dir.join(&file_name), &data)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        tracing::debug!("Stored upload {} ({} bytes)", file_name, data.len());
        return Ok(Json(serde_json::json!({ "url": format!("/uploads/{file_name}") })));
    }

    Err(AppError::BadRequest("Missing 'image' field".to_string()))
}
