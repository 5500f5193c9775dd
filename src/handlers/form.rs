// src/handlers/form.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    editor::{self, EditOp},
    error::AppError,
    models::{form::FormDraft, response::AnswerSheet},
    render,
    store::FormStore,
    validate,
};

/// Lists form summaries, newest first.
pub async fn list_forms(
    State(forms): State<Arc<dyn FormStore>>,
) -> Result<impl IntoResponse, AppError> {
    let summaries = forms.list().await?;
    Ok(Json(summaries))
}

/// Retrieves a single form by id.
pub async fn get_form(
    State(forms): State<Arc<dyn FormStore>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let form = forms
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(form))
}

/// Creates a form from a draft.
pub async fn create_form(
    State(forms): State<Arc<dyn FormStore>>,
    Json(payload): Json<FormDraft>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let form = forms.create(payload).await?;
    Ok((StatusCode::CREATED, Json(form)))
}

/// Whole-aggregate replace. The later of two saves wins wholesale.
pub async fn update_form(
    State(forms): State<Arc<dyn FormStore>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FormDraft>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let updated = forms
        .update(id, payload)
        .await?
        .ok_or(AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(updated))
}

/// Applies a batch of editing gestures to a stored form and persists the
/// result. Gestures addressing missing questions or entries are silently
/// skipped.
pub async fn patch_form(
    State(forms): State<Arc<dyn FormStore>>,
    Path(id): Path<Uuid>,
    Json(ops): Json<Vec<EditOp>>,
) -> Result<impl IntoResponse, AppError> {
    let mut form = forms
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Form not found".to_string()))?;

    let total = ops.len();
    let applied = editor::apply_all(&mut form, ops);
    tracing::debug!("Applied {}/{} edit ops to form {}", applied, total, id);

    let draft = FormDraft::from(form);
    if let Err(validation_errors) = draft.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let updated = forms
        .update(id, draft)
        .await?
        .ok_or(AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(updated))
}

/// Deletes a form. Acks even when the id was already gone.
pub async fn delete_form(
    State(forms): State<Arc<dyn FormStore>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = forms.delete(id).await?;
    if !deleted {
        tracing::debug!("Delete for unknown form {}", id);
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Projects a form into the input surface the fill page renders.
pub async fn get_fill_view(
    State(forms): State<Arc<dyn FormStore>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let form = forms
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Form not found".to_string()))?;
    Ok(Json(render::render_form(&form, &AnswerSheet::new())))
}

/// Runs the consistency audit over a stored form.
pub async fn get_audit(
    State(forms): State<Arc<dyn FormStore>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let form = forms
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Form not found".to_string()))?;
    let issues = validate::audit_form(&form);
    Ok(Json(serde_json::json!({ "issues": issues })))
}
