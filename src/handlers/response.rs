// src/handlers/response.rs

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{StatusCode, header::USER_AGENT, HeaderMap},
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::response::{AnswerSheet, SubmissionMeta, SubmitRequest},
    store::ResponseStore,
};

/// Stores one submission. Fire-and-forget from the fill page's point of
/// view: no completeness check of required questions, no coercion of
/// answer values, and no check that the form id or answer keys still
/// reference anything live.
pub async fn submit_response(
    State(responses): State<Arc<dyn ResponseStore>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let meta = SubmissionMeta {
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        ip: addr.ip().to_string(),
    };

    let sheet = AnswerSheet::from_answers(payload.answers);
    let capture = sheet.submit(payload.form_id, meta, Utc::now());

    let stored = responses.create(capture).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Lists all captures for one form, newest submission first.
pub async fn list_for_form(
    State(responses): State<Arc<dyn ResponseStore>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let captures = responses.list_by_form(id).await?;
    Ok(Json(captures))
}
