// src/store/pg.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::form::{Form, FormDraft, FormSummary, Question, Theme};
use crate::models::response::{AnswerCapture, AnswerMap, SubmissionMeta};
use crate::store::{FormStore, ResponseStore};

/// Postgres-backed store. Nested structures (theme, questions, answers,
/// meta) live in JSONB columns in exactly the wire shape, so stored
/// documents round-trip field-for-field.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row mapping for the 'forms' table.
#[derive(FromRow)]
struct FormRow {
    id: Uuid,
    title: String,
    description: String,
    header_image_url: String,
    theme: Json<Theme>,
    questions: Json<Vec<Question>>,
    created_at: DateTime<Utc>,
}

impl From<FormRow> for Form {
    fn from(row: FormRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            header_image_url: row.header_image_url,
            theme: row.theme.0,
            questions: row.questions.0,
            created_at: row.created_at,
        }
    }
}

/// Row mapping for the 'responses' table.
#[derive(FromRow)]
struct CaptureRow {
    id: Uuid,
    form_id: Uuid,
    answers: Json<AnswerMap>,
    meta: Json<SubmissionMeta>,
    submitted_at: DateTime<Utc>,
}

impl From<CaptureRow> for AnswerCapture {
    fn from(row: CaptureRow) -> Self {
        Self {
            id: row.id,
            form_id: row.form_id,
            answers: row.answers.0,
            meta: row.meta.0,
            submitted_at: row.submitted_at,
        }
    }
}

const FORM_COLUMNS: &str = "id, title, description, header_image_url, theme, questions, created_at";

#[async_trait]
impl FormStore for PgStore {
    async fn create(&self, draft: FormDraft) -> Result<Form, AppError> {
        let form = Form::from_draft(Uuid::new_v4(), draft, Utc::now());
        sqlx::query(
            "INSERT INTO forms (id, title, description, header_image_url, theme, questions, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(form.id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.header_image_url)
        .bind(Json(&form.theme))
        .bind(Json(&form.questions))
        .bind(form.created_at)
        .execute(&self.pool)
        .await?;
        Ok(form)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        let row = sqlx::query_as::<_, FormRow>(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Form::from))
    }

    async fn update(&self, id: Uuid, draft: FormDraft) -> Result<Option<Form>, AppError> {
        let row = sqlx::query_as::<_, FormRow>(&format!(
            "UPDATE forms
             SET title = $2, description = $3, header_image_url = $4, theme = $5, questions = $6
             WHERE id = $1
             RETURNING {FORM_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.header_image_url)
        .bind(Json(&draft.theme))
        .bind(Json(&draft.questions))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Form::from))
    }

    async fn list(&self) -> Result<Vec<FormSummary>, AppError> {
        let summaries = sqlx::query_as::<_, FormSummary>(
            "SELECT id, title, description,
                    jsonb_array_length(questions)::BIGINT AS question_count,
                    created_at
             FROM forms
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ResponseStore for PgStore {
    async fn create(&self, capture: AnswerCapture) -> Result<AnswerCapture, AppError> {
        sqlx::query(
            "INSERT INTO responses (id, form_id, answers, meta, submitted_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(capture.id)
        .bind(capture.form_id)
        .bind(Json(&capture.answers))
        .bind(Json(&capture.meta))
        .bind(capture.submitted_at)
        .execute(&self.pool)
        .await?;
        Ok(capture)
    }

    async fn list_by_form(&self, form_id: Uuid) -> Result<Vec<AnswerCapture>, AppError> {
        let rows = sqlx::query_as::<_, CaptureRow>(
            "SELECT id, form_id, answers, meta, submitted_at
             FROM responses
             WHERE form_id = $1
             ORDER BY submitted_at DESC",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AnswerCapture::from).collect())
    }
}
