// src/store/mod.rs
//
// Storage collaborators. The core model performs no I/O itself; these
// traits are the seam the HTTP handlers talk through, with a Postgres
// implementation for deployment and an in-memory one for tests and
// database-less development.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::form::{Form, FormDraft, FormSummary};
use crate::models::response::AnswerCapture;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Persistence contract for form aggregates. Lookup misses are an
/// explicit `None`/`false`, not an error.
#[async_trait]
pub trait FormStore: Send + Sync {
    /// Stores a draft under a fresh id, returning the stored form.
    async fn create(&self, draft: FormDraft) -> Result<Form, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Form>, AppError>;

    /// Whole-aggregate replace. The later of two saves wins.
    async fn update(&self, id: Uuid, draft: FormDraft) -> Result<Option<Form>, AppError>;

    /// Summaries ordered by creation time, newest first.
    async fn list(&self) -> Result<Vec<FormSummary>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Persistence contract for submitted responses. Captures are write-once.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn create(&self, capture: AnswerCapture) -> Result<AnswerCapture, AppError>;

    /// Captures for one form ordered by submission time, newest first.
    async fn list_by_form(&self, form_id: Uuid) -> Result<Vec<AnswerCapture>, AppError>;
}
