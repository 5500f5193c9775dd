// src/store/memory.rs

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::form::{Form, FormDraft, FormSummary};
use crate::models::response::AnswerCapture;
use crate::store::{FormStore, ResponseStore};

/// In-process store backing the test suite, and the fallback when no
/// `DATABASE_URL` is configured. Contents are lost on shutdown.
#[derive(Default)]
pub struct MemoryStore {
    forms: RwLock<HashMap<Uuid, Form>>,
    captures: RwLock<Vec<AnswerCapture>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn create(&self, draft: FormDraft) -> Result<Form, AppError> {
        let form = Form::from_draft(Uuid::new_v4(), draft, Utc::now());
        let mut forms = self.forms.write().unwrap_or_else(|e| e.into_inner());
        forms.insert(form.id, form.clone());
        Ok(form)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Form>, AppError> {
        let forms = self.forms.read().unwrap_or_else(|e| e.into_inner());
        Ok(forms.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, draft: FormDraft) -> Result<Option<Form>, AppError> {
        let mut forms = self.forms.write().unwrap_or_else(|e| e.into_inner());
        match forms.get(&id) {
            Some(existing) => {
                let updated = Form::from_draft(id, draft, existing.created_at);
                forms.insert(id, updated.clone());
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<FormSummary>, AppError> {
        let forms = self.forms.read().unwrap_or_else(|e| e.into_inner());
        let mut summaries: Vec<FormSummary> = forms.values().map(FormSummary::of).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut forms = self.forms.write().unwrap_or_else(|e| e.into_inner());
        Ok(forms.remove(&id).is_some())
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn create(&self, capture: AnswerCapture) -> Result<AnswerCapture, AppError> {
        let mut captures = self.captures.write().unwrap_or_else(|e| e.into_inner());
        captures.push(capture.clone());
        Ok(capture)
    }

    async fn list_by_form(&self, form_id: Uuid) -> Result<Vec<AnswerCapture>, AppError> {
        let captures = self.captures.read().unwrap_or_else(|e| e.into_inner());
        let mut matching: Vec<AnswerCapture> =
            captures.iter().filter(|c| c.form_id == form_id).cloned().collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(matching)
    }
}
