// src/models/response.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One question's answer: a keyed mapping for every variant.
///
/// categorize: item id -> chosen category key;
/// cloze: blank key -> typed text;
/// comprehension: sub-question qid -> chosen option or typed text.
pub type AnswerValue = BTreeMap<String, String>;

/// All answers of one respondent, question id -> keyed values.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// Submission context captured server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub ip: String,
}

/// In-progress answers for a form being filled. Mutable until packaged
/// into an [`AnswerCapture`].
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: AnswerMap,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_answers(answers: AnswerMap) -> Self {
        Self { answers }
    }

    /// Inserts or overwrites one keyed value under a question. The keys
    /// are taken as given; nothing is checked against the form.
    pub fn record(&mut self, question_id: &str, sub_key: &str, value: impl Into<String>) {
        self.answers
            .entry(question_id.to_string())
            .or_default()
            .insert(sub_key.to_string(), value.into());
    }

    /// The current values recorded for a question, if any.
    pub fn answers_for(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Packages the sheet with submission metadata. The sheet is consumed;
    /// captures are immutable once stored.
    pub fn submit(self, form_id: Uuid, meta: SubmissionMeta, submitted_at: DateTime<Utc>) -> AnswerCapture {
        AnswerCapture {
            id: Uuid::new_v4(),
            form_id,
            answers: self.answers,
            meta,
            submitted_at,
        }
    }
}

/// One submitted response: the full answer map plus submission context.
/// Created once per submission, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCapture {
    pub id: Uuid,
    /// Reference to the form this was filled against. Not checked against
    /// live forms; stale ids are stored as-is.
    pub form_id: Uuid,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub meta: SubmissionMeta,
    pub submitted_at: DateTime<Utc>,
}

/// DTO for the submit endpoint. Metadata is filled in server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub form_id: Uuid,
    #[serde(default)]
    pub answers: AnswerMap,
}
