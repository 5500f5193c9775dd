// src/models/form.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Discriminant for the three question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Categorize,
    Cloze,
    Comprehension,
}

/// A bucket respondents sort items into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
}

/// A draggable item with its expected category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeItem {
    pub id: String,
    pub label: String,
    /// Key of the category this item belongs to. Not checked against
    /// `categories` at write time; the audit reports dangling keys.
    pub correct_category_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizeSettings {
    pub categories: Vec<Category>,
    pub items: Vec<CategorizeItem>,
}

impl CategorizeSettings {
    /// Default payload: two empty categories and one item in the first.
    pub fn placeholder() -> Self {
        Self {
            categories: vec![
                Category { key: "cat1".into(), label: String::new() },
                Category { key: "cat2".into(), label: String::new() },
            ],
            items: vec![CategorizeItem {
                id: "i1".into(),
                label: String::new(),
                correct_category_key: "cat1".into(),
            }],
        }
    }
}

/// One fill-in gap of a cloze text, addressed by the digits of its
/// `__<digits>__` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClozeBlank {
    pub key: String,
    pub answer: String,
    /// Optional dropdown choices. Empty means free text.
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClozeSettings {
    /// Prose containing `__1__`-style blank markers.
    pub text: String,
    pub blanks: Vec<ClozeBlank>,
}

impl ClozeSettings {
    /// Default payload: two blanks keyed "1" and "2".
    pub fn placeholder() -> Self {
        Self {
            text: String::new(),
            blanks: vec![
                ClozeBlank { key: "1".into(), answer: String::new(), options: Vec::new() },
                ClozeBlank { key: "2".into(), answer: String::new(), options: Vec::new() },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubQuestionKind {
    Mcq,
    Short,
}

/// A question asked about a comprehension passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestion {
    pub qid: String,
    pub question_text: String,
    pub kind: SubQuestionKind,
    /// Choice labels, used when `kind` is `mcq`.
    #[serde(default)]
    pub options: Vec<String>,
    /// Expected answer. Optional, never used for automatic grading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensionSettings {
    pub passage: String,
    pub questions: Vec<SubQuestion>,
}

impl ComprehensionSettings {
    /// Default payload: one short-answer sub-question.
    pub fn placeholder() -> Self {
        Self {
            passage: String::new(),
            questions: vec![SubQuestion {
                qid: "q1".into(),
                question_text: String::new(),
                kind: SubQuestionKind::Short,
                options: Vec::new(),
                answer: Some(String::new()),
            }],
        }
    }
}

/// Variant payload of a question. Externally tagged so the stored shape
/// stays `{"settings": {"cloze": {...}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSettings {
    Categorize(CategorizeSettings),
    Cloze(ClozeSettings),
    Comprehension(ComprehensionSettings),
}

impl QuestionSettings {
    /// Builds the default-populated payload for a question type.
    pub fn default_for(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Categorize => Self::Categorize(CategorizeSettings::placeholder()),
            QuestionType::Cloze => Self::Cloze(ClozeSettings::placeholder()),
            QuestionType::Comprehension => {
                Self::Comprehension(ComprehensionSettings::placeholder())
            }
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::Categorize(_) => QuestionType::Categorize,
            Self::Cloze(_) => QuestionType::Cloze,
            Self::Comprehension(_) => QuestionType::Comprehension,
        }
    }
}

fn default_required() -> bool {
    true
}

/// Common envelope shared by every question regardless of variant.
///
/// `type` is kept on the wire next to the settings tag for compatibility
/// with stored documents; the settings tag is authoritative and the
/// constructors keep both in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Display rank, re-derived from sequence position on every
    /// structural mutation. The sequence itself is authoritative.
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub image_url: String,
    pub settings: QuestionSettings,
}

impl Question {
    /// A fresh envelope with a generated id and the default settings
    /// payload for `question_type`.
    pub fn new(question_type: QuestionType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question_type,
            order: 0,
            title: String::new(),
            prompt: String::new(),
            required: true,
            image_url: String::new(),
            settings: QuestionSettings::default_for(question_type),
        }
    }
}

/// Form color/font theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub accent: String,
    pub font: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self { accent: "#2563eb".into(), font: "Inter".into() }
    }
}

/// A stored form: metadata plus the ordered question sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub header_image_url: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Form {
    /// Materializes a draft into a stored form.
    pub fn from_draft(id: Uuid, draft: FormDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            header_image_url: draft.header_image_url,
            theme: draft.theme,
            questions: draft.questions,
            created_at,
        }
    }
}

/// DTO for creating or replacing a form. The id and creation time belong
/// to the store.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    #[validate(length(min = 1, message = "Form title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub header_image_url: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl From<Form> for FormDraft {
    fn from(form: Form) -> Self {
        Self {
            title: form.title,
            description: form.description,
            header_image_url: form.header_image_url,
            theme: form.theme,
            questions: form.questions,
        }
    }
}

/// Listing row for the editor's home screen.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
}

impl FormSummary {
    pub fn of(form: &Form) -> Self {
        Self {
            id: form.id,
            title: form.title.clone(),
            description: form.description.clone(),
            question_count: form.questions.len() as i64,
            created_at: form.created_at,
        }
    }
}
