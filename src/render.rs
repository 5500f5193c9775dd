// src/render.rs
//
// Stateless projection of a question plus partial answers into the input
// surface a fill page needs. Folding input back is the other half of the
// contract: each emitted input names the (question id, sub key) pair to
// record through `AnswerSheet::record`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::models::form::{Form, Question, QuestionSettings, SubQuestionKind, Theme};
use crate::models::response::{AnswerSheet, AnswerValue};

/// Blank marker syntax inside cloze text. The captured digits are the
/// blank key.
pub(crate) static BLANK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(\d+)__").expect("blank marker pattern"));

/// One piece of a cloze line: literal prose or an input field. The marker
/// text itself never renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClozeSegment {
    Text(String),
    Input {
        key: String,
        value: Option<String>,
        /// Dropdown choices when the matching blank defines any.
        options: Vec<String>,
    },
}

/// A category choice offered for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChoice {
    pub key: String,
    pub label: String,
}

/// One item awaiting a category, with the currently selected key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeSlot {
    pub item_id: String,
    pub label: String,
    pub choices: Vec<CategoryChoice>,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubQuestionInput {
    /// Single select among the options; records the chosen option string.
    Choice { options: Vec<String>, selected: Option<String> },
    /// Free text field; records the typed string.
    Text { value: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSubQuestion {
    pub qid: String,
    pub question_text: String,
    pub input: SubQuestionInput,
}

/// Variant-specific input surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderedBody {
    Categorize { slots: Vec<CategorizeSlot> },
    Cloze { segments: Vec<ClozeSegment> },
    Comprehension { passage: String, questions: Vec<RenderedSubQuestion> },
}

/// One question ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedQuestion {
    pub question_id: String,
    pub title: String,
    pub prompt: String,
    pub required: bool,
    pub image_url: String,
    pub body: RenderedBody,
}

/// The whole fill page for a form, prefilled from `sheet`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedForm {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub header_image_url: String,
    pub theme: Theme,
    pub questions: Vec<RenderedQuestion>,
}

pub fn render_form(form: &Form, sheet: &AnswerSheet) -> RenderedForm {
    RenderedForm {
        id: form.id,
        title: form.title.clone(),
        description: form.description.clone(),
        header_image_url: form.header_image_url.clone(),
        theme: form.theme.clone(),
        questions: form
            .questions
            .iter()
            .map(|q| render_question(q, sheet.answers_for(&q.id)))
            .collect(),
    }
}

pub fn render_question(question: &Question, answers: Option<&AnswerValue>) -> RenderedQuestion {
    let recorded = |key: &str| answers.and_then(|a| a.get(key)).cloned();

    let body = match &question.settings {
        QuestionSettings::Categorize(s) => {
            let choices: Vec<CategoryChoice> = s
                .categories
                .iter()
                .map(|c| CategoryChoice { key: c.key.clone(), label: c.label.clone() })
                .collect();
            RenderedBody::Categorize {
                slots: s
                    .items
                    .iter()
                    .map(|item| CategorizeSlot {
                        item_id: item.id.clone(),
                        label: item.label.clone(),
                        choices: choices.clone(),
                        selected: recorded(&item.id),
                    })
                    .collect(),
            }
        }
        QuestionSettings::Cloze(s) => RenderedBody::Cloze {
            segments: split_cloze(&s.text)
                .into_iter()
                .map(|segment| match segment {
                    ClozePart::Text(text) => ClozeSegment::Text(text),
                    ClozePart::Blank(key) => {
                        // First blank with a matching key wins; blanks never
                        // referenced by a marker are never rendered.
                        let options = s
                            .blanks
                            .iter()
                            .find(|b| b.key == key)
                            .map(|b| b.options.clone())
                            .unwrap_or_default();
                        ClozeSegment::Input { value: recorded(&key), key, options }
                    }
                })
                .collect(),
        },
        QuestionSettings::Comprehension(s) => RenderedBody::Comprehension {
            passage: s.passage.clone(),
            questions: s
                .questions
                .iter()
                .map(|sub| RenderedSubQuestion {
                    qid: sub.qid.clone(),
                    question_text: sub.question_text.clone(),
                    input: match sub.kind {
                        SubQuestionKind::Mcq => SubQuestionInput::Choice {
                            options: sub.options.clone(),
                            selected: recorded(&sub.qid),
                        },
                        SubQuestionKind::Short => {
                            SubQuestionInput::Text { value: recorded(&sub.qid) }
                        }
                    },
                })
                .collect(),
        },
    };

    RenderedQuestion {
        question_id: question.id.clone(),
        title: question.title.clone(),
        prompt: question.prompt.clone(),
        required: question.required,
        image_url: question.image_url.clone(),
        body,
    }
}

/// Raw split result before answer lookup.
#[derive(Debug, Clone, PartialEq)]
enum ClozePart {
    Text(String),
    Blank(String),
}

/// Splits cloze text on blank markers. Empty literal fragments (markers
/// back to back, or at the very start/end) are dropped.
fn split_cloze(text: &str) -> Vec<ClozePart> {
    let mut parts = Vec::new();
    let mut cursor = 0;
    for captures in BLANK_MARKER.captures_iter(text) {
        let marker = captures.get(0).expect("whole match");
        if marker.start() > cursor {
            parts.push(ClozePart::Text(text[cursor..marker.start()].to_string()));
        }
        parts.push(ClozePart::Blank(captures[1].to_string()));
        cursor = marker.end();
    }
    if cursor < text.len() {
        parts.push(ClozePart::Text(text[cursor..].to_string()));
    }
    parts
}
