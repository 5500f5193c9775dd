// src/validate.rs
//
// Explicit consistency audit. Write paths stay lenient: a form with
// duplicate keys, dangling category references or mismatched blanks is
// accepted and stored as-is. This pass is the separately callable check
// that surfaces those conditions before they show up at fill time as
// "no matching option".

use std::collections::HashSet;

use serde::Serialize;
use url::Url;

use crate::models::form::{Form, QuestionSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    EmptyTitle,
    DuplicateQuestionId,
    DuplicateCategoryKey,
    DuplicateItemId,
    DanglingCategoryKey,
    DuplicateBlankKey,
    MarkerWithoutBlank,
    BlankWithoutMarker,
    DuplicateSubQuestionId,
    McqWithoutOptions,
    MalformedImageRef,
}

/// One audit finding. `question_id` is absent for form-level findings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormIssue {
    pub code: IssueCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub detail: String,
}

impl FormIssue {
    fn form_level(code: IssueCode, detail: impl Into<String>) -> Self {
        Self { code, question_id: None, detail: detail.into() }
    }

    fn for_question(code: IssueCode, question_id: &str, detail: impl Into<String>) -> Self {
        Self { code, question_id: Some(question_id.to_string()), detail: detail.into() }
    }
}

/// An image reference is either a relative `/uploads/...` path handed out
/// by the upload endpoint or an absolute URL.
pub fn image_ref_ok(reference: &str) -> bool {
    reference.is_empty() || reference.starts_with('/') || Url::parse(reference).is_ok()
}

/// Audits a form for cross-field consistency. Reports, never rejects.
pub fn audit_form(form: &Form) -> Vec<FormIssue> {
    let mut issues = Vec::new();

    if form.title.trim().is_empty() {
        issues.push(FormIssue::form_level(IssueCode::EmptyTitle, "Form title is empty"));
    }
    if !image_ref_ok(&form.header_image_url) {
        issues.push(FormIssue::form_level(
            IssueCode::MalformedImageRef,
            format!("Header image reference '{}' is neither a path nor a URL", form.header_image_url),
        ));
    }

    let mut question_ids = HashSet::new();
    for question in &form.questions {
        if !question_ids.insert(question.id.as_str()) {
            issues.push(FormIssue::for_question(
                IssueCode::DuplicateQuestionId,
                &question.id,
                format!("Question id '{}' appears more than once", question.id),
            ));
        }
        if !image_ref_ok(&question.image_url) {
            issues.push(FormIssue::for_question(
                IssueCode::MalformedImageRef,
                &question.id,
                format!("Image reference '{}' is neither a path nor a URL", question.image_url),
            ));
        }
        match &question.settings {
            QuestionSettings::Categorize(s) => {
                let mut keys = HashSet::new();
                for category in &s.categories {
                    if !keys.insert(category.key.as_str()) {
                        issues.push(FormIssue::for_question(
                            IssueCode::DuplicateCategoryKey,
                            &question.id,
                            format!("Category key '{}' is duplicated", category.key),
                        ));
                    }
                }
                let mut item_ids = HashSet::new();
                for item in &s.items {
                    if !item_ids.insert(item.id.as_str()) {
                        issues.push(FormIssue::for_question(
                            IssueCode::DuplicateItemId,
                            &question.id,
                            format!("Item id '{}' is duplicated", item.id),
                        ));
                    }
                    if !item.correct_category_key.is_empty()
                        && !s.categories.iter().any(|c| c.key == item.correct_category_key)
                    {
                        issues.push(FormIssue::for_question(
                            IssueCode::DanglingCategoryKey,
                            &question.id,
                            format!(
                                "Item '{}' points at missing category '{}'",
                                item.id, item.correct_category_key
                            ),
                        ));
                    }
                }
            }
            QuestionSettings::Cloze(s) => {
                let mut keys = HashSet::new();
                for blank in &s.blanks {
                    if !keys.insert(blank.key.as_str()) {
                        issues.push(FormIssue::for_question(
                            IssueCode::DuplicateBlankKey,
                            &question.id,
                            format!("Blank key '{}' is duplicated", blank.key),
                        ));
                    }
                }
                let markers: HashSet<String> = marker_keys(&s.text);
                for marker in &markers {
                    if !s.blanks.iter().any(|b| &b.key == marker) {
                        issues.push(FormIssue::for_question(
                            IssueCode::MarkerWithoutBlank,
                            &question.id,
                            format!("Marker __{marker}__ has no matching blank"),
                        ));
                    }
                }
                for blank in &s.blanks {
                    if !markers.contains(&blank.key) {
                        issues.push(FormIssue::for_question(
                            IssueCode::BlankWithoutMarker,
                            &question.id,
                            format!("Blank '{}' never appears in the text", blank.key),
                        ));
                    }
                }
            }
            QuestionSettings::Comprehension(s) => {
                let mut qids = HashSet::new();
                for sub in &s.questions {
                    if !qids.insert(sub.qid.as_str()) {
                        issues.push(FormIssue::for_question(
                            IssueCode::DuplicateSubQuestionId,
                            &question.id,
                            format!("Sub-question id '{}' is duplicated", sub.qid),
                        ));
                    }
                    if sub.kind == crate::models::form::SubQuestionKind::Mcq
                        && sub.options.is_empty()
                    {
                        issues.push(FormIssue::for_question(
                            IssueCode::McqWithoutOptions,
                            &question.id,
                            format!("Sub-question '{}' is mcq but has no options", sub.qid),
                        ));
                    }
                }
            }
        }
    }

    issues
}

fn marker_keys(text: &str) -> HashSet<String> {
    crate::render::BLANK_MARKER.captures_iter(text).map(|c| c[1].to_string()).collect()
}
