// src/editor.rs
//
// Mutations of a form aggregate in response to editing gestures. Every
// operation applies atomically in memory and returns whether it changed
// anything: operations addressing a missing question, a missing entry, or
// an out-of-range index degrade to a no-op instead of erroring. Nested
// entries are addressed by their stable key (category key, item id, blank
// key, sub-question qid), resolved to a position only at apply time.

use serde::Deserialize;
use uuid::Uuid;

use crate::models::form::{
    CategorizeItem, Category, ClozeBlank, Form, Question, QuestionSettings, QuestionType,
    SubQuestion, SubQuestionKind, Theme,
};

/// Shallow merge onto a question envelope's top-level fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub required: Option<bool>,
}

/// Shallow merge onto the form's own metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub header_image_url: Option<String>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    /// Renames the category key. Rejected when the new key is already
    /// taken by a sibling.
    pub key: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    /// Renames the item id. Rejected when already taken by a sibling.
    pub id: Option<String>,
    pub label: Option<String>,
    /// Free text, not checked against the category list.
    pub correct_category_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlankPatch {
    /// Renames the blank key. Rejected when already taken by a sibling.
    pub key: Option<String>,
    pub answer: Option<String>,
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestionPatch {
    pub question_text: Option<String>,
    pub kind: Option<SubQuestionKind>,
    pub answer: Option<String>,
}

/// One editing gesture, serializable so the editing surface can batch
/// them over `PATCH /api/forms/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditOp {
    UpdateForm { patch: FormPatch },
    AddQuestion { question_type: QuestionType },
    RemoveQuestion { question_id: String },
    UpdateQuestion { question_id: String, patch: QuestionPatch },
    ChangeQuestionType { question_id: String, question_type: QuestionType },
    ReorderQuestions { from: usize, to: usize },

    SetClozeText { question_id: String, text: String },
    SetPassage { question_id: String, passage: String },

    AddCategory { question_id: String },
    UpdateCategory { question_id: String, key: String, patch: CategoryPatch },
    RemoveCategory { question_id: String, key: String },
    ReorderCategories { question_id: String, from: usize, to: usize },

    AddItem { question_id: String },
    UpdateItem { question_id: String, id: String, patch: ItemPatch },
    RemoveItem { question_id: String, id: String },
    ReorderItems { question_id: String, from: usize, to: usize },

    AddBlank { question_id: String },
    UpdateBlank { question_id: String, key: String, patch: BlankPatch },
    RemoveBlank { question_id: String, key: String },
    ReorderBlanks { question_id: String, from: usize, to: usize },

    AddSubQuestion { question_id: String },
    UpdateSubQuestion { question_id: String, qid: String, patch: SubQuestionPatch },
    RemoveSubQuestion { question_id: String, qid: String },
    ReorderSubQuestions { question_id: String, from: usize, to: usize },

    AddOption { question_id: String, qid: String },
    UpdateOption { question_id: String, qid: String, index: usize, value: String },
    RemoveOption { question_id: String, qid: String, index: usize },
}

impl EditOp {
    /// Applies the gesture to `form`. Returns whether anything changed.
    pub fn apply(self, form: &mut Form) -> bool {
        match self {
            Self::UpdateForm { patch } => form.update_meta(patch),
            Self::AddQuestion { question_type } => {
                form.add_question(question_type);
                true
            }
            Self::RemoveQuestion { question_id } => form.remove_question(&question_id),
            Self::UpdateQuestion { question_id, patch } => {
                form.update_question(&question_id, patch)
            }
            Self::ChangeQuestionType { question_id, question_type } => {
                form.change_question_type(&question_id, question_type)
            }
            Self::ReorderQuestions { from, to } => form.reorder_questions(from, to),

            Self::SetClozeText { question_id, text } => form.set_cloze_text(&question_id, text),
            Self::SetPassage { question_id, passage } => form.set_passage(&question_id, passage),

            Self::AddCategory { question_id } => form.add_category(&question_id),
            Self::UpdateCategory { question_id, key, patch } => {
                form.update_category(&question_id, &key, patch)
            }
            Self::RemoveCategory { question_id, key } => form.remove_category(&question_id, &key),
            Self::ReorderCategories { question_id, from, to } => {
                form.reorder_categories(&question_id, from, to)
            }

            Self::AddItem { question_id } => form.add_item(&question_id),
            Self::UpdateItem { question_id, id, patch } => {
                form.update_item(&question_id, &id, patch)
            }
            Self::RemoveItem { question_id, id } => form.remove_item(&question_id, &id),
            Self::ReorderItems { question_id, from, to } => {
                form.reorder_items(&question_id, from, to)
            }

            Self::AddBlank { question_id } => form.add_blank(&question_id),
            Self::UpdateBlank { question_id, key, patch } => {
                form.update_blank(&question_id, &key, patch)
            }
            Self::RemoveBlank { question_id, key } => form.remove_blank(&question_id, &key),
            Self::ReorderBlanks { question_id, from, to } => {
                form.reorder_blanks(&question_id, from, to)
            }

            Self::AddSubQuestion { question_id } => form.add_sub_question(&question_id),
            Self::UpdateSubQuestion { question_id, qid, patch } => {
                form.update_sub_question(&question_id, &qid, patch)
            }
            Self::RemoveSubQuestion { question_id, qid } => {
                form.remove_sub_question(&question_id, &qid)
            }
            Self::ReorderSubQuestions { question_id, from, to } => {
                form.reorder_sub_questions(&question_id, from, to)
            }

            Self::AddOption { question_id, qid } => form.add_option(&question_id, &qid),
            Self::UpdateOption { question_id, qid, index, value } => {
                form.update_option(&question_id, &qid, index, value)
            }
            Self::RemoveOption { question_id, qid, index } => {
                form.remove_option(&question_id, &qid, index)
            }
        }
    }
}

/// Applies a batch of gestures in order, returning how many changed the
/// form.
pub fn apply_all(form: &mut Form, ops: impl IntoIterator<Item = EditOp>) -> usize {
    let mut applied = 0;
    for op in ops {
        if op.apply(form) {
            applied += 1;
        }
    }
    applied
}

/// Splice-remove then reinsert. No-op for out-of-range indices or a drag
/// without a destination change.
fn move_entry<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let entry = list.remove(from);
    list.insert(to, entry);
    true
}

/// Smallest `{prefix}{n}` with `n >= start` not already taken.
fn next_key(prefix: &str, start: usize, taken: impl Fn(&str) -> bool) -> String {
    let mut n = start;
    loop {
        let candidate = format!("{prefix}{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn merge<T>(target: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *target = v;
            true
        }
        None => false,
    }
}

impl Form {
    fn question_mut(&mut self, id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }

    /// Re-derives every `order` field from sequence position.
    fn resync_orders(&mut self) {
        for (index, question) in self.questions.iter_mut().enumerate() {
            question.order = index as u32 + 1;
        }
    }

    pub fn update_meta(&mut self, patch: FormPatch) -> bool {
        let mut changed = false;
        changed |= merge(&mut self.title, patch.title);
        changed |= merge(&mut self.description, patch.description);
        changed |= merge(&mut self.header_image_url, patch.header_image_url);
        changed |= merge(&mut self.theme, patch.theme);
        changed
    }

    /// Appends a new question with a fresh id and default settings.
    /// Returns the generated id.
    pub fn add_question(&mut self, question_type: QuestionType) -> String {
        let question = Question::new(question_type);
        let id = question.id.clone();
        self.questions.push(question);
        self.resync_orders();
        id
    }

    pub fn remove_question(&mut self, id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != id);
        let changed = self.questions.len() != before;
        if changed {
            self.resync_orders();
        }
        changed
    }

    pub fn update_question(&mut self, id: &str, patch: QuestionPatch) -> bool {
        let Some(question) = self.question_mut(id) else { return false };
        let mut changed = false;
        changed |= merge(&mut question.title, patch.title);
        changed |= merge(&mut question.prompt, patch.prompt);
        changed |= merge(&mut question.image_url, patch.image_url);
        changed |= merge(&mut question.required, patch.required);
        changed
    }

    /// Discards the old settings and installs the new type's defaults.
    pub fn change_question_type(&mut self, id: &str, question_type: QuestionType) -> bool {
        let Some(question) = self.question_mut(id) else { return false };
        if question.question_type == question_type {
            return false;
        }
        question.question_type = question_type;
        question.settings = QuestionSettings::default_for(question_type);
        true
    }

    pub fn reorder_questions(&mut self, from: usize, to: usize) -> bool {
        let changed = move_entry(&mut self.questions, from, to);
        if changed {
            self.resync_orders();
        }
        changed
    }

    fn categorize_mut(
        &mut self,
        question_id: &str,
    ) -> Option<(&mut Vec<Category>, &mut Vec<CategorizeItem>)> {
        match &mut self.question_mut(question_id)?.settings {
            QuestionSettings::Categorize(s) => Some((&mut s.categories, &mut s.items)),
            _ => None,
        }
    }

    fn cloze_mut(&mut self, question_id: &str) -> Option<&mut crate::models::form::ClozeSettings> {
        match &mut self.question_mut(question_id)?.settings {
            QuestionSettings::Cloze(s) => Some(s),
            _ => None,
        }
    }

    fn comprehension_mut(
        &mut self,
        question_id: &str,
    ) -> Option<&mut crate::models::form::ComprehensionSettings> {
        match &mut self.question_mut(question_id)?.settings {
            QuestionSettings::Comprehension(s) => Some(s),
            _ => None,
        }
    }

    pub fn add_category(&mut self, question_id: &str) -> bool {
        let Some((categories, _)) = self.categorize_mut(question_id) else { return false };
        let key = next_key("cat", categories.len() + 1, |k| {
            categories.iter().any(|c| c.key == k)
        });
        categories.push(Category { key, label: "New Category".into() });
        true
    }

    pub fn update_category(&mut self, question_id: &str, key: &str, patch: CategoryPatch) -> bool {
        let Some((categories, _)) = self.categorize_mut(question_id) else { return false };
        if let Some(new_key) = &patch.key {
            if new_key != key && categories.iter().any(|c| c.key == *new_key) {
                return false;
            }
        }
        let Some(category) = categories.iter_mut().find(|c| c.key == key) else { return false };
        let mut changed = false;
        changed |= merge(&mut category.key, patch.key);
        changed |= merge(&mut category.label, patch.label);
        changed
    }

    /// Items pointing at the removed key are left dangling; the audit
    /// reports them.
    pub fn remove_category(&mut self, question_id: &str, key: &str) -> bool {
        let Some((categories, _)) = self.categorize_mut(question_id) else { return false };
        let before = categories.len();
        categories.retain(|c| c.key != key);
        categories.len() != before
    }

    pub fn reorder_categories(&mut self, question_id: &str, from: usize, to: usize) -> bool {
        let Some((categories, _)) = self.categorize_mut(question_id) else { return false };
        move_entry(categories, from, to)
    }

    pub fn add_item(&mut self, question_id: &str) -> bool {
        let Some((categories, items)) = self.categorize_mut(question_id) else { return false };
        let id = next_key("i", items.len() + 1, |k| items.iter().any(|i| i.id == k));
        let correct_category_key = categories.first().map(|c| c.key.clone()).unwrap_or_default();
        items.push(CategorizeItem { id, label: "New Item".into(), correct_category_key });
        true
    }

    pub fn update_item(&mut self, question_id: &str, id: &str, patch: ItemPatch) -> bool {
        let Some((_, items)) = self.categorize_mut(question_id) else { return false };
        if let Some(new_id) = &patch.id {
            if new_id != id && items.iter().any(|i| i.id == *new_id) {
                return false;
            }
        }
        let Some(item) = items.iter_mut().find(|i| i.id == id) else { return false };
        let mut changed = false;
        changed |= merge(&mut item.id, patch.id);
        changed |= merge(&mut item.label, patch.label);
        changed |= merge(&mut item.correct_category_key, patch.correct_category_key);
        changed
    }

    pub fn remove_item(&mut self, question_id: &str, id: &str) -> bool {
        let Some((_, items)) = self.categorize_mut(question_id) else { return false };
        let before = items.len();
        items.retain(|i| i.id != id);
        items.len() != before
    }

    pub fn reorder_items(&mut self, question_id: &str, from: usize, to: usize) -> bool {
        let Some((_, items)) = self.categorize_mut(question_id) else { return false };
        move_entry(items, from, to)
    }

    pub fn set_cloze_text(&mut self, question_id: &str, text: String) -> bool {
        let Some(cloze) = self.cloze_mut(question_id) else { return false };
        cloze.text = text;
        true
    }

    pub fn add_blank(&mut self, question_id: &str) -> bool {
        let Some(cloze) = self.cloze_mut(question_id) else { return false };
        let key = next_key("", cloze.blanks.len() + 1, |k| {
            cloze.blanks.iter().any(|b| b.key == k)
        });
        cloze.blanks.push(ClozeBlank { key, answer: String::new(), options: Vec::new() });
        true
    }

    pub fn update_blank(&mut self, question_id: &str, key: &str, patch: BlankPatch) -> bool {
        let Some(cloze) = self.cloze_mut(question_id) else { return false };
        if let Some(new_key) = &patch.key {
            if new_key != key && cloze.blanks.iter().any(|b| b.key == *new_key) {
                return false;
            }
        }
        let Some(blank) = cloze.blanks.iter_mut().find(|b| b.key == key) else { return false };
        let mut changed = false;
        changed |= merge(&mut blank.key, patch.key);
        changed |= merge(&mut blank.answer, patch.answer);
        changed |= merge(&mut blank.options, patch.options);
        changed
    }

    pub fn remove_blank(&mut self, question_id: &str, key: &str) -> bool {
        let Some(cloze) = self.cloze_mut(question_id) else { return false };
        let before = cloze.blanks.len();
        cloze.blanks.retain(|b| b.key != key);
        cloze.blanks.len() != before
    }

    pub fn reorder_blanks(&mut self, question_id: &str, from: usize, to: usize) -> bool {
        let Some(cloze) = self.cloze_mut(question_id) else { return false };
        move_entry(&mut cloze.blanks, from, to)
    }

    pub fn set_passage(&mut self, question_id: &str, passage: String) -> bool {
        let Some(comprehension) = self.comprehension_mut(question_id) else { return false };
        comprehension.passage = passage;
        true
    }

    pub fn add_sub_question(&mut self, question_id: &str) -> bool {
        let Some(comprehension) = self.comprehension_mut(question_id) else { return false };
        comprehension.questions.push(SubQuestion {
            qid: Uuid::new_v4().to_string(),
            question_text: "New question".into(),
            kind: SubQuestionKind::Mcq,
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: Some(String::new()),
        });
        true
    }

    pub fn update_sub_question(
        &mut self,
        question_id: &str,
        qid: &str,
        patch: SubQuestionPatch,
    ) -> bool {
        let Some(comprehension) = self.comprehension_mut(question_id) else { return false };
        let Some(sub) = comprehension.questions.iter_mut().find(|s| s.qid == qid) else {
            return false;
        };
        let mut changed = false;
        changed |= merge(&mut sub.question_text, patch.question_text);
        changed |= merge(&mut sub.kind, patch.kind);
        if let Some(answer) = patch.answer {
            sub.answer = Some(answer);
            changed = true;
        }
        changed
    }

    pub fn remove_sub_question(&mut self, question_id: &str, qid: &str) -> bool {
        let Some(comprehension) = self.comprehension_mut(question_id) else { return false };
        let before = comprehension.questions.len();
        comprehension.questions.retain(|s| s.qid != qid);
        comprehension.questions.len() != before
    }

    pub fn reorder_sub_questions(&mut self, question_id: &str, from: usize, to: usize) -> bool {
        let Some(comprehension) = self.comprehension_mut(question_id) else { return false };
        move_entry(&mut comprehension.questions, from, to)
    }

    fn sub_question_mut(&mut self, question_id: &str, qid: &str) -> Option<&mut SubQuestion> {
        self.comprehension_mut(question_id)?.questions.iter_mut().find(|s| s.qid == qid)
    }

    pub fn add_option(&mut self, question_id: &str, qid: &str) -> bool {
        let Some(sub) = self.sub_question_mut(question_id, qid) else { return false };
        sub.options.push("New option".into());
        true
    }

    pub fn update_option(
        &mut self,
        question_id: &str,
        qid: &str,
        index: usize,
        value: String,
    ) -> bool {
        let Some(sub) = self.sub_question_mut(question_id, qid) else { return false };
        match sub.options.get_mut(index) {
            Some(option) => {
                *option = value;
                true
            }
            None => false,
        }
    }

    pub fn remove_option(&mut self, question_id: &str, qid: &str, index: usize) -> bool {
        let Some(sub) = self.sub_question_mut(question_id, qid) else { return false };
        if index >= sub.options.len() {
            return false;
        }
        sub.options.remove(index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_entry_splices() {
        let mut list = vec!['a', 'b', 'c', 'd'];
        assert!(move_entry(&mut list, 0, 2));
        assert_eq!(list, vec!['b', 'c', 'a', 'd']);
    }

    #[test]
    fn test_move_entry_rejects_out_of_range() {
        let mut list = vec![1, 2, 3];
        assert!(!move_entry(&mut list, 0, 3));
        assert!(!move_entry(&mut list, 5, 0));
        assert!(!move_entry(&mut list, 1, 1));
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn test_next_key_skips_taken() {
        let taken = ["cat3", "cat4"];
        let key = next_key("cat", 3, |k| taken.contains(&k));
        assert_eq!(key, "cat5");
    }

    #[test]
    fn test_rename_to_sibling_key_is_rejected() {
        let mut form = Form::from_draft(
            Uuid::new_v4(),
            crate::models::form::FormDraft {
                title: "t".into(),
                description: String::new(),
                header_image_url: String::new(),
                theme: Default::default(),
                questions: Vec::new(),
            },
            chrono::Utc::now(),
        );
        let id = form.add_question(QuestionType::Categorize);
        let patch = CategoryPatch { key: Some("cat2".into()), label: None };
        assert!(!form.update_category(&id, "cat1", patch));
        // Renaming to itself while editing the label still lands.
        let patch = CategoryPatch { key: Some("cat1".into()), label: Some("First".into()) };
        assert!(form.update_category(&id, "cat1", patch));
    }
}
