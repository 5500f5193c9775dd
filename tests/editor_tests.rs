// tests/editor_tests.rs
//
// Library-level coverage of the aggregate transitions, the answer sheet
// and the renderer, without going through HTTP.

use chrono::Utc;
use uuid::Uuid;

use formbuilder::editor::{CategoryPatch, EditOp, ItemPatch, QuestionPatch, apply_all};
use formbuilder::models::form::{
    ClozeBlank, ClozeSettings, Form, FormDraft, Question, QuestionSettings, QuestionType,
};
use formbuilder::models::response::AnswerSheet;
use formbuilder::render::{ClozeSegment, RenderedBody, render_question};

fn empty_form(title: &str) -> Form {
    Form::from_draft(
        Uuid::new_v4(),
        FormDraft {
            title: title.into(),
            description: String::new(),
            header_image_url: String::new(),
            theme: Default::default(),
            questions: Vec::new(),
        },
        Utc::now(),
    )
}

fn form_with_questions(count: usize) -> Form {
    let mut form = empty_form("Test");
    for _ in 0..count {
        form.add_question(QuestionType::Categorize);
    }
    form
}

#[test]
fn add_question_generates_fresh_id_and_appends() {
    let mut form = form_with_questions(3);
    let existing: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();

    let new_id = form.add_question(QuestionType::Cloze);

    assert!(!existing.contains(&new_id));
    assert_eq!(form.questions.len(), 4);
    assert_eq!(form.questions.last().unwrap().id, new_id);
    // Order fields track sequence position
    let orders: Vec<u32> = form.questions.iter().map(|q| q.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);
}

#[test]
fn remove_question_by_id_then_lookup_misses() {
    let mut form = form_with_questions(3);
    let victim = form.questions[1].id.clone();

    assert!(form.remove_question(&victim));

    assert_eq!(form.questions.len(), 2);
    assert!(!form.questions.iter().any(|q| q.id == victim));
}

#[test]
fn remove_missing_id_is_a_silent_noop() {
    let mut form = form_with_questions(3);
    let before: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();

    assert!(!form.remove_question("nope"));

    let after: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn reorder_matches_splice_reference_for_all_valid_pairs() {
    let size = 4;
    for from in 0..size {
        for to in 0..size {
            let mut form = form_with_questions(size);
            let mut reference: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();

            form.reorder_questions(from, to);

            if from != to {
                let moved = reference.remove(from);
                reference.insert(to, moved);
            }
            let actual: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();
            assert_eq!(actual, reference, "reorder({from}, {to})");

            // The multiset is preserved: same ids, same count
            let mut sorted_actual = actual.clone();
            sorted_actual.sort();
            let mut sorted_reference = reference.clone();
            sorted_reference.sort();
            assert_eq!(sorted_actual, sorted_reference);
        }
    }
}

#[test]
fn reorder_out_of_range_is_a_noop() {
    let mut form = form_with_questions(3);
    let before: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();

    assert!(!form.reorder_questions(0, 3));
    assert!(!form.reorder_questions(7, 1));

    let after: Vec<String> = form.questions.iter().map(|q| q.id.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn update_question_merges_only_present_fields() {
    let mut form = form_with_questions(1);
    let id = form.questions[0].id.clone();

    let changed = form.update_question(
        &id,
        QuestionPatch { title: Some("Sort these".into()), ..Default::default() },
    );

    assert!(changed);
    assert_eq!(form.questions[0].title, "Sort these");
    assert_eq!(form.questions[0].prompt, "");
    assert!(form.questions[0].required);
}

#[test]
fn change_question_type_installs_fresh_defaults() {
    let mut form = form_with_questions(1);
    let id = form.questions[0].id.clone();

    assert!(form.change_question_type(&id, QuestionType::Comprehension));

    let question = &form.questions[0];
    assert_eq!(question.question_type, QuestionType::Comprehension);
    match &question.settings {
        QuestionSettings::Comprehension(s) => assert_eq!(s.questions.len(), 1),
        other => panic!("settings were not replaced: {other:?}"),
    }
    // Same type again: nothing to do
    assert!(!form.change_question_type(&id, QuestionType::Comprehension));
}

#[test]
fn generated_nested_keys_skip_collisions() {
    let mut form = empty_form("Test");
    let id = form.add_question(QuestionType::Categorize);

    // Defaults are cat1/cat2; two appends continue the numbering
    assert!(form.add_category(&id));
    assert!(form.add_category(&id));

    match &form.questions[0].settings {
        QuestionSettings::Categorize(s) => {
            let keys: Vec<&str> = s.categories.iter().map(|c| c.key.as_str()).collect();
            assert_eq!(keys, vec!["cat1", "cat2", "cat3", "cat4"]);
        }
        other => panic!("unexpected settings: {other:?}"),
    }
}

#[test]
fn nested_edits_land_by_stable_key_after_reorder() {
    let mut form = empty_form("Test");
    let id = form.add_question(QuestionType::Categorize);

    // Swap the two default categories, then edit "cat1": the edit must
    // follow the key, not the old position.
    assert!(form.reorder_categories(&id, 0, 1));
    assert!(form.update_category(
        &id,
        "cat1",
        CategoryPatch { key: None, label: Some("First".into()) },
    ));

    match &form.questions[0].settings {
        QuestionSettings::Categorize(s) => {
            assert_eq!(s.categories[0].key, "cat2");
            assert_eq!(s.categories[1].key, "cat1");
            assert_eq!(s.categories[1].label, "First");
        }
        other => panic!("unexpected settings: {other:?}"),
    }
}

#[test]
fn item_id_rename_to_sibling_is_rejected() {
    let mut form = empty_form("Test");
    let id = form.add_question(QuestionType::Categorize);
    assert!(form.add_item(&id)); // i1 exists by default, this adds i2

    let rejected = form.update_item(
        &id,
        "i2",
        ItemPatch { id: Some("i1".into()), ..Default::default() },
    );

    assert!(!rejected);
    match &form.questions[0].settings {
        QuestionSettings::Categorize(s) => {
            let ids: Vec<&str> = s.items.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, vec!["i1", "i2"]);
        }
        other => panic!("unexpected settings: {other:?}"),
    }
}

#[test]
fn apply_all_counts_only_effective_ops() {
    let mut form = empty_form("Test");
    let id = form.add_question(QuestionType::Cloze);

    let applied = apply_all(
        &mut form,
        vec![
            EditOp::SetClozeText { question_id: id.clone(), text: "A __1__".into() },
            EditOp::RemoveQuestion { question_id: "missing".into() },
            EditOp::SetPassage { question_id: id, passage: "wrong variant".into() },
        ],
    );

    assert_eq!(applied, 1);
}

#[test]
fn cloze_render_interleaves_literals_and_keyed_inputs() {
    let question = Question {
        settings: QuestionSettings::Cloze(ClozeSettings {
            text: "The __1__ rises in the __2__.".into(),
            blanks: vec![
                ClozeBlank { key: "1".into(), answer: "sun".into(), options: Vec::new() },
                ClozeBlank { key: "2".into(), answer: "east".into(), options: Vec::new() },
            ],
        }),
        ..Question::new(QuestionType::Cloze)
    };

    let rendered = render_question(&question, None);

    let RenderedBody::Cloze { segments } = rendered.body else {
        panic!("expected a cloze body");
    };
    assert_eq!(
        segments,
        vec![
            ClozeSegment::Text("The ".into()),
            ClozeSegment::Input { key: "1".into(), value: None, options: Vec::new() },
            ClozeSegment::Text(" rises in the ".into()),
            ClozeSegment::Input { key: "2".into(), value: None, options: Vec::new() },
            ClozeSegment::Text(".".into()),
        ]
    );
}

#[test]
fn orphan_blanks_are_never_rendered() {
    let question = Question {
        settings: QuestionSettings::Cloze(ClozeSettings {
            text: "Just __1__ here".into(),
            blanks: vec![
                ClozeBlank { key: "1".into(), answer: "one".into(), options: Vec::new() },
                ClozeBlank { key: "9".into(), answer: "orphan".into(), options: Vec::new() },
            ],
        }),
        ..Question::new(QuestionType::Cloze)
    };

    let rendered = render_question(&question, None);

    let RenderedBody::Cloze { segments } = rendered.body else {
        panic!("expected a cloze body");
    };
    let inputs: Vec<&str> = segments
        .iter()
        .filter_map(|s| match s {
            ClozeSegment::Input { key, .. } => Some(key.as_str()),
            ClozeSegment::Text(_) => None,
        })
        .collect();
    assert_eq!(inputs, vec!["1"]);
}

#[test]
fn recording_twice_overwrites_instead_of_appending() {
    let mut sheet = AnswerSheet::new();

    sheet.record("q1", "i1", "cat2");
    sheet.record("q1", "i1", "cat1");

    let answers = sheet.answers_for("q1").unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.get("i1").map(String::as_str), Some("cat1"));
}

#[test]
fn form_serialization_round_trips_identically() {
    let mut form = empty_form("Everything");
    form.description = "One of each variant".into();
    form.header_image_url = "/uploads/header.png".into();

    let cat_id = form.add_question(QuestionType::Categorize);
    form.update_question(&cat_id, QuestionPatch { title: Some("Sort".into()), ..Default::default() });
    let cloze_id = form.add_question(QuestionType::Cloze);
    form.set_cloze_text(&cloze_id, "Fill __1__ and __2__".into());
    let comp_id = form.add_question(QuestionType::Comprehension);
    form.set_passage(&comp_id, "A short passage.".into());

    let first = serde_json::to_string(&form).unwrap();
    let reparsed: Form = serde_json::from_str(&first).unwrap();
    let second = serde_json::to_string(&reparsed).unwrap();

    assert_eq!(first, second);
    assert_eq!(form, reparsed);
}
