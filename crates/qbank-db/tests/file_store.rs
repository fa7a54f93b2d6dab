//! File-backed store tests: state survives reopen, cascades, and per-type
//! variant wiring through the public API.

use pretty_assertions::assert_eq;
use qbank_core::enums::{QuestionType, VariantKind};
use qbank_core::inputs::{NewQuestion, VariantInput};
use qbank_db::QuestionDb;
use qbank_db::error::DatabaseError;
use rstest::rstest;

fn new_question(question_type: QuestionType) -> NewQuestion {
    NewQuestion {
        question_type,
        topic: vec!["travel".into()],
        instruction: "Practice".into(),
        image_urls: Vec::new(),
        max_time: 45,
    }
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("questions.db");
    let path = path.to_str().unwrap();

    let id = {
        let db = QuestionDb::open_local(path).await.unwrap();
        let q = db.create_question(new_question(QuestionType::WordRepetition)).await.unwrap();
        db.add_variant(
            q.id,
            VariantInput::WordRepetition {
                content: "suitcase".into(),
                meaning: None,
            },
            false,
        )
        .await
        .unwrap();
        q.id
    };

    let db = QuestionDb::open_local(path).await.unwrap();
    let detail = db.load_detail(id).await.unwrap();
    assert_eq!(detail.payload.item_count(), 1);
    assert_eq!(detail.version(), 1);
}

#[tokio::test]
async fn deleting_parent_cascades_children() {
    let db = QuestionDb::open_in_memory().await.unwrap();
    let q = db.create_question(new_question(QuestionType::FillInBlank)).await.unwrap();
    let change = db
        .add_variant(
            q.id,
            VariantInput::FillInBlankAnswer {
                answer: "went".into(),
                explain: None,
            },
            false,
        )
        .await
        .unwrap();

    db.delete_question(q.id).await.unwrap();

    let err = db
        .get_variant(VariantKind::FillInBlankAnswer, change.row.id())
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { .. }));
    assert!(matches!(
        db.load_detail(q.id).await.unwrap_err(),
        DatabaseError::NotFound { .. }
    ));
}

#[rstest]
#[case(QuestionType::PhraseRepetition, VariantInput::PhraseRepetition { content: "How are you?".into(), meaning: None })]
#[case(QuestionType::ParagraphRepetition, VariantInput::ParagraphRepetition { content: "I live in a small town.".into(), meaning: Some("Describing home".into()) })]
#[case(QuestionType::OpenParagraph, VariantInput::OpenParagraphPrompt { question: "Describe your weekend".into(), example_answer: None })]
#[case(QuestionType::SentenceTransformation, VariantInput::SentenceTransformation { original_sentence: "They built it.".into(), beginning_word: None, expected_answer: "It was built.".into(), explain: None })]
#[tokio::test]
async fn single_row_makes_type_complete(
    #[case] question_type: QuestionType,
    #[case] input: VariantInput,
) {
    let db = QuestionDb::open_in_memory().await.unwrap();
    let q = db.create_question(new_question(question_type)).await.unwrap();
    assert!(!qbank_core::completion::is_complete(&db.load_detail(q.id).await.unwrap()));

    db.add_variant(q.id, input, false).await.unwrap();

    let detail = db.load_detail(q.id).await.unwrap();
    assert!(qbank_core::completion::is_complete(&detail));
}
