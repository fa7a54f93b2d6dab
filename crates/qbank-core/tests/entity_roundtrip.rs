//! Serde roundtrip and JsonSchema validation tests for entity and aggregate types.

use chrono::Utc;
use qbank_core::aggregate::{KnownVersion, QuestionDetail, VariantPayload};
use qbank_core::entities::*;
use qbank_core::enums::*;
use qbank_core::inputs::{NewQuestion, VariantInput};
use qbank_core::search::{SearchDocument, SearchFilter};
use schemars::schema_for;
use uuid::Uuid;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn question(question_type: QuestionType) -> Question {
    let now = Utc::now();
    Question {
        id: Uuid::new_v4(),
        question_type,
        topic: vec!["travel".into(), "past-simple".into()],
        instruction: "Choose the correct answer".into(),
        image_urls: vec!["https://cdn.example.com/q/1.png".into()],
        max_time: 60,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

fn choice_one_detail() -> QuestionDetail {
    let q = question(QuestionType::ChoiceOne);
    let now = Utc::now();
    let option = |text: &str, is_correct: bool| ChoiceOneOption {
        id: Uuid::new_v4(),
        question_id: q.id,
        option: text.into(),
        is_correct,
        created_at: now,
        updated_at: now,
    };
    QuestionDetail {
        payload: VariantPayload::ChoiceOne {
            question: Some(ChoiceOneQuestion {
                id: Uuid::new_v4(),
                question_id: q.id,
                question: "She ___ to school yesterday.".into(),
                explain: Some("Past simple".into()),
                created_at: now,
                updated_at: now,
            }),
            options: vec![option("go", false), option("went", true)],
        },
        question: q,
    }
}

roundtrip_and_validate!(
    question_roundtrip,
    Question,
    question(QuestionType::FillInBlank)
);

roundtrip_and_validate!(
    error_identification_roundtrip,
    ErrorIdentification,
    ErrorIdentification {
        id: Uuid::new_v4(),
        question_id: Uuid::new_v4(),
        error_sentence: "He don't like coffee.".into(),
        error_word: "don't".into(),
        correct_word: "doesn't".into(),
        explain: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    sentence_transformation_roundtrip,
    SentenceTransformation,
    SentenceTransformation {
        id: Uuid::new_v4(),
        question_id: Uuid::new_v4(),
        original_sentence: "They built this bridge in 1990.".into(),
        beginning_word: Some("This bridge".into()),
        expected_answer: "This bridge was built in 1990.".into(),
        explain: Some("Passive voice".into()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    conversation_turn_roundtrip,
    ConversationTurn,
    ConversationTurn {
        id: Uuid::new_v4(),
        question_id: Uuid::new_v4(),
        speaker: "Customer".into(),
        content: "Could I have the bill, please?".into(),
        meaning: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(choice_one_detail_roundtrip, QuestionDetail, choice_one_detail());

roundtrip_and_validate!(
    empty_detail_roundtrip,
    QuestionDetail,
    QuestionDetail {
        question: question(QuestionType::ConversationalRepetition),
        payload: VariantPayload::empty(QuestionType::ConversationalRepetition),
    }
);

roundtrip_and_validate!(
    known_version_roundtrip,
    KnownVersion,
    KnownVersion::new(Uuid::new_v4(), 4)
);

roundtrip_and_validate!(
    new_question_roundtrip,
    NewQuestion,
    NewQuestion {
        question_type: QuestionType::OpenParagraph,
        topic: vec!["hobbies".into()],
        instruction: "Talk about your favourite hobby".into(),
        image_urls: Vec::new(),
        max_time: 120,
    }
);

roundtrip_and_validate!(
    variant_input_roundtrip,
    VariantInput,
    VariantInput::SentenceTransformation {
        original_sentence: "I started learning English two years ago.".into(),
        beginning_word: Some("I have".into()),
        expected_answer: "I have been learning English for two years.".into(),
        explain: None,
    }
);

roundtrip_and_validate!(
    search_filter_roundtrip,
    SearchFilter,
    SearchFilter {
        text: Some("school".into()),
        question_type: Some(QuestionType::ChoiceOne),
        skill: Some(Skill::Grammar),
        status: Some(CompletionStatus::Complete),
        topic: Some("travel".into()),
        page: Some(2),
        page_size: Some(10),
    }
);

roundtrip_and_validate!(
    search_document_roundtrip,
    SearchDocument,
    SearchDocument::from_detail(&choice_one_detail(), CompletionStatus::Complete).unwrap()
);

#[test]
fn question_type_serializes_as_type() {
    let json = serde_json::to_value(question(QuestionType::WordRepetition)).unwrap();
    assert_eq!(json["type"], "word_repetition");
    assert!(json.get("question_type").is_none());
}
