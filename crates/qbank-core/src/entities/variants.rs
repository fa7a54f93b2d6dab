//! Child records for every variant table.
//!
//! Every record references its parent question through `question_id`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One accepted answer of a fill-in-blank question.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FillInBlankAnswer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub answer: String,
    pub explain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stem of a choice-one question. At most one per parent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChoiceOneQuestion {
    pub id: Uuid,
    pub question_id: Uuid,
    pub question: String,
    pub explain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One option of a choice-one question. At most one option per parent is correct.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChoiceOneOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub option: String,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorIdentification {
    pub id: Uuid,
    pub question_id: Uuid,
    pub error_sentence: String,
    pub error_word: String,
    pub correct_word: String,
    pub explain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SentenceTransformation {
    pub id: Uuid,
    pub question_id: Uuid,
    pub original_sentence: String,
    pub beginning_word: Option<String>,
    pub expected_answer: String,
    pub explain: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A word, phrase, or paragraph to repeat. Shared by the three repetition tables.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RepetitionItem {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
    pub meaning: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OpenParagraphPrompt {
    pub id: Uuid,
    pub question_id: Uuid,
    pub question: String,
    pub example_answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversation header. Singleton for both conversational question types.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Conversation {
    pub id: Uuid,
    pub question_id: Uuid,
    pub title: String,
    pub overview: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a conversational-repetition dialogue.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub question_id: Uuid,
    pub speaker: String,
    pub content: String,
    pub meaning: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
