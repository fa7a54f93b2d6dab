//! Caller-supplied inputs and their conversion into stored rows.
//!
//! Inputs carry content only. Ids, parent references, and timestamps are
//! assigned by the service layer when an input becomes a row.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    ChoiceOneOption, ChoiceOneQuestion, Conversation, ConversationTurn, ErrorIdentification,
    FillInBlankAnswer, OpenParagraphPrompt, Question, RepetitionItem, SentenceTransformation,
};
use crate::enums::{QuestionType, VariantKind};
use crate::errors::CoreError;

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Trim entries, drop duplicates, keep first-occurrence order.
#[must_use]
pub fn normalize_topics(topics: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(topics.len());
    for t in topics {
        let t = t.trim().to_string();
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// NewQuestion
// ---------------------------------------------------------------------------

/// Parent fields of a question about to be created.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub topic: Vec<String>,
    pub instruction: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub max_time: u32,
}

impl NewQuestion {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an empty instruction, a zero
    /// `max_time`, or blank topic / image URL entries.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("instruction", &self.instruction)?;
        validate_max_time(self.max_time)?;
        validate_topics(&self.topic)?;
        validate_image_urls(&self.image_urls)
    }

    /// Build the stored parent row at version 1.
    #[must_use]
    pub fn into_question(self, id: Uuid, now: DateTime<Utc>) -> Question {
        Question {
            id,
            question_type: self.question_type,
            topic: normalize_topics(self.topic),
            instruction: self.instruction,
            image_urls: self.image_urls,
            max_time: self.max_time,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// # Errors
///
/// Returns `CoreError::Validation` when `max_time` is zero.
pub fn validate_max_time(max_time: u32) -> Result<(), CoreError> {
    if max_time == 0 {
        return Err(CoreError::Validation(
            "max_time must be a positive number of seconds".into(),
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns `CoreError::Validation` when any topic is blank.
pub fn validate_topics(topics: &[String]) -> Result<(), CoreError> {
    for t in topics {
        require("topic", t)?;
    }
    Ok(())
}

/// # Errors
///
/// Returns `CoreError::Validation` when any URL is blank.
pub fn validate_image_urls(urls: &[String]) -> Result<(), CoreError> {
    for u in urls {
        require("image_url", u)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// VariantInput
// ---------------------------------------------------------------------------

/// Content of one child row, tagged by the table it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantInput {
    FillInBlankAnswer {
        answer: String,
        explain: Option<String>,
    },
    ChoiceOneQuestion {
        question: String,
        explain: Option<String>,
    },
    ChoiceOneOption {
        option: String,
        #[serde(default)]
        is_correct: bool,
    },
    ErrorIdentification {
        error_sentence: String,
        error_word: String,
        correct_word: String,
        explain: Option<String>,
    },
    SentenceTransformation {
        original_sentence: String,
        beginning_word: Option<String>,
        expected_answer: String,
        explain: Option<String>,
    },
    WordRepetition {
        content: String,
        meaning: Option<String>,
    },
    PhraseRepetition {
        content: String,
        meaning: Option<String>,
    },
    ParagraphRepetition {
        content: String,
        meaning: Option<String>,
    },
    OpenParagraphPrompt {
        question: String,
        example_answer: Option<String>,
    },
    ConversationalRepetition {
        title: String,
        overview: Option<String>,
    },
    ConversationalRepetitionTurn {
        speaker: String,
        content: String,
        meaning: Option<String>,
    },
    ConversationalOpen {
        title: String,
        overview: Option<String>,
    },
}

impl VariantInput {
    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::FillInBlankAnswer { .. } => VariantKind::FillInBlankAnswer,
            Self::ChoiceOneQuestion { .. } => VariantKind::ChoiceOneQuestion,
            Self::ChoiceOneOption { .. } => VariantKind::ChoiceOneOption,
            Self::ErrorIdentification { .. } => VariantKind::ErrorIdentification,
            Self::SentenceTransformation { .. } => VariantKind::SentenceTransformation,
            Self::WordRepetition { .. } => VariantKind::WordRepetition,
            Self::PhraseRepetition { .. } => VariantKind::PhraseRepetition,
            Self::ParagraphRepetition { .. } => VariantKind::ParagraphRepetition,
            Self::OpenParagraphPrompt { .. } => VariantKind::OpenParagraphPrompt,
            Self::ConversationalRepetition { .. } => VariantKind::ConversationalRepetition,
            Self::ConversationalRepetitionTurn { .. } => VariantKind::ConversationalRepetitionTurn,
            Self::ConversationalOpen { .. } => VariantKind::ConversationalOpen,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` when a required text field is blank, or
    /// when an error-identification word does not occur in its sentence.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::FillInBlankAnswer { answer, .. } => require("answer", answer),
            Self::ChoiceOneQuestion { question, .. } | Self::OpenParagraphPrompt { question, .. } => {
                require("question", question)
            }
            Self::ChoiceOneOption { option, .. } => require("option", option),
            Self::ErrorIdentification {
                error_sentence,
                error_word,
                correct_word,
                ..
            } => {
                require("error_sentence", error_sentence)?;
                require("error_word", error_word)?;
                require("correct_word", correct_word)?;
                if !error_sentence.contains(error_word.trim()) {
                    return Err(CoreError::Validation(format!(
                        "error_word '{error_word}' does not occur in error_sentence"
                    )));
                }
                Ok(())
            }
            Self::SentenceTransformation {
                original_sentence,
                expected_answer,
                ..
            } => {
                require("original_sentence", original_sentence)?;
                require("expected_answer", expected_answer)
            }
            Self::WordRepetition { content, .. }
            | Self::PhraseRepetition { content, .. }
            | Self::ParagraphRepetition { content, .. } => require("content", content),
            Self::ConversationalRepetition { title, .. } | Self::ConversationalOpen { title, .. } => {
                require("title", title)
            }
            Self::ConversationalRepetitionTurn {
                speaker, content, ..
            } => {
                require("speaker", speaker)?;
                require("content", content)
            }
        }
    }

    /// Attach identity and timestamps, producing the row to store.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn into_row(
        self,
        id: Uuid,
        question_id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> VariantRow {
        let repetition = |content: String, meaning: Option<String>| RepetitionItem {
            id,
            question_id,
            content,
            meaning,
            created_at,
            updated_at,
        };
        let conversation = |title: String, overview: Option<String>| Conversation {
            id,
            question_id,
            title,
            overview,
            created_at,
            updated_at,
        };

        match self {
            Self::FillInBlankAnswer { answer, explain } => {
                VariantRow::FillInBlankAnswer(FillInBlankAnswer {
                    id,
                    question_id,
                    answer,
                    explain,
                    created_at,
                    updated_at,
                })
            }
            Self::ChoiceOneQuestion { question, explain } => {
                VariantRow::ChoiceOneQuestion(ChoiceOneQuestion {
                    id,
                    question_id,
                    question,
                    explain,
                    created_at,
                    updated_at,
                })
            }
            Self::ChoiceOneOption { option, is_correct } => {
                VariantRow::ChoiceOneOption(ChoiceOneOption {
                    id,
                    question_id,
                    option,
                    is_correct,
                    created_at,
                    updated_at,
                })
            }
            Self::ErrorIdentification {
                error_sentence,
                error_word,
                correct_word,
                explain,
            } => VariantRow::ErrorIdentification(ErrorIdentification {
                id,
                question_id,
                error_sentence,
                error_word,
                correct_word,
                explain,
                created_at,
                updated_at,
            }),
            Self::SentenceTransformation {
                original_sentence,
                beginning_word,
                expected_answer,
                explain,
            } => VariantRow::SentenceTransformation(SentenceTransformation {
                id,
                question_id,
                original_sentence,
                beginning_word,
                expected_answer,
                explain,
                created_at,
                updated_at,
            }),
            Self::WordRepetition { content, meaning } => {
                VariantRow::WordRepetition(repetition(content, meaning))
            }
            Self::PhraseRepetition { content, meaning } => {
                VariantRow::PhraseRepetition(repetition(content, meaning))
            }
            Self::ParagraphRepetition { content, meaning } => {
                VariantRow::ParagraphRepetition(repetition(content, meaning))
            }
            Self::OpenParagraphPrompt {
                question,
                example_answer,
            } => VariantRow::OpenParagraphPrompt(OpenParagraphPrompt {
                id,
                question_id,
                question,
                example_answer,
                created_at,
                updated_at,
            }),
            Self::ConversationalRepetition { title, overview } => {
                VariantRow::ConversationalRepetition(conversation(title, overview))
            }
            Self::ConversationalRepetitionTurn {
                speaker,
                content,
                meaning,
            } => VariantRow::ConversationalRepetitionTurn(ConversationTurn {
                id,
                question_id,
                speaker,
                content,
                meaning,
                created_at,
                updated_at,
            }),
            Self::ConversationalOpen { title, overview } => {
                VariantRow::ConversationalOpen(conversation(title, overview))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// VariantRow
// ---------------------------------------------------------------------------

/// A stored child row of any variant table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", content = "row", rename_all = "snake_case")]
pub enum VariantRow {
    FillInBlankAnswer(FillInBlankAnswer),
    ChoiceOneQuestion(ChoiceOneQuestion),
    ChoiceOneOption(ChoiceOneOption),
    ErrorIdentification(ErrorIdentification),
    SentenceTransformation(SentenceTransformation),
    WordRepetition(RepetitionItem),
    PhraseRepetition(RepetitionItem),
    ParagraphRepetition(RepetitionItem),
    OpenParagraphPrompt(OpenParagraphPrompt),
    ConversationalRepetition(Conversation),
    ConversationalRepetitionTurn(ConversationTurn),
    ConversationalOpen(Conversation),
}

impl VariantRow {
    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::FillInBlankAnswer(_) => VariantKind::FillInBlankAnswer,
            Self::ChoiceOneQuestion(_) => VariantKind::ChoiceOneQuestion,
            Self::ChoiceOneOption(_) => VariantKind::ChoiceOneOption,
            Self::ErrorIdentification(_) => VariantKind::ErrorIdentification,
            Self::SentenceTransformation(_) => VariantKind::SentenceTransformation,
            Self::WordRepetition(_) => VariantKind::WordRepetition,
            Self::PhraseRepetition(_) => VariantKind::PhraseRepetition,
            Self::ParagraphRepetition(_) => VariantKind::ParagraphRepetition,
            Self::OpenParagraphPrompt(_) => VariantKind::OpenParagraphPrompt,
            Self::ConversationalRepetition(_) => VariantKind::ConversationalRepetition,
            Self::ConversationalRepetitionTurn(_) => VariantKind::ConversationalRepetitionTurn,
            Self::ConversationalOpen(_) => VariantKind::ConversationalOpen,
        }
    }

    /// `(id, question_id, created_at)` of the wrapped row.
    #[must_use]
    pub const fn identity(&self) -> (Uuid, Uuid, DateTime<Utc>) {
        match self {
            Self::FillInBlankAnswer(r) => (r.id, r.question_id, r.created_at),
            Self::ChoiceOneQuestion(r) => (r.id, r.question_id, r.created_at),
            Self::ChoiceOneOption(r) => (r.id, r.question_id, r.created_at),
            Self::ErrorIdentification(r) => (r.id, r.question_id, r.created_at),
            Self::SentenceTransformation(r) => (r.id, r.question_id, r.created_at),
            Self::WordRepetition(r) | Self::PhraseRepetition(r) | Self::ParagraphRepetition(r) => {
                (r.id, r.question_id, r.created_at)
            }
            Self::OpenParagraphPrompt(r) => (r.id, r.question_id, r.created_at),
            Self::ConversationalRepetition(r) | Self::ConversationalOpen(r) => {
                (r.id, r.question_id, r.created_at)
            }
            Self::ConversationalRepetitionTurn(r) => (r.id, r.question_id, r.created_at),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.identity().0
    }

    #[must_use]
    pub const fn question_id(&self) -> Uuid {
        self.identity().1
    }
}
