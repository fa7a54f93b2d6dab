//! The assembled read view of a question: parent fields plus the variant payload.
//!
//! A `QuestionDetail` is never stored as its own row. It is rebuilt from the
//! relational store on every cache/search write and on cache miss.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    ChoiceOneOption, ChoiceOneQuestion, Conversation, ConversationTurn, ErrorIdentification,
    FillInBlankAnswer, OpenParagraphPrompt, Question, RepetitionItem, SentenceTransformation,
};
use crate::enums::QuestionType;

/// Type-specific child data of a question.
///
/// Singleton parts are `Option` (absent means "not authored yet", which is an
/// incomplete state, not an error). Multi-row parts are ordered by creation time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariantPayload {
    FillInBlank {
        answers: Vec<FillInBlankAnswer>,
    },
    ChoiceOne {
        question: Option<ChoiceOneQuestion>,
        options: Vec<ChoiceOneOption>,
    },
    ErrorIdentification {
        detail: Option<ErrorIdentification>,
    },
    SentenceTransformation {
        detail: Option<SentenceTransformation>,
    },
    WordRepetition {
        items: Vec<RepetitionItem>,
    },
    PhraseRepetition {
        items: Vec<RepetitionItem>,
    },
    ParagraphRepetition {
        items: Vec<RepetitionItem>,
    },
    OpenParagraph {
        prompts: Vec<OpenParagraphPrompt>,
    },
    ConversationalRepetition {
        conversation: Option<Conversation>,
        turns: Vec<ConversationTurn>,
    },
    ConversationalOpen {
        conversation: Option<Conversation>,
    },
}

impl VariantPayload {
    /// A payload with no child data for the given type.
    #[must_use]
    pub const fn empty(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::FillInBlank => Self::FillInBlank {
                answers: Vec::new(),
            },
            QuestionType::ChoiceOne => Self::ChoiceOne {
                question: None,
                options: Vec::new(),
            },
            QuestionType::ErrorIdentification => Self::ErrorIdentification { detail: None },
            QuestionType::SentenceTransformation => Self::SentenceTransformation { detail: None },
            QuestionType::WordRepetition => Self::WordRepetition { items: Vec::new() },
            QuestionType::PhraseRepetition => Self::PhraseRepetition { items: Vec::new() },
            QuestionType::ParagraphRepetition => Self::ParagraphRepetition { items: Vec::new() },
            QuestionType::OpenParagraph => Self::OpenParagraph {
                prompts: Vec::new(),
            },
            QuestionType::ConversationalRepetition => Self::ConversationalRepetition {
                conversation: None,
                turns: Vec::new(),
            },
            QuestionType::ConversationalOpen => Self::ConversationalOpen { conversation: None },
        }
    }

    #[must_use]
    pub const fn question_type(&self) -> QuestionType {
        match self {
            Self::FillInBlank { .. } => QuestionType::FillInBlank,
            Self::ChoiceOne { .. } => QuestionType::ChoiceOne,
            Self::ErrorIdentification { .. } => QuestionType::ErrorIdentification,
            Self::SentenceTransformation { .. } => QuestionType::SentenceTransformation,
            Self::WordRepetition { .. } => QuestionType::WordRepetition,
            Self::PhraseRepetition { .. } => QuestionType::PhraseRepetition,
            Self::ParagraphRepetition { .. } => QuestionType::ParagraphRepetition,
            Self::OpenParagraph { .. } => QuestionType::OpenParagraph,
            Self::ConversationalRepetition { .. } => QuestionType::ConversationalRepetition,
            Self::ConversationalOpen { .. } => QuestionType::ConversationalOpen,
        }
    }

    /// Whether the singleton part is present. `false` for types without one.
    #[must_use]
    pub const fn has_singleton(&self) -> bool {
        match self {
            Self::ChoiceOne { question, .. } => question.is_some(),
            Self::ErrorIdentification { detail } => detail.is_some(),
            Self::SentenceTransformation { detail } => detail.is_some(),
            Self::ConversationalRepetition { conversation, .. }
            | Self::ConversationalOpen { conversation } => conversation.is_some(),
            Self::FillInBlank { .. }
            | Self::WordRepetition { .. }
            | Self::PhraseRepetition { .. }
            | Self::ParagraphRepetition { .. }
            | Self::OpenParagraph { .. } => false,
        }
    }

    /// Number of rows in the multi-row part. `0` for singleton-only types.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::FillInBlank { answers } => answers.len(),
            Self::ChoiceOne { options, .. } => options.len(),
            Self::WordRepetition { items }
            | Self::PhraseRepetition { items }
            | Self::ParagraphRepetition { items } => items.len(),
            Self::OpenParagraph { prompts } => prompts.len(),
            Self::ConversationalRepetition { turns, .. } => turns.len(),
            Self::ErrorIdentification { .. }
            | Self::SentenceTransformation { .. }
            | Self::ConversationalOpen { .. } => 0,
        }
    }

    /// Number of options flagged correct. `0` for every type but choice-one.
    #[must_use]
    pub fn correct_option_count(&self) -> usize {
        match self {
            Self::ChoiceOne { options, .. } => options.iter().filter(|o| o.is_correct).count(),
            _ => 0,
        }
    }

    /// Total number of child rows, singleton included.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.row_count() + usize::from(self.has_singleton())
    }

    /// Human-readable text of every child row, in payload order.
    ///
    /// Feeds the full-text `content` field of the search document.
    #[must_use]
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        match self {
            Self::FillInBlank { answers } => {
                for a in answers {
                    out.push(&a.answer);
                    out.extend(a.explain.as_deref());
                }
            }
            Self::ChoiceOne { question, options } => {
                if let Some(q) = question {
                    out.push(&q.question);
                    out.extend(q.explain.as_deref());
                }
                out.extend(options.iter().map(|o| o.option.as_str()));
            }
            Self::ErrorIdentification { detail } => {
                if let Some(d) = detail {
                    out.extend([
                        d.error_sentence.as_str(),
                        d.error_word.as_str(),
                        d.correct_word.as_str(),
                    ]);
                    out.extend(d.explain.as_deref());
                }
            }
            Self::SentenceTransformation { detail } => {
                if let Some(d) = detail {
                    out.push(&d.original_sentence);
                    out.extend(d.beginning_word.as_deref());
                    out.push(&d.expected_answer);
                    out.extend(d.explain.as_deref());
                }
            }
            Self::WordRepetition { items }
            | Self::PhraseRepetition { items }
            | Self::ParagraphRepetition { items } => {
                for i in items {
                    out.push(&i.content);
                    out.extend(i.meaning.as_deref());
                }
            }
            Self::OpenParagraph { prompts } => {
                for p in prompts {
                    out.push(&p.question);
                    out.extend(p.example_answer.as_deref());
                }
            }
            Self::ConversationalRepetition {
                conversation,
                turns,
            } => {
                if let Some(c) = conversation {
                    out.push(&c.title);
                    out.extend(c.overview.as_deref());
                }
                for t in turns {
                    out.push(&t.content);
                    out.extend(t.meaning.as_deref());
                }
            }
            Self::ConversationalOpen { conversation } => {
                if let Some(c) = conversation {
                    out.push(&c.title);
                    out.extend(c.overview.as_deref());
                }
            }
        }
        out
    }
}

/// Parent question plus its variant payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionDetail {
    pub question: Question,
    pub payload: VariantPayload,
}

impl QuestionDetail {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.question.id
    }

    #[must_use]
    pub const fn version(&self) -> i64 {
        self.question.version
    }

    #[must_use]
    pub const fn question_type(&self) -> QuestionType {
        self.question.question_type
    }
}

/// A `(id, version)` pair a client already holds, used by the delta query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct KnownVersion {
    pub id: Uuid,
    pub version: i64,
}

impl KnownVersion {
    #[must_use]
    pub const fn new(id: Uuid, version: i64) -> Self {
        Self { id, version }
    }
}
