//! Question types, skills, completion status, and variant kinds for qbank.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `as_str()` returns the exact string stored in SQL and embedded in cache keys.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

/// Skill domain a question type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Grammar,
    Speaking,
}

impl Skill {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::Speaking => "speaking",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// QuestionType
// ---------------------------------------------------------------------------

/// Discriminator of a question's variant payload.
///
/// The set is closed: every variant has exactly one payload shape
/// ([`crate::aggregate::VariantPayload`]) and one completion rule
/// ([`QuestionType::completion_rule`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    FillInBlank,
    ChoiceOne,
    ErrorIdentification,
    SentenceTransformation,
    WordRepetition,
    PhraseRepetition,
    ParagraphRepetition,
    OpenParagraph,
    ConversationalRepetition,
    ConversationalOpen,
}

impl QuestionType {
    pub const ALL: [Self; 10] = [
        Self::FillInBlank,
        Self::ChoiceOne,
        Self::ErrorIdentification,
        Self::SentenceTransformation,
        Self::WordRepetition,
        Self::PhraseRepetition,
        Self::ParagraphRepetition,
        Self::OpenParagraph,
        Self::ConversationalRepetition,
        Self::ConversationalOpen,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FillInBlank => "fill_in_blank",
            Self::ChoiceOne => "choice_one",
            Self::ErrorIdentification => "error_identification",
            Self::SentenceTransformation => "sentence_transformation",
            Self::WordRepetition => "word_repetition",
            Self::PhraseRepetition => "phrase_repetition",
            Self::ParagraphRepetition => "paragraph_repetition",
            Self::OpenParagraph => "open_paragraph",
            Self::ConversationalRepetition => "conversational_repetition",
            Self::ConversationalOpen => "conversational_open",
        }
    }

    #[must_use]
    pub const fn skill(self) -> Skill {
        match self {
            Self::FillInBlank
            | Self::ChoiceOne
            | Self::ErrorIdentification
            | Self::SentenceTransformation => Skill::Grammar,
            Self::WordRepetition
            | Self::PhraseRepetition
            | Self::ParagraphRepetition
            | Self::OpenParagraph
            | Self::ConversationalRepetition
            | Self::ConversationalOpen => Skill::Speaking,
        }
    }

    /// Child record kinds owned by this question type.
    #[must_use]
    pub const fn variant_kinds(self) -> &'static [VariantKind] {
        match self {
            Self::FillInBlank => &[VariantKind::FillInBlankAnswer],
            Self::ChoiceOne => &[VariantKind::ChoiceOneQuestion, VariantKind::ChoiceOneOption],
            Self::ErrorIdentification => &[VariantKind::ErrorIdentification],
            Self::SentenceTransformation => &[VariantKind::SentenceTransformation],
            Self::WordRepetition => &[VariantKind::WordRepetition],
            Self::PhraseRepetition => &[VariantKind::PhraseRepetition],
            Self::ParagraphRepetition => &[VariantKind::ParagraphRepetition],
            Self::OpenParagraph => &[VariantKind::OpenParagraphPrompt],
            Self::ConversationalRepetition => &[
                VariantKind::ConversationalRepetition,
                VariantKind::ConversationalRepetitionTurn,
            ],
            Self::ConversationalOpen => &[VariantKind::ConversationalOpen],
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// CompletionStatus
// ---------------------------------------------------------------------------

/// Human-readable mirror of the completion verdict.
///
/// Embedded in versioned cache keys and stored as a filterable search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Complete,
    Uncomplete,
}

impl CompletionStatus {
    #[must_use]
    pub const fn from_flag(is_complete: bool) -> Self {
        if is_complete {
            Self::Complete
        } else {
            Self::Uncomplete
        }
    }

    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Uncomplete => "uncomplete",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompletionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(Self::Complete),
            "uncomplete" => Ok(Self::Uncomplete),
            other => Err(CoreError::Validation(format!(
                "unknown completion status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// VariantKind
// ---------------------------------------------------------------------------

/// One child table family. Each kind belongs to exactly one [`QuestionType`].
///
/// ```text
/// choice_one                → choice_one_question (singleton) + choice_one_option (multi)
/// conversational_repetition → conversational_repetition (singleton) + conversational_repetition_turn (multi)
/// everything else           → one table
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    FillInBlankAnswer,
    ChoiceOneQuestion,
    ChoiceOneOption,
    ErrorIdentification,
    SentenceTransformation,
    WordRepetition,
    PhraseRepetition,
    ParagraphRepetition,
    OpenParagraphPrompt,
    ConversationalRepetition,
    ConversationalRepetitionTurn,
    ConversationalOpen,
}

impl VariantKind {
    pub const ALL: [Self; 12] = [
        Self::FillInBlankAnswer,
        Self::ChoiceOneQuestion,
        Self::ChoiceOneOption,
        Self::ErrorIdentification,
        Self::SentenceTransformation,
        Self::WordRepetition,
        Self::PhraseRepetition,
        Self::ParagraphRepetition,
        Self::OpenParagraphPrompt,
        Self::ConversationalRepetition,
        Self::ConversationalRepetitionTurn,
        Self::ConversationalOpen,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FillInBlankAnswer => "fill_in_blank_answer",
            Self::ChoiceOneQuestion => "choice_one_question",
            Self::ChoiceOneOption => "choice_one_option",
            Self::ErrorIdentification => "error_identification",
            Self::SentenceTransformation => "sentence_transformation",
            Self::WordRepetition => "word_repetition",
            Self::PhraseRepetition => "phrase_repetition",
            Self::ParagraphRepetition => "paragraph_repetition",
            Self::OpenParagraphPrompt => "open_paragraph_prompt",
            Self::ConversationalRepetition => "conversational_repetition",
            Self::ConversationalRepetitionTurn => "conversational_repetition_turn",
            Self::ConversationalOpen => "conversational_open",
        }
    }

    #[must_use]
    pub const fn question_type(self) -> QuestionType {
        match self {
            Self::FillInBlankAnswer => QuestionType::FillInBlank,
            Self::ChoiceOneQuestion | Self::ChoiceOneOption => QuestionType::ChoiceOne,
            Self::ErrorIdentification => QuestionType::ErrorIdentification,
            Self::SentenceTransformation => QuestionType::SentenceTransformation,
            Self::WordRepetition => QuestionType::WordRepetition,
            Self::PhraseRepetition => QuestionType::PhraseRepetition,
            Self::ParagraphRepetition => QuestionType::ParagraphRepetition,
            Self::OpenParagraphPrompt => QuestionType::OpenParagraph,
            Self::ConversationalRepetition | Self::ConversationalRepetitionTurn => {
                QuestionType::ConversationalRepetition
            }
            Self::ConversationalOpen => QuestionType::ConversationalOpen,
        }
    }

    /// Whether at most one row per parent question may exist.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        matches!(
            self,
            Self::ChoiceOneQuestion
                | Self::ErrorIdentification
                | Self::SentenceTransformation
                | Self::ConversationalRepetition
                | Self::ConversationalOpen
        )
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown variant kind '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
