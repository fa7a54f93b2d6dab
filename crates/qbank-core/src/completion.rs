//! Completion evaluation: does a question carry the minimum child data needed
//! to be shown to a learner?
//!
//! Completion is advisory. It drives the cache key status segment and the
//! search `status` field but never blocks persistence.

use crate::aggregate::QuestionDetail;
use crate::enums::{CompletionStatus, QuestionType};

/// Per-type thresholds applied to a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRule {
    /// The singleton child (stem, conversation header, ...) must exist.
    pub needs_singleton: bool,
    /// Minimum number of rows in the multi-row part.
    pub min_rows: usize,
    /// Exactly one row must be flagged correct (choice-one only).
    pub needs_single_correct: bool,
}

impl CompletionRule {
    const ROWS: Self = Self {
        needs_singleton: false,
        min_rows: 1,
        needs_single_correct: false,
    };

    const SINGLETON: Self = Self {
        needs_singleton: true,
        min_rows: 0,
        needs_single_correct: false,
    };
}

impl QuestionType {
    /// The completion rule registered for this type.
    #[must_use]
    pub const fn completion_rule(self) -> CompletionRule {
        match self {
            Self::FillInBlank
            | Self::WordRepetition
            | Self::PhraseRepetition
            | Self::ParagraphRepetition
            | Self::OpenParagraph => CompletionRule::ROWS,
            Self::ErrorIdentification | Self::SentenceTransformation | Self::ConversationalOpen => {
                CompletionRule::SINGLETON
            }
            Self::ConversationalRepetition => CompletionRule {
                needs_singleton: true,
                min_rows: 2,
                needs_single_correct: false,
            },
            Self::ChoiceOne => CompletionRule {
                needs_singleton: true,
                min_rows: 2,
                needs_single_correct: true,
            },
        }
    }
}

/// Evaluate the completion rule of the detail's type against its payload.
///
/// A payload whose shape does not match the question's `type` is incomplete.
#[must_use]
pub fn is_complete(detail: &QuestionDetail) -> bool {
    let payload = &detail.payload;
    if payload.question_type() != detail.question.question_type {
        return false;
    }

    let rule = detail.question.question_type.completion_rule();
    if rule.needs_singleton && !payload.has_singleton() {
        return false;
    }
    if payload.row_count() < rule.min_rows {
        return false;
    }
    if rule.needs_single_correct && payload.correct_option_count() != 1 {
        return false;
    }
    true
}

/// [`is_complete`] mapped to the human-readable status.
#[must_use]
pub fn status_of(detail: &QuestionDetail) -> CompletionStatus {
    CompletionStatus::from_flag(is_complete(detail))
}
