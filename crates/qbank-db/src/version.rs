//! Version counter management.
//!
//! `version` starts at 1 and moves by exactly one per persisted parent change.
//! Cache keys and the delta query both key off it.

use chrono::{DateTime, Utc};
use qbank_core::entities::Question;
use qbank_core::inputs::normalize_topics;

use crate::updates::question::QuestionUpdate;

/// Apply `update` to `question`, bumping `version` by one.
///
/// An empty update returns the question unchanged (same version, same
/// `updated_at`).
#[must_use]
pub fn bump_on_update(question: &Question, update: &QuestionUpdate, now: DateTime<Utc>) -> Question {
    if update.is_empty() {
        return question.clone();
    }

    let mut next = question.clone();
    if let Some(topic) = &update.topic {
        next.topic = normalize_topics(topic.clone());
    }
    if let Some(instruction) = &update.instruction {
        next.instruction.clone_from(instruction);
    }
    if let Some(urls) = &update.image_urls {
        next.image_urls.clone_from(urls);
    }
    if let Some(max_time) = update.max_time {
        next.max_time = max_time;
    }
    next.version = question.version + 1;
    next.updated_at = now;
    next
}

/// Bump for a child-only mutation, when that behaviour is switched on.
#[must_use]
pub fn bump_for_child_change(question: &Question, now: DateTime<Utc>) -> Question {
    let mut next = question.clone();
    next.version = question.version + 1;
    next.updated_at = now;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::question::QuestionUpdateBuilder;
    use chrono::Duration;
    use qbank_core::enums::QuestionType;
    use uuid::Uuid;

    fn question() -> Question {
        let now = Utc::now();
        Question {
            id: Uuid::new_v4(),
            question_type: QuestionType::FillInBlank,
            topic: vec!["travel".into()],
            instruction: "old".into(),
            image_urls: Vec::new(),
            max_time: 30,
            version: 4,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn update_bumps_exactly_once() {
        let q = question();
        let later = q.updated_at + Duration::seconds(5);
        let update = QuestionUpdateBuilder::new()
            .instruction("new")
            .max_time(45)
            .build();

        let next = bump_on_update(&q, &update, later);
        assert_eq!(next.version, 5);
        assert_eq!(next.instruction, "new");
        assert_eq!(next.max_time, 45);
        assert_eq!(next.updated_at, later);
        assert_eq!(next.created_at, q.created_at);
    }

    #[test]
    fn empty_update_leaves_version() {
        let q = question();
        let next = bump_on_update(&q, &QuestionUpdate::default(), Utc::now());
        assert_eq!(next, q);
    }

    #[test]
    fn child_change_bump() {
        let q = question();
        assert_eq!(bump_for_child_change(&q, Utc::now()).version, 5);
    }
}
