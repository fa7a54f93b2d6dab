//! Search document and query types shared by the search backend and callers.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::QuestionDetail;
use crate::enums::{CompletionStatus, QuestionType, Skill};

/// Denormalized, filterable projection of a question aggregate.
///
/// Keyed by `id`. Upserting a document with an existing id replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SearchDocument {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub skill: Skill,
    pub topic: Vec<String>,
    pub instruction: String,
    pub image_urls: Vec<String>,
    pub max_time: u32,
    pub version: i64,
    pub status: CompletionStatus,
    /// Concatenated text of every child row, full-text indexed.
    pub content: String,
    pub item_count: usize,
    /// Type-specific nested payload.
    pub payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl SearchDocument {
    /// Project an aggregate and its completion status into a document.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the payload cannot be converted to JSON.
    pub fn from_detail(
        detail: &QuestionDetail,
        status: CompletionStatus,
    ) -> Result<Self, serde_json::Error> {
        let q = &detail.question;
        Ok(Self {
            id: q.id,
            question_type: q.question_type,
            skill: q.question_type.skill(),
            topic: q.topic.clone(),
            instruction: q.instruction.clone(),
            image_urls: q.image_urls.clone(),
            max_time: q.max_time,
            version: q.version,
            status,
            content: detail.payload.text_fragments().join("\n"),
            item_count: detail.payload.item_count(),
            payload: serde_json::to_value(&detail.payload)?,
            updated_at: q.updated_at,
        })
    }
}

/// Browse/search criteria. Every field is optional; unset fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SearchFilter {
    /// Free text matched against instruction, topic, and content.
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub skill: Option<Skill>,
    pub status: Option<CompletionStatus>,
    /// Exact topic membership.
    pub topic: Option<String>,
    /// 1-based page number. `None` means the first page.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl SearchFilter {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Resolved `(page, page_size)`: page at least 1, size within `1..=max`.
    #[must_use]
    pub fn paging(&self, default_size: u32, max_size: u32) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self.page_size.unwrap_or(default_size).clamp(1, max_size.max(1));
        (page, size)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> SearchPage<T> {
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::aggregate::VariantPayload;
    use crate::entities::{Question, RepetitionItem};

    #[test]
    fn document_projects_aggregate() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let detail = QuestionDetail {
            question: Question {
                id,
                question_type: QuestionType::PhraseRepetition,
                topic: vec!["greetings".into()],
                instruction: "Repeat after me".into(),
                image_urls: Vec::new(),
                max_time: 20,
                version: 3,
                created_at: now,
                updated_at: now,
            },
            payload: VariantPayload::PhraseRepetition {
                items: vec![RepetitionItem {
                    id: Uuid::new_v4(),
                    question_id: id,
                    content: "Nice to meet you".into(),
                    meaning: Some("Rất vui được gặp bạn".into()),
                    created_at: now,
                    updated_at: now,
                }],
            },
        };

        let doc = SearchDocument::from_detail(&detail, CompletionStatus::Complete).unwrap();
        assert_eq!(doc.skill, Skill::Speaking);
        assert_eq!(doc.version, 3);
        assert_eq!(doc.item_count, 1);
        assert_eq!(doc.content, "Nice to meet you\nRất vui được gặp bạn");
        assert_eq!(doc.payload["type"], "phrase_repetition");
    }

    #[test]
    fn paging_is_clamped() {
        let filter = SearchFilter {
            page: Some(0),
            page_size: Some(500),
            ..SearchFilter::default()
        };
        assert_eq!(filter.paging(20, 100), (1, 100));
        assert_eq!(SearchFilter::default().paging(20, 100), (1, 20));
    }

    #[test]
    fn has_more_pages() {
        let page: SearchPage<()> = SearchPage {
            items: Vec::new(),
            total: 45,
            page: 2,
            page_size: 20,
        };
        assert!(page.has_more());
    }
}
