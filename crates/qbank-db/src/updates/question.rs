//! Question update builder.

use qbank_core::errors::CoreError;
use qbank_core::inputs::{normalize_topics, validate_image_urls, validate_max_time, validate_topics};
use serde::{Deserialize, Serialize};

/// Changed parent fields. `type` is immutable once a question exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u32>,
}

impl QuestionUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.topic.is_none()
            && self.instruction.is_none()
            && self.image_urls.is_none()
            && self.max_time.is_none()
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank instruction, zero `max_time`,
    /// or blank list entries.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(instruction) = &self.instruction {
            if instruction.trim().is_empty() {
                return Err(CoreError::Validation("instruction must not be empty".into()));
            }
        }
        if let Some(max_time) = self.max_time {
            validate_max_time(max_time)?;
        }
        if let Some(topic) = &self.topic {
            validate_topics(topic)?;
        }
        if let Some(urls) = &self.image_urls {
            validate_image_urls(urls)?;
        }
        Ok(())
    }
}

pub struct QuestionUpdateBuilder(QuestionUpdate);

impl Default for QuestionUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(QuestionUpdate::default())
    }

    /// Replace the topic set. Entries are trimmed and de-duplicated in order.
    #[must_use]
    pub fn topic(mut self, topic: Vec<String>) -> Self {
        self.0.topic = Some(normalize_topics(topic));
        self
    }

    #[must_use]
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.0.instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn image_urls(mut self, image_urls: Vec<String>) -> Self {
        self.0.image_urls = Some(image_urls);
        self
    }

    #[must_use]
    pub const fn max_time(mut self, max_time: u32) -> Self {
        self.0.max_time = Some(max_time);
        self
    }

    #[must_use]
    pub fn build(self) -> QuestionUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_only_given_fields() {
        let update = QuestionUpdateBuilder::new()
            .instruction("Fill the gap")
            .build();
        assert_eq!(update.instruction.as_deref(), Some("Fill the gap"));
        assert!(update.topic.is_none());
        assert!(!update.is_empty());
        assert!(QuestionUpdateBuilder::new().build().is_empty());
    }

    #[test]
    fn builder_normalizes_topics() {
        let update = QuestionUpdateBuilder::new()
            .topic(vec!["a".into(), " a ".into(), "b".into()])
            .build();
        assert_eq!(update.topic, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn serializes_changed_fields_only() {
        let update = QuestionUpdateBuilder::new().max_time(90).build();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "max_time": 90 }));
    }

    #[test]
    fn zero_max_time_is_invalid() {
        let update = QuestionUpdateBuilder::new().max_time(0).build();
        assert!(update.validate().is_err());
    }
}
