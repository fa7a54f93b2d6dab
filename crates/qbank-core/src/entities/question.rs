use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::QuestionType;

/// Parent record of every question. Owned by the relational store; cache and
/// search hold derived copies only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Question {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Ordered set: no duplicates, insertion order preserved.
    pub topic: Vec<String>,
    pub instruction: String,
    pub image_urls: Vec<String>,
    /// Time limit in seconds. Always positive.
    pub max_time: u32,
    /// Starts at 1, incremented on every parent-field update.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
