//! Choice-one invariant: at most one option per parent is flagged correct.

use chrono::{DateTime, Utc};
use libsql::Connection;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repos::variant::CHOICE_ONE_OPTIONS;

/// Flip every correct option of `question_id` except `keep` to incorrect.
///
/// Runs inside the caller's transaction, before the new or changed option is
/// persisted. Returns the ids that were flipped.
///
/// # Errors
///
/// Returns `DatabaseError` if reading or updating an option fails.
pub async fn clear_other_correct(
    conn: &Connection,
    question_id: Uuid,
    keep: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Vec<Uuid>, DatabaseError> {
    let mut flipped = Vec::new();
    for mut option in CHOICE_ONE_OPTIONS.list_by_question(conn, question_id).await? {
        if !option.is_correct || Some(option.id) == keep {
            continue;
        }
        option.is_correct = false;
        option.updated_at = now;
        CHOICE_ONE_OPTIONS.update(conn, &option).await?;
        flipped.push(option.id);
    }
    if !flipped.is_empty() {
        tracing::debug!(question_id = %question_id, flipped = flipped.len(), "cleared previous correct options");
    }
    Ok(flipped)
}

/// Number of options of `question_id` currently flagged correct.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn correct_option_count(
    conn: &Connection,
    question_id: Uuid,
) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM choice_one_options WHERE question_id = ?1 AND is_correct = 1",
            [question_id.to_string()],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}
