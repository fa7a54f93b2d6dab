//! Versioned delta query: which of the `(id, version)` pairs a client holds
//! are stale in the store.

use std::collections::HashMap;

use libsql::Connection;
use qbank_core::aggregate::{KnownVersion, QuestionDetail};
use qbank_core::entities::Question;
use uuid::Uuid;

use crate::QuestionDb;
use crate::aggregate::load_payload;
use crate::error::DatabaseError;
use crate::helpers::uuid_value;
use crate::repos::question::{SELECT_COLS, row_to_question};

/// Parent rows whose stored version is strictly greater than the known one.
///
/// Pairs are sent as `WHERE (id = ? AND version > ?) OR ...`, `batch` pairs per
/// statement. Unknown ids are ignored. An id listed more than once is queried
/// once, against its lowest known version. Results are most recently updated
/// first.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` for a zero `batch` and any query error.
pub async fn questions_changed_since(
    conn: &Connection,
    known: &[KnownVersion],
    batch: usize,
) -> Result<Vec<Question>, DatabaseError> {
    if batch == 0 {
        return Err(DatabaseError::Validation("batch size must be positive".into()));
    }

    let known = dedupe_lowest(known);
    let mut out = Vec::new();
    for chunk in known.chunks(batch) {
        let mut clauses = Vec::with_capacity(chunk.len());
        let mut params: Vec<libsql::Value> = Vec::with_capacity(chunk.len() * 2);
        for (i, pair) in chunk.iter().enumerate() {
            clauses.push(format!("(id = ?{} AND version > ?{})", 2 * i + 1, 2 * i + 2));
            params.push(uuid_value(pair.id));
            params.push(pair.version.into());
        }

        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM questions WHERE {}", clauses.join(" OR ")),
                libsql::params_from_iter(params),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            out.push(row_to_question(&row)?);
        }
    }

    out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(out)
}

/// One pair per id, first-seen order, lowest version kept.
fn dedupe_lowest(known: &[KnownVersion]) -> Vec<KnownVersion> {
    let mut slot: HashMap<Uuid, usize> = HashMap::with_capacity(known.len());
    let mut out: Vec<KnownVersion> = Vec::with_capacity(known.len());
    for pair in known {
        match slot.get(&pair.id) {
            Some(&i) => out[i].version = out[i].version.min(pair.version),
            None => {
                slot.insert(pair.id, out.len());
                out.push(*pair);
            }
        }
    }
    out
}

impl QuestionDb {
    /// Rebuild the aggregates of every stale pair, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or any rebuild fails.
    pub async fn details_changed_since(
        &self,
        known: &[KnownVersion],
        batch: usize,
    ) -> Result<Vec<QuestionDetail>, DatabaseError> {
        if known.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn().await?;
        let questions = questions_changed_since(&conn, known, batch).await?;

        let mut details = Vec::with_capacity(questions.len());
        for question in questions {
            let payload = load_payload(&conn, &question).await?;
            details.push(QuestionDetail { question, payload });
        }
        Ok(details)
    }
}
