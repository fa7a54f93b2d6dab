//! Question repository: parent rows, optimistic version-guarded updates.

use libsql::Connection;
use qbank_core::clock;
use qbank_core::entities::Question;
use qbank_core::enums::QuestionType;
use qbank_core::inputs::NewQuestion;
use uuid::Uuid;

use crate::QuestionDb;
use crate::error::DatabaseError;
use crate::helpers::{
    encode_string_list, fmt_datetime, parse_datetime, parse_string_list, parse_uuid, uuid_value,
};
use crate::updates::question::QuestionUpdate;
use crate::version::bump_on_update;

pub(crate) const SELECT_COLS: &str =
    "id, type, topic, instruction, image_urls, max_time, version, created_at, updated_at";

pub(crate) fn row_to_question(row: &libsql::Row) -> Result<Question, DatabaseError> {
    let max_time = row.get::<i64>(5)?;
    Ok(Question {
        id: parse_uuid(&row.get::<String>(0)?)?,
        question_type: row.get::<String>(1)?.parse::<QuestionType>()?,
        topic: parse_string_list(&row.get::<String>(2)?)?,
        instruction: row.get(3)?,
        image_urls: parse_string_list(&row.get::<String>(4)?)?,
        max_time: u32::try_from(max_time)
            .map_err(|_| DatabaseError::InvalidState(format!("max_time out of range: {max_time}")))?,
        version: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

/// Insert a parent row as-is.
///
/// # Errors
///
/// Returns `DatabaseError::Conflict` if the id already exists.
pub async fn insert_question(conn: &Connection, q: &Question) -> Result<(), DatabaseError> {
    if question_exists(conn, q.id).await? {
        return Err(DatabaseError::Conflict(format!("question {} already exists", q.id)));
    }
    conn.execute(
        &format!(
            "INSERT INTO questions ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        libsql::params![
            q.id.to_string(),
            q.question_type.as_str(),
            encode_string_list(&q.topic)?,
            q.instruction.as_str(),
            encode_string_list(&q.image_urls)?,
            i64::from(q.max_time),
            q.version,
            fmt_datetime(&q.created_at),
            fmt_datetime(&q.updated_at)
        ],
    )
    .await?;
    Ok(())
}

/// # Errors
///
/// Returns `DatabaseError::NotFound` if no parent row has this id, and
/// `DatabaseError::UnknownType` if its stored `type` is not recognised.
pub async fn fetch_question(conn: &Connection, id: Uuid) -> Result<Question, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM questions WHERE id = ?1"),
            [id.to_string()],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("question", id))?;
    row_to_question(&row)
}

/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn question_exists(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query("SELECT 1 FROM questions WHERE id = ?1", [id.to_string()])
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Persist `next` over the row currently at `expected_version`.
///
/// Only fields set in `update` generate SET clauses; `version` and
/// `updated_at` are always written.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the row is gone and
/// `DatabaseError::Conflict` if another writer moved the version first.
pub async fn persist_bumped(
    conn: &Connection,
    expected_version: i64,
    update: &QuestionUpdate,
    next: &Question,
) -> Result<(), DatabaseError> {
    let mut sets = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut idx = 1usize;

    if update.topic.is_some() {
        sets.push(format!("topic = ?{idx}"));
        params.push(encode_string_list(&next.topic)?.into());
        idx += 1;
    }
    if update.instruction.is_some() {
        sets.push(format!("instruction = ?{idx}"));
        params.push(next.instruction.clone().into());
        idx += 1;
    }
    if update.image_urls.is_some() {
        sets.push(format!("image_urls = ?{idx}"));
        params.push(encode_string_list(&next.image_urls)?.into());
        idx += 1;
    }
    if update.max_time.is_some() {
        sets.push(format!("max_time = ?{idx}"));
        params.push(i64::from(next.max_time).into());
        idx += 1;
    }

    sets.push(format!("version = ?{idx}"));
    params.push(next.version.into());
    idx += 1;
    sets.push(format!("updated_at = ?{idx}"));
    params.push(fmt_datetime(&next.updated_at).into());
    idx += 1;

    params.push(uuid_value(next.id));
    params.push(expected_version.into());
    let sql = format!(
        "UPDATE questions SET {} WHERE id = ?{idx} AND version = ?{}",
        sets.join(", "),
        idx + 1
    );
    let changed = conn.execute(&sql, libsql::params_from_iter(params)).await?;

    if changed == 0 {
        if question_exists(conn, next.id).await? {
            return Err(DatabaseError::Conflict(format!(
                "question {} is no longer at version {expected_version}",
                next.id
            )));
        }
        return Err(DatabaseError::not_found("question", next.id));
    }
    Ok(())
}

/// Delete a parent row; children go with it through `ON DELETE CASCADE`.
///
/// # Errors
///
/// Returns `DatabaseError` if the statement fails.
pub async fn delete_question_row(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute("DELETE FROM questions WHERE id = ?1", [id.to_string()])
        .await?;
    Ok(changed > 0)
}

impl QuestionDb {
    /// Validate and insert a new question at version 1.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input.
    pub async fn create_question(&self, input: NewQuestion) -> Result<Question, DatabaseError> {
        input.validate()?;
        let question = input.into_question(Uuid::new_v4(), clock::now());

        let tx = self.begin().await?;
        let result = insert_question(&tx, &question).await;
        tx.finish(result).await?;

        tracing::info!(question_id = %question.id, question_type = %question.question_type, "question created");
        Ok(question)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` or `DatabaseError::UnknownType`.
    pub async fn get_question(&self, id: Uuid) -> Result<Question, DatabaseError> {
        let conn = self.conn().await?;
        fetch_question(&conn, id).await
    }

    /// Apply parent-field changes, bumping `version` by one.
    ///
    /// An empty update returns the stored question untouched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation`, `NotFound`, or `Conflict`.
    pub async fn update_question(
        &self,
        id: Uuid,
        update: &QuestionUpdate,
    ) -> Result<Question, DatabaseError> {
        update.validate()?;

        let tx = self.begin().await?;
        let result: Result<Question, DatabaseError> = async {
            let current = fetch_question(&tx, id).await?;
            if update.is_empty() {
                return Ok(current);
            }
            let next = bump_on_update(&current, update, clock::now());
            persist_bumped(&tx, current.version, update, &next).await?;
            Ok(next)
        }
        .await;
        let next = tx.finish(result).await?;

        tracing::info!(question_id = %id, version = next.version, "question updated");
        Ok(next)
    }

    /// Delete a question and all its child rows. Returns the deleted parent.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the question does not exist.
    pub async fn delete_question(&self, id: Uuid) -> Result<Question, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<Question, DatabaseError> = async {
            let current = fetch_question(&tx, id).await?;
            delete_question_row(&tx, id).await?;
            Ok(current)
        }
        .await;
        let deleted = tx.finish(result).await?;

        tracing::info!(question_id = %id, "question deleted");
        Ok(deleted)
    }

    /// Most recently updated questions first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a row fails to parse.
    pub async fn list_questions(&self, limit: u32) -> Result<Vec<Question>, DatabaseError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM questions ORDER BY updated_at DESC, rowid DESC LIMIT ?1"
                ),
                [i64::from(limit)],
            )
            .await?;

        let mut questions = Vec::new();
        while let Some(row) = rows.next().await? {
            questions.push(row_to_question(&row)?);
        }
        Ok(questions)
    }

    /// Every question id, oldest first. Does not parse `type`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn question_ids(&self) -> Result<Vec<Uuid>, DatabaseError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query("SELECT id FROM questions ORDER BY created_at, rowid", ())
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(parse_uuid(&row.get::<String>(0)?)?);
        }
        Ok(ids)
    }
}
