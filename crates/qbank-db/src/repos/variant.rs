//! Variant Store: one structurally identical CRUD contract per child table.
//!
//! Every child table has the column layout
//! `id, question_id, <content columns...>, created_at, updated_at`.
//! [`VariantRecord`] describes the content columns of a record type and
//! [`VariantTable`] binds a record type to a table name, so the same record
//! type can back several tables (the three repetition tables share
//! `RepetitionItem`, both conversation headers share `Conversation`).

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use libsql::Connection;
use qbank_core::entities::{
    ChoiceOneOption, ChoiceOneQuestion, Conversation, ConversationTurn, ErrorIdentification,
    FillInBlankAnswer, OpenParagraphPrompt, RepetitionItem, SentenceTransformation,
};
use qbank_core::enums::VariantKind;
use qbank_core::inputs::VariantRow;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_datetime, get_bool, get_opt_string, opt_text, parse_datetime, parse_uuid, uuid_value,
};

// ---------------------------------------------------------------------------
// Record contract
// ---------------------------------------------------------------------------

/// Columns shared by every child row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIdentity {
    pub id: Uuid,
    pub question_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RowIdentity {
    /// Read the shared columns of a row with `content_len` content columns.
    fn read(row: &libsql::Row, content_len: usize) -> Result<Self, DatabaseError> {
        let tail = i32::try_from(content_len + 2)
            .map_err(|_| DatabaseError::InvalidState("too many content columns".into()))?;
        Ok(Self {
            id: parse_uuid(&row.get::<String>(0)?)?,
            question_id: parse_uuid(&row.get::<String>(1)?)?,
            created_at: parse_datetime(&row.get::<String>(tail)?)?,
            updated_at: parse_datetime(&row.get::<String>(tail + 1)?)?,
        })
    }
}

/// A row type stored in one or more variant tables.
pub trait VariantRecord: Sized + Send + Sync {
    /// Content columns, in order, between `question_id` and `created_at`.
    const COLUMNS: &'static [&'static str];

    fn identity(&self) -> RowIdentity;

    /// Values for [`Self::COLUMNS`], same order.
    fn content_values(&self) -> Vec<libsql::Value>;

    /// Parse a row selected with [`VariantTable::select_cols`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a column is missing or malformed.
    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError>;
}

impl VariantRecord for FillInBlankAnswer {
    const COLUMNS: &'static [&'static str] = &["answer", "explain"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![self.answer.clone().into(), opt_text(self.explain.as_deref())]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            answer: row.get(2)?,
            explain: get_opt_string(row, 3)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for ChoiceOneQuestion {
    const COLUMNS: &'static [&'static str] = &["question", "explain"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![self.question.clone().into(), opt_text(self.explain.as_deref())]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            question: row.get(2)?,
            explain: get_opt_string(row, 3)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for ChoiceOneOption {
    const COLUMNS: &'static [&'static str] = &["option", "is_correct"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![
            self.option.clone().into(),
            libsql::Value::Integer(i64::from(self.is_correct)),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            option: row.get(2)?,
            is_correct: get_bool(row, 3)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for ErrorIdentification {
    const COLUMNS: &'static [&'static str] =
        &["error_sentence", "error_word", "correct_word", "explain"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![
            self.error_sentence.clone().into(),
            self.error_word.clone().into(),
            self.correct_word.clone().into(),
            opt_text(self.explain.as_deref()),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            error_sentence: row.get(2)?,
            error_word: row.get(3)?,
            correct_word: row.get(4)?,
            explain: get_opt_string(row, 5)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for SentenceTransformation {
    const COLUMNS: &'static [&'static str] = &[
        "original_sentence",
        "beginning_word",
        "expected_answer",
        "explain",
    ];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![
            self.original_sentence.clone().into(),
            opt_text(self.beginning_word.as_deref()),
            self.expected_answer.clone().into(),
            opt_text(self.explain.as_deref()),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            original_sentence: row.get(2)?,
            beginning_word: get_opt_string(row, 3)?,
            expected_answer: row.get(4)?,
            explain: get_opt_string(row, 5)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for RepetitionItem {
    const COLUMNS: &'static [&'static str] = &["content", "meaning"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![self.content.clone().into(), opt_text(self.meaning.as_deref())]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            content: row.get(2)?,
            meaning: get_opt_string(row, 3)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for OpenParagraphPrompt {
    const COLUMNS: &'static [&'static str] = &["question", "example_answer"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![
            self.question.clone().into(),
            opt_text(self.example_answer.as_deref()),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            question: row.get(2)?,
            example_answer: get_opt_string(row, 3)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for Conversation {
    const COLUMNS: &'static [&'static str] = &["title", "overview"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![self.title.clone().into(), opt_text(self.overview.as_deref())]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            title: row.get(2)?,
            overview: get_opt_string(row, 3)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

impl VariantRecord for ConversationTurn {
    const COLUMNS: &'static [&'static str] = &["speaker", "content", "meaning"];

    fn identity(&self) -> RowIdentity {
        RowIdentity {
            id: self.id,
            question_id: self.question_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn content_values(&self) -> Vec<libsql::Value> {
        vec![
            self.speaker.clone().into(),
            self.content.clone().into(),
            opt_text(self.meaning.as_deref()),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let ident = RowIdentity::read(row, Self::COLUMNS.len())?;
        Ok(Self {
            id: ident.id,
            question_id: ident.question_id,
            speaker: row.get(2)?,
            content: row.get(3)?,
            meaning: get_opt_string(row, 4)?,
            created_at: ident.created_at,
            updated_at: ident.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// VariantTable
// ---------------------------------------------------------------------------

/// A child table holding records of type `R`.
pub struct VariantTable<R> {
    pub name: &'static str,
    pub kind: VariantKind,
    _record: PhantomData<fn() -> R>,
}

impl<R: VariantRecord> VariantTable<R> {
    #[must_use]
    pub const fn new(name: &'static str, kind: VariantKind) -> Self {
        Self {
            name,
            kind,
            _record: PhantomData,
        }
    }

    /// `id, question_id, <content>, created_at, updated_at`, identifiers quoted.
    #[must_use]
    pub fn select_cols(&self) -> String {
        let mut cols = vec!["\"id\"".to_string(), "\"question_id\"".to_string()];
        cols.extend(R::COLUMNS.iter().map(|c| format!("\"{c}\"")));
        cols.push("\"created_at\"".into());
        cols.push("\"updated_at\"".into());
        cols.join(", ")
    }

    /// Insert a new row. Singleton tables reject a second row for the same parent.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Conflict` when a singleton row already exists.
    pub async fn insert(&self, conn: &Connection, record: &R) -> Result<(), DatabaseError> {
        let ident = record.identity();
        if self.kind.is_singleton() && self.first_by_question(conn, ident.question_id).await?.is_some() {
            return Err(DatabaseError::Conflict(format!(
                "question {} already has a {} row",
                ident.question_id, self.kind
            )));
        }

        let mut params = vec![uuid_value(ident.id), uuid_value(ident.question_id)];
        params.extend(record.content_values());
        params.push(fmt_datetime(&ident.created_at).into());
        params.push(fmt_datetime(&ident.updated_at).into());
        let placeholders = (1..=params.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({placeholders})",
                self.name,
                self.select_cols()
            ),
            libsql::params_from_iter(params),
        )
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no row has this id.
    pub async fn get(&self, conn: &Connection, id: Uuid) -> Result<R, DatabaseError> {
        let mut rows = conn
            .query(
                &format!("SELECT {} FROM {} WHERE id = ?1", self.select_cols(), self.name),
                [id.to_string()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(self.kind.as_str(), id))?;
        R::from_row(&row)
    }

    /// Overwrite the content columns and `updated_at`. `question_id` and
    /// `created_at` never change.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no row has this id.
    pub async fn update(&self, conn: &Connection, record: &R) -> Result<(), DatabaseError> {
        let ident = record.identity();
        let mut sets: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("\"{c}\" = ?{}", i + 1))
            .collect();
        let mut params = record.content_values();
        params.push(fmt_datetime(&ident.updated_at).into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(uuid_value(ident.id));

        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET {} WHERE id = ?{}",
                    self.name,
                    sets.join(", "),
                    params.len()
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found(self.kind.as_str(), ident.id));
        }
        Ok(())
    }

    /// Delete a row and return it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no row has this id.
    pub async fn delete(&self, conn: &Connection, id: Uuid) -> Result<R, DatabaseError> {
        let existing = self.get(conn, id).await?;
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.name),
            [id.to_string()],
        )
        .await?;
        Ok(existing)
    }

    /// All rows of one parent, oldest first (insertion order breaks ties).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a row fails to parse.
    pub async fn list_by_question(
        &self,
        conn: &Connection,
        question_id: Uuid,
    ) -> Result<Vec<R>, DatabaseError> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM {} WHERE question_id = ?1 ORDER BY created_at, rowid",
                    self.select_cols(),
                    self.name
                ),
                [question_id.to_string()],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(R::from_row(&row)?);
        }
        Ok(out)
    }

    /// First row of one parent by the same ordering as [`Self::list_by_question`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the row fails to parse.
    pub async fn first_by_question(
        &self,
        conn: &Connection,
        question_id: Uuid,
    ) -> Result<Option<R>, DatabaseError> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {} FROM {} WHERE question_id = ?1 ORDER BY created_at, rowid LIMIT 1",
                    self.select_cols(),
                    self.name
                ),
                [question_id.to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(R::from_row(&row)?)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub const FILL_IN_BLANK_ANSWERS: VariantTable<FillInBlankAnswer> =
    VariantTable::new("fill_in_blank_answers", VariantKind::FillInBlankAnswer);
pub const CHOICE_ONE_QUESTIONS: VariantTable<ChoiceOneQuestion> =
    VariantTable::new("choice_one_questions", VariantKind::ChoiceOneQuestion);
pub const CHOICE_ONE_OPTIONS: VariantTable<ChoiceOneOption> =
    VariantTable::new("choice_one_options", VariantKind::ChoiceOneOption);
pub const ERROR_IDENTIFICATIONS: VariantTable<ErrorIdentification> =
    VariantTable::new("error_identifications", VariantKind::ErrorIdentification);
pub const SENTENCE_TRANSFORMATIONS: VariantTable<SentenceTransformation> =
    VariantTable::new("sentence_transformations", VariantKind::SentenceTransformation);
pub const WORD_REPETITIONS: VariantTable<RepetitionItem> =
    VariantTable::new("word_repetitions", VariantKind::WordRepetition);
pub const PHRASE_REPETITIONS: VariantTable<RepetitionItem> =
    VariantTable::new("phrase_repetitions", VariantKind::PhraseRepetition);
pub const PARAGRAPH_REPETITIONS: VariantTable<RepetitionItem> =
    VariantTable::new("paragraph_repetitions", VariantKind::ParagraphRepetition);
pub const OPEN_PARAGRAPH_PROMPTS: VariantTable<OpenParagraphPrompt> =
    VariantTable::new("open_paragraph_prompts", VariantKind::OpenParagraphPrompt);
pub const CONVERSATIONAL_REPETITIONS: VariantTable<Conversation> =
    VariantTable::new("conversational_repetitions", VariantKind::ConversationalRepetition);
pub const CONVERSATIONAL_REPETITION_TURNS: VariantTable<ConversationTurn> = VariantTable::new(
    "conversational_repetition_turns",
    VariantKind::ConversationalRepetitionTurn,
);
pub const CONVERSATIONAL_OPENS: VariantTable<Conversation> =
    VariantTable::new("conversational_opens", VariantKind::ConversationalOpen);

// ---------------------------------------------------------------------------
// Dispatch over VariantRow / VariantKind
// ---------------------------------------------------------------------------

/// Run `$body` with `$table` bound to the table of a `VariantRow` and `$rec`
/// to the record it wraps.
macro_rules! with_row_table {
    ($row:expr, |$table:ident, $rec:ident| $body:expr) => {
        match $row {
            VariantRow::FillInBlankAnswer($rec) => {
                let $table = &FILL_IN_BLANK_ANSWERS;
                $body
            }
            VariantRow::ChoiceOneQuestion($rec) => {
                let $table = &CHOICE_ONE_QUESTIONS;
                $body
            }
            VariantRow::ChoiceOneOption($rec) => {
                let $table = &CHOICE_ONE_OPTIONS;
                $body
            }
            VariantRow::ErrorIdentification($rec) => {
                let $table = &ERROR_IDENTIFICATIONS;
                $body
            }
            VariantRow::SentenceTransformation($rec) => {
                let $table = &SENTENCE_TRANSFORMATIONS;
                $body
            }
            VariantRow::WordRepetition($rec) => {
                let $table = &WORD_REPETITIONS;
                $body
            }
            VariantRow::PhraseRepetition($rec) => {
                let $table = &PHRASE_REPETITIONS;
                $body
            }
            VariantRow::ParagraphRepetition($rec) => {
                let $table = &PARAGRAPH_REPETITIONS;
                $body
            }
            VariantRow::OpenParagraphPrompt($rec) => {
                let $table = &OPEN_PARAGRAPH_PROMPTS;
                $body
            }
            VariantRow::ConversationalRepetition($rec) => {
                let $table = &CONVERSATIONAL_REPETITIONS;
                $body
            }
            VariantRow::ConversationalRepetitionTurn($rec) => {
                let $table = &CONVERSATIONAL_REPETITION_TURNS;
                $body
            }
            VariantRow::ConversationalOpen($rec) => {
                let $table = &CONVERSATIONAL_OPENS;
                $body
            }
        }
    };
}

/// Run `$body` with `$table` bound to the table of a `VariantKind` and `$wrap`
/// to the matching `VariantRow` constructor.
macro_rules! with_kind_table {
    ($kind:expr, |$table:ident, $wrap:ident| $body:expr) => {
        match $kind {
            VariantKind::FillInBlankAnswer => {
                let ($table, $wrap) = (&FILL_IN_BLANK_ANSWERS, VariantRow::FillInBlankAnswer);
                $body
            }
            VariantKind::ChoiceOneQuestion => {
                let ($table, $wrap) = (&CHOICE_ONE_QUESTIONS, VariantRow::ChoiceOneQuestion);
                $body
            }
            VariantKind::ChoiceOneOption => {
                let ($table, $wrap) = (&CHOICE_ONE_OPTIONS, VariantRow::ChoiceOneOption);
                $body
            }
            VariantKind::ErrorIdentification => {
                let ($table, $wrap) = (&ERROR_IDENTIFICATIONS, VariantRow::ErrorIdentification);
                $body
            }
            VariantKind::SentenceTransformation => {
                let ($table, $wrap) = (
                    &SENTENCE_TRANSFORMATIONS,
                    VariantRow::SentenceTransformation,
                );
                $body
            }
            VariantKind::WordRepetition => {
                let ($table, $wrap) = (&WORD_REPETITIONS, VariantRow::WordRepetition);
                $body
            }
            VariantKind::PhraseRepetition => {
                let ($table, $wrap) = (&PHRASE_REPETITIONS, VariantRow::PhraseRepetition);
                $body
            }
            VariantKind::ParagraphRepetition => {
                let ($table, $wrap) = (&PARAGRAPH_REPETITIONS, VariantRow::ParagraphRepetition);
                $body
            }
            VariantKind::OpenParagraphPrompt => {
                let ($table, $wrap) = (&OPEN_PARAGRAPH_PROMPTS, VariantRow::OpenParagraphPrompt);
                $body
            }
            VariantKind::ConversationalRepetition => {
                let ($table, $wrap) = (
                    &CONVERSATIONAL_REPETITIONS,
                    VariantRow::ConversationalRepetition,
                );
                $body
            }
            VariantKind::ConversationalRepetitionTurn => {
                let ($table, $wrap) = (
                    &CONVERSATIONAL_REPETITION_TURNS,
                    VariantRow::ConversationalRepetitionTurn,
                );
                $body
            }
            VariantKind::ConversationalOpen => {
                let ($table, $wrap) = (&CONVERSATIONAL_OPENS, VariantRow::ConversationalOpen);
                $body
            }
        }
    };
}

/// Table name backing a variant kind.
#[must_use]
pub fn table_name(kind: VariantKind) -> &'static str {
    with_kind_table!(kind, |table, _wrap| table.name)
}

/// # Errors
///
/// Returns `DatabaseError::Conflict` for a second singleton row.
pub async fn insert_row(conn: &Connection, row: &VariantRow) -> Result<(), DatabaseError> {
    with_row_table!(row, |table, rec| table.insert(conn, rec).await)
}

/// # Errors
///
/// Returns `DatabaseError::NotFound` if the row does not exist.
pub async fn update_row(conn: &Connection, row: &VariantRow) -> Result<(), DatabaseError> {
    with_row_table!(row, |table, rec| table.update(conn, rec).await)
}

/// # Errors
///
/// Returns `DatabaseError::NotFound` if the row does not exist.
pub async fn get_row(
    conn: &Connection,
    kind: VariantKind,
    id: Uuid,
) -> Result<VariantRow, DatabaseError> {
    with_kind_table!(kind, |table, wrap| Ok(wrap(table.get(conn, id).await?)))
}

/// # Errors
///
/// Returns `DatabaseError::NotFound` if the row does not exist.
pub async fn delete_row(
    conn: &Connection,
    kind: VariantKind,
    id: Uuid,
) -> Result<VariantRow, DatabaseError> {
    with_kind_table!(kind, |table, wrap| Ok(wrap(table.delete(conn, id).await?)))
}

/// All rows of one kind for one parent, oldest first.
///
/// # Errors
///
/// Returns `DatabaseError` if a row fails to parse.
pub async fn list_rows(
    conn: &Connection,
    kind: VariantKind,
    question_id: Uuid,
) -> Result<Vec<VariantRow>, DatabaseError> {
    with_kind_table!(kind, |table, wrap| Ok(table
        .list_by_question(conn, question_id)
        .await?
        .into_iter()
        .map(wrap)
        .collect()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qbank_core::clock;
    use qbank_core::entities::Question;
    use qbank_core::enums::QuestionType;

    use super::*;
    use crate::QuestionDb;
    use crate::repos::question::insert_question;

    async fn db_with_question(question_type: QuestionType) -> (QuestionDb, Uuid) {
        let db = QuestionDb::open_in_memory().await.unwrap();
        let now = clock::now();
        let q = Question {
            id: Uuid::new_v4(),
            question_type,
            topic: Vec::new(),
            instruction: "Repeat".into(),
            image_urls: Vec::new(),
            max_time: 15,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        insert_question(&db.conn().await.unwrap(), &q).await.unwrap();
        (db, q.id)
    }

    fn item(question_id: Uuid, content: &str) -> RepetitionItem {
        let now = clock::now();
        RepetitionItem {
            id: Uuid::new_v4(),
            question_id,
            content: content.into(),
            meaning: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn select_cols_quote_every_column() {
        assert_eq!(
            FILL_IN_BLANK_ANSWERS.select_cols(),
            "\"id\", \"question_id\", \"answer\", \"explain\", \"created_at\", \"updated_at\""
        );
    }

    #[test]
    fn every_kind_has_a_table() {
        for kind in VariantKind::ALL {
            assert!(!table_name(kind).is_empty());
        }
        assert_eq!(table_name(VariantKind::PhraseRepetition), "phrase_repetitions");
    }

    #[tokio::test]
    async fn insert_get_update_delete() {
        let (db, qid) = db_with_question(QuestionType::WordRepetition).await;
        let conn = db.conn().await.unwrap();

        let mut rec = item(qid, "apple");
        WORD_REPETITIONS.insert(&conn, &rec).await.unwrap();
        assert_eq!(WORD_REPETITIONS.get(&conn, rec.id).await.unwrap(), rec);

        rec.content = "banana".into();
        rec.meaning = Some("fruit".into());
        rec.updated_at = clock::now();
        WORD_REPETITIONS.update(&conn, &rec).await.unwrap();
        assert_eq!(WORD_REPETITIONS.get(&conn, rec.id).await.unwrap(), rec);

        let deleted = WORD_REPETITIONS.delete(&conn, rec.id).await.unwrap();
        assert_eq!(deleted, rec);
        assert!(matches!(
            WORD_REPETITIONS.get(&conn, rec.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let (db, qid) = db_with_question(QuestionType::WordRepetition).await;
        let conn = db.conn().await.unwrap();
        let err = WORD_REPETITIONS
            .update(&conn, &item(qid, "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_is_in_creation_order() {
        let (db, qid) = db_with_question(QuestionType::PhraseRepetition).await;
        let conn = db.conn().await.unwrap();
        let a = item(qid, "a");
        let mut b = item(qid, "b");
        b.created_at = a.created_at;
        let c = item(qid, "c");
        for rec in [&a, &b, &c] {
            PHRASE_REPETITIONS.insert(&conn, rec).await.unwrap();
        }

        let listed = PHRASE_REPETITIONS.list_by_question(&conn, qid).await.unwrap();
        let contents: Vec<&str> = listed.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
        assert!(WORD_REPETITIONS.list_by_question(&conn, qid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_singleton_row_is_a_conflict() {
        let (db, qid) = db_with_question(QuestionType::ConversationalOpen).await;
        let conn = db.conn().await.unwrap();
        let now = clock::now();
        let header = |title: &str| Conversation {
            id: Uuid::new_v4(),
            question_id: qid,
            title: title.into(),
            overview: None,
            created_at: now,
            updated_at: now,
        };
        CONVERSATIONAL_OPENS.insert(&conn, &header("first")).await.unwrap();
        let err = CONVERSATIONAL_OPENS
            .insert(&conn, &header("second"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn child_rows_cascade_with_parent() {
        let (db, qid) = db_with_question(QuestionType::WordRepetition).await;
        let conn = db.conn().await.unwrap();
        WORD_REPETITIONS.insert(&conn, &item(qid, "x")).await.unwrap();
        crate::repos::question::delete_question_row(&conn, qid)
            .await
            .unwrap();
        assert!(WORD_REPETITIONS.list_by_question(&conn, qid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn row_dispatch_roundtrip() {
        let (db, qid) = db_with_question(QuestionType::ChoiceOne).await;
        let conn = db.conn().await.unwrap();
        let now = clock::now();
        let row = VariantRow::ChoiceOneOption(ChoiceOneOption {
            id: Uuid::new_v4(),
            question_id: qid,
            option: "went".into(),
            is_correct: true,
            created_at: now,
            updated_at: now,
        });
        insert_row(&conn, &row).await.unwrap();
        let fetched = get_row(&conn, VariantKind::ChoiceOneOption, row.id())
            .await
            .unwrap();
        assert_eq!(fetched, row);
        let listed = list_rows(&conn, VariantKind::ChoiceOneOption, qid).await.unwrap();
        assert_eq!(listed, vec![row.clone()]);
        let deleted = delete_row(&conn, VariantKind::ChoiceOneOption, row.id())
            .await
            .unwrap();
        assert_eq!(deleted, row);
    }
}
