//! Child-row mutations on `QuestionDb`.
//!
//! Every mutation runs in one write transaction: parent lookup, type check,
//! choice-one exclusivity, the row write itself, and the optional parent
//! version bump commit or roll back together.

use chrono::{DateTime, Utc};
use libsql::Connection;
use qbank_core::clock;
use qbank_core::entities::Question;
use qbank_core::enums::VariantKind;
use qbank_core::inputs::{VariantInput, VariantRow};
use uuid::Uuid;

use crate::QuestionDb;
use crate::error::DatabaseError;
use crate::repos::choice_one::clear_other_correct;
use crate::repos::question::{fetch_question, persist_bumped};
use crate::repos::variant::{delete_row, get_row, insert_row, list_rows, update_row};
use crate::updates::question::QuestionUpdate;
use crate::version::bump_for_child_change;

/// A committed child mutation and the parent as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildChange {
    pub row: VariantRow,
    pub question: Question,
}

fn ensure_kind_matches(parent: &Question, kind: VariantKind) -> Result<(), DatabaseError> {
    if kind.question_type() != parent.question_type {
        return Err(DatabaseError::Validation(format!(
            "{kind} rows cannot be attached to a {} question",
            parent.question_type
        )));
    }
    Ok(())
}

async fn exclusive_correct(
    conn: &Connection,
    row: &VariantRow,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    if let VariantRow::ChoiceOneOption(option) = row {
        if option.is_correct {
            clear_other_correct(conn, option.question_id, Some(option.id), now).await?;
        }
    }
    Ok(())
}

async fn touch_parent(
    conn: &Connection,
    parent: Question,
    bump: bool,
    now: DateTime<Utc>,
) -> Result<Question, DatabaseError> {
    if !bump {
        return Ok(parent);
    }
    let next = bump_for_child_change(&parent, now);
    persist_bumped(conn, parent.version, &QuestionUpdate::default(), &next).await?;
    Ok(next)
}

impl QuestionDb {
    /// Attach a new child row to `question_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for bad input or a kind that does not
    /// belong to the parent's type, `NotFound` for a missing parent, and
    /// `Conflict` for a second singleton row.
    pub async fn add_variant(
        &self,
        question_id: Uuid,
        input: VariantInput,
        bump_parent: bool,
    ) -> Result<ChildChange, DatabaseError> {
        input.validate()?;
        let now = clock::now();

        let tx = self.begin().await?;
        let result: Result<ChildChange, DatabaseError> = async {
            let parent = fetch_question(&tx, question_id).await?;
            ensure_kind_matches(&parent, input.kind())?;
            let row = input.into_row(Uuid::new_v4(), question_id, now, now);
            exclusive_correct(&tx, &row, now).await?;
            insert_row(&tx, &row).await?;
            let question = touch_parent(&tx, parent, bump_parent, now).await?;
            Ok(ChildChange { row, question })
        }
        .await;
        let change = tx.finish(result).await?;

        tracing::info!(
            question_id = %question_id,
            kind = %change.row.kind(),
            row_id = %change.row.id(),
            "variant row added"
        );
        Ok(change)
    }

    /// Replace the content of an existing child row.
    ///
    /// `id`, `question_id`, and `created_at` are kept; `updated_at` moves.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if `input` is of another kind or
    /// invalid, and `NotFound` if the row does not exist.
    pub async fn update_variant(
        &self,
        kind: VariantKind,
        id: Uuid,
        input: VariantInput,
        bump_parent: bool,
    ) -> Result<ChildChange, DatabaseError> {
        if input.kind() != kind {
            return Err(DatabaseError::Validation(format!(
                "cannot update a {kind} row with {} content",
                input.kind()
            )));
        }
        input.validate()?;
        let now = clock::now();

        let tx = self.begin().await?;
        let result: Result<ChildChange, DatabaseError> = async {
            let existing = get_row(&tx, kind, id).await?;
            let (id, question_id, created_at) = existing.identity();
            let parent = fetch_question(&tx, question_id).await?;
            let row = input.into_row(id, question_id, created_at, now);
            exclusive_correct(&tx, &row, now).await?;
            update_row(&tx, &row).await?;
            let question = touch_parent(&tx, parent, bump_parent, now).await?;
            Ok(ChildChange { row, question })
        }
        .await;
        let change = tx.finish(result).await?;

        tracing::info!(kind = %kind, row_id = %id, "variant row updated");
        Ok(change)
    }

    /// Delete a child row and return it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the row does not exist.
    pub async fn delete_variant(
        &self,
        kind: VariantKind,
        id: Uuid,
        bump_parent: bool,
    ) -> Result<ChildChange, DatabaseError> {
        let now = clock::now();

        let tx = self.begin().await?;
        let result: Result<ChildChange, DatabaseError> = async {
            let row = delete_row(&tx, kind, id).await?;
            let parent = fetch_question(&tx, row.question_id()).await?;
            let question = touch_parent(&tx, parent, bump_parent, now).await?;
            Ok(ChildChange { row, question })
        }
        .await;
        let change = tx.finish(result).await?;

        tracing::info!(kind = %kind, row_id = %id, "variant row deleted");
        Ok(change)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the row does not exist.
    pub async fn get_variant(&self, kind: VariantKind, id: Uuid) -> Result<VariantRow, DatabaseError> {
        let conn = self.conn().await?;
        get_row(&conn, kind, id).await
    }

    /// Rows of one kind for one parent, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a row fails to parse.
    pub async fn list_variants(
        &self,
        question_id: Uuid,
        kind: VariantKind,
    ) -> Result<Vec<VariantRow>, DatabaseError> {
        let conn = self.conn().await?;
        list_rows(&conn, kind, question_id).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qbank_core::enums::QuestionType;
    use qbank_core::inputs::NewQuestion;

    use super::*;
    use crate::repos::choice_one::correct_option_count;

    async fn setup(question_type: QuestionType) -> (QuestionDb, Question) {
        let db = QuestionDb::open_in_memory().await.unwrap();
        let q = db
            .create_question(NewQuestion {
                question_type,
                topic: vec!["grammar".into()],
                instruction: "Choose".into(),
                image_urls: Vec::new(),
                max_time: 30,
            })
            .await
            .unwrap();
        (db, q)
    }

    fn option(text: &str, is_correct: bool) -> VariantInput {
        VariantInput::ChoiceOneOption {
            option: text.into(),
            is_correct,
        }
    }

    async fn is_correct(db: &QuestionDb, id: Uuid) -> bool {
        match db.get_variant(VariantKind::ChoiceOneOption, id).await.unwrap() {
            VariantRow::ChoiceOneOption(o) => o.is_correct,
            other => panic!("unexpected row {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_variant_leaves_version_by_default() {
        let (db, q) = setup(QuestionType::FillInBlank).await;
        let change = db
            .add_variant(
                q.id,
                VariantInput::FillInBlankAnswer {
                    answer: "went".into(),
                    explain: None,
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(change.question.version, 1);
        assert_eq!(db.get_question(q.id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn add_variant_bumps_when_asked() {
        let (db, q) = setup(QuestionType::FillInBlank).await;
        let change = db
            .add_variant(
                q.id,
                VariantInput::FillInBlankAnswer {
                    answer: "went".into(),
                    explain: None,
                },
                true,
            )
            .await
            .unwrap();
        assert_eq!(change.question.version, 2);
        assert_eq!(db.get_question(q.id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn kind_must_match_parent_type() {
        let (db, q) = setup(QuestionType::FillInBlank).await;
        let err = db
            .add_variant(q.id, option("a", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let db = QuestionDb::open_in_memory().await.unwrap();
        let err = db
            .add_variant(Uuid::new_v4(), option("a", false), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn setting_a_correct_option_clears_the_previous_one() {
        let (db, q) = setup(QuestionType::ChoiceOne).await;
        let a = db.add_variant(q.id, option("a", true), false).await.unwrap();
        let b = db.add_variant(q.id, option("b", false), false).await.unwrap();

        db.update_variant(VariantKind::ChoiceOneOption, b.row.id(), option("b", true), false)
            .await
            .unwrap();

        assert!(!is_correct(&db, a.row.id()).await);
        assert!(is_correct(&db, b.row.id()).await);
        let conn = db.conn().await.unwrap();
        assert_eq!(correct_option_count(&conn, q.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn creating_a_correct_option_clears_the_previous_one() {
        let (db, q) = setup(QuestionType::ChoiceOne).await;
        let a = db.add_variant(q.id, option("a", true), false).await.unwrap();
        let c = db.add_variant(q.id, option("c", true), false).await.unwrap();

        assert!(!is_correct(&db, a.row.id()).await);
        assert!(is_correct(&db, c.row.id()).await);
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let (db, q) = setup(QuestionType::OpenParagraph).await;
        let added = db
            .add_variant(
                q.id,
                VariantInput::OpenParagraphPrompt {
                    question: "Describe your city".into(),
                    example_answer: None,
                },
                false,
            )
            .await
            .unwrap();
        let updated = db
            .update_variant(
                VariantKind::OpenParagraphPrompt,
                added.row.id(),
                VariantInput::OpenParagraphPrompt {
                    question: "Describe your home town".into(),
                    example_answer: Some("I grew up in Hue".into()),
                },
                false,
            )
            .await
            .unwrap();

        assert_eq!(updated.row.identity(), added.row.identity());
        assert_eq!(
            db.get_variant(VariantKind::OpenParagraphPrompt, added.row.id())
                .await
                .unwrap(),
            updated.row
        );
    }

    #[tokio::test]
    async fn update_with_other_kind_is_rejected() {
        let (db, q) = setup(QuestionType::ChoiceOne).await;
        let a = db.add_variant(q.id, option("a", false), false).await.unwrap();
        let err = db
            .update_variant(
                VariantKind::ChoiceOneOption,
                a.row.id(),
                VariantInput::ChoiceOneQuestion {
                    question: "stem".into(),
                    explain: None,
                },
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_variant_returns_row() {
        let (db, q) = setup(QuestionType::WordRepetition).await;
        let added = db
            .add_variant(
                q.id,
                VariantInput::WordRepetition {
                    content: "apple".into(),
                    meaning: None,
                },
                false,
            )
            .await
            .unwrap();
        let deleted = db
            .delete_variant(VariantKind::WordRepetition, added.row.id(), false)
            .await
            .unwrap();
        assert_eq!(deleted.row, added.row);
        assert!(db
            .list_variants(q.id, VariantKind::WordRepetition)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_rolls_back() {
        let (db, q) = setup(QuestionType::ConversationalOpen).await;
        let header = |title: &str| VariantInput::ConversationalOpen {
            title: title.into(),
            overview: None,
        };
        db.add_variant(q.id, header("first"), true).await.unwrap();
        let err = db.add_variant(q.id, header("second"), true).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));

        // Only the first call bumped the version.
        assert_eq!(db.get_question(q.id).await.unwrap().version, 2);
        assert_eq!(
            db.list_variants(q.id, VariantKind::ConversationalOpen)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
