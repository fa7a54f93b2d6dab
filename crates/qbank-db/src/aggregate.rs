//! Aggregate Builder: question id -> parent row + type-dispatched variant payload.

use libsql::Connection;
use qbank_core::aggregate::{QuestionDetail, VariantPayload};
use qbank_core::entities::Question;
use qbank_core::enums::QuestionType;
use uuid::Uuid;

use crate::QuestionDb;
use crate::error::DatabaseError;
use crate::repos::question::fetch_question;
use crate::repos::variant::{
    CHOICE_ONE_OPTIONS, CHOICE_ONE_QUESTIONS, CONVERSATIONAL_OPENS, CONVERSATIONAL_REPETITION_TURNS,
    CONVERSATIONAL_REPETITIONS, ERROR_IDENTIFICATIONS, FILL_IN_BLANK_ANSWERS,
    OPEN_PARAGRAPH_PROMPTS, PARAGRAPH_REPETITIONS, PHRASE_REPETITIONS, SENTENCE_TRANSFORMATIONS,
    WORD_REPETITIONS,
};

/// Load the child rows of `question` according to its type.
///
/// Singleton parts take the first row by creation order; multi-row parts are
/// returned oldest first.
///
/// # Errors
///
/// Returns `DatabaseError` if a child row fails to load.
pub async fn load_payload(
    conn: &Connection,
    question: &Question,
) -> Result<VariantPayload, DatabaseError> {
    let qid = question.id;
    let payload = match question.question_type {
        QuestionType::FillInBlank => VariantPayload::FillInBlank {
            answers: FILL_IN_BLANK_ANSWERS.list_by_question(conn, qid).await?,
        },
        QuestionType::ChoiceOne => VariantPayload::ChoiceOne {
            question: CHOICE_ONE_QUESTIONS.first_by_question(conn, qid).await?,
            options: CHOICE_ONE_OPTIONS.list_by_question(conn, qid).await?,
        },
        QuestionType::ErrorIdentification => VariantPayload::ErrorIdentification {
            detail: ERROR_IDENTIFICATIONS.first_by_question(conn, qid).await?,
        },
        QuestionType::SentenceTransformation => VariantPayload::SentenceTransformation {
            detail: SENTENCE_TRANSFORMATIONS.first_by_question(conn, qid).await?,
        },
        QuestionType::WordRepetition => VariantPayload::WordRepetition {
            items: WORD_REPETITIONS.list_by_question(conn, qid).await?,
        },
        QuestionType::PhraseRepetition => VariantPayload::PhraseRepetition {
            items: PHRASE_REPETITIONS.list_by_question(conn, qid).await?,
        },
        QuestionType::ParagraphRepetition => VariantPayload::ParagraphRepetition {
            items: PARAGRAPH_REPETITIONS.list_by_question(conn, qid).await?,
        },
        QuestionType::OpenParagraph => VariantPayload::OpenParagraph {
            prompts: OPEN_PARAGRAPH_PROMPTS.list_by_question(conn, qid).await?,
        },
        QuestionType::ConversationalRepetition => VariantPayload::ConversationalRepetition {
            conversation: CONVERSATIONAL_REPETITIONS.first_by_question(conn, qid).await?,
            turns: CONVERSATIONAL_REPETITION_TURNS
                .list_by_question(conn, qid)
                .await?,
        },
        QuestionType::ConversationalOpen => VariantPayload::ConversationalOpen {
            conversation: CONVERSATIONAL_OPENS.first_by_question(conn, qid).await?,
        },
    };
    Ok(payload)
}

/// Rebuild the aggregate of one question from committed rows.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the parent is absent,
/// `DatabaseError::UnknownType` if its `type` is unrecognised, or any
/// row-parsing error.
pub async fn load_detail(conn: &Connection, id: Uuid) -> Result<QuestionDetail, DatabaseError> {
    let question = fetch_question(conn, id).await?;
    let payload = load_payload(conn, &question).await?;
    Ok(QuestionDetail { question, payload })
}

impl QuestionDb {
    /// # Errors
    ///
    /// See [`load_detail`].
    pub async fn load_detail(&self, id: Uuid) -> Result<QuestionDetail, DatabaseError> {
        let conn = self.conn().await?;
        load_detail(&conn, id).await
    }
}
