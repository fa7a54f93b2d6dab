//! libSQL-backed [`SearchBackend`] with an FTS5 index over instruction,
//! topic, and content.
//!
//! FTS5 uses porter stemming: "went to schools" matches "school".

use std::str::FromStr;

use async_trait::async_trait;
use libsql::{Builder, Connection};
use qbank_core::enums::{CompletionStatus, QuestionType};
use qbank_core::search::{SearchDocument, SearchFilter, SearchPage};
use qbank_db::error::DatabaseError;
use qbank_db::helpers::{encode_string_list, fmt_datetime, parse_datetime, parse_string_list, parse_uuid};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::SearchBackend;
use crate::error::SearchError;

const MIGRATION_001: &str = include_str!("../migrations/001_search_documents.sql");

const SELECT_COLS: &str = "d.id, d.type, d.skill, d.topic, d.instruction, d.image_urls, d.max_time, \
     d.version, d.status, d.content, d.item_count, d.payload, d.updated_at";

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Search index stored in its own libSQL database.
pub struct LibsqlSearchIndex {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Mutex<Connection>,
    default_page_size: u32,
    max_page_size: u32,
}

impl LibsqlSearchIndex {
    /// Open (or create) the index at `path`, or `":memory:"`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Database` if the database cannot be opened or the
    /// schema cannot be created.
    pub async fn open_local(path: &str) -> Result<Self, SearchError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.execute_batch(MIGRATION_001).await?;
        Ok(Self {
            db,
            conn: Mutex::new(conn),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        })
    }

    /// # Errors
    ///
    /// Same as [`Self::open_local`].
    pub async fn open_in_memory() -> Result<Self, SearchError> {
        Self::open_local(":memory:").await
    }

    /// Page size used when a filter sets none, and the upper clamp.
    #[must_use]
    pub const fn with_page_sizes(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }
}

/// Turn free text into an FTS5 query: every whitespace-separated term with a
/// letter or digit is quoted, terms implicitly AND-ed.
fn fts_query(text: &str) -> Result<String, SearchError> {
    let terms: Vec<String> = text
        .split_whitespace()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        return Err(SearchError::InvalidQuery(
            "search text cannot be empty".to_string(),
        ));
    }
    Ok(terms.join(" "))
}

/// WHERE clause (after `FROM ... d`), bound parameters, and whether the FTS
/// table is joined.
fn build_where(filter: &SearchFilter) -> Result<(String, Vec<libsql::Value>, bool), SearchError> {
    let mut clauses = vec!["1=1".to_string()];
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut uses_fts = false;

    if let Some(text) = &filter.text {
        params.push(fts_query(text)?.into());
        clauses.push(format!("search_documents_fts MATCH ?{}", params.len()));
        uses_fts = true;
    }
    if let Some(t) = filter.question_type {
        params.push(t.as_str().into());
        clauses.push(format!("d.type = ?{}", params.len()));
    }
    if let Some(skill) = filter.skill {
        params.push(skill.as_str().into());
        clauses.push(format!("d.skill = ?{}", params.len()));
    }
    if let Some(status) = filter.status {
        params.push(status.as_str().into());
        clauses.push(format!("d.status = ?{}", params.len()));
    }
    if let Some(topic) = &filter.topic {
        params.push(topic.trim().to_string().into());
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(d.topic) WHERE json_each.value = ?{})",
            params.len()
        ));
    }

    Ok((clauses.join(" AND "), params, uses_fts))
}

fn row_error(msg: String) -> SearchError {
    SearchError::Row(DatabaseError::Query(msg))
}

fn row_to_document(row: &libsql::Row) -> Result<SearchDocument, SearchError> {
    let question_type = QuestionType::from_str(&row.get::<String>(1)?)
        .map_err(|e| row_error(e.to_string()))?;
    let status = CompletionStatus::from_str(&row.get::<String>(8)?)
        .map_err(|e| row_error(e.to_string()))?;
    let max_time = u32::try_from(row.get::<i64>(6)?)
        .map_err(|e| row_error(format!("max_time out of range: {e}")))?;
    let item_count = usize::try_from(row.get::<i64>(10)?)
        .map_err(|e| row_error(format!("item_count out of range: {e}")))?;

    Ok(SearchDocument {
        id: parse_uuid(&row.get::<String>(0)?)?,
        question_type,
        skill: question_type.skill(),
        topic: parse_string_list(&row.get::<String>(3)?)?,
        instruction: row.get(4)?,
        image_urls: parse_string_list(&row.get::<String>(5)?)?,
        max_time,
        version: row.get(7)?,
        status,
        content: row.get(9)?,
        item_count,
        payload: serde_json::from_str(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

#[async_trait]
impl SearchBackend for LibsqlSearchIndex {
    async fn upsert(&self, doc: &SearchDocument) -> Result<(), SearchError> {
        let params: Vec<libsql::Value> = vec![
            doc.id.to_string().into(),
            doc.question_type.as_str().into(),
            doc.skill.as_str().into(),
            encode_string_list(&doc.topic)?.into(),
            doc.instruction.clone().into(),
            encode_string_list(&doc.image_urls)?.into(),
            i64::from(doc.max_time).into(),
            doc.version.into(),
            doc.status.as_str().into(),
            doc.content.clone().into(),
            i64::try_from(doc.item_count).unwrap_or(i64::MAX).into(),
            serde_json::to_string(&doc.payload)?.into(),
            fmt_datetime(&doc.updated_at).into(),
        ];

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO search_documents (id, type, skill, topic, instruction, image_urls, \
             max_time, version, status, content, item_count, payload, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
             ON CONFLICT(id) DO UPDATE SET type = excluded.type, skill = excluded.skill, \
             topic = excluded.topic, instruction = excluded.instruction, \
             image_urls = excluded.image_urls, max_time = excluded.max_time, \
             version = excluded.version, status = excluded.status, content = excluded.content, \
             item_count = excluded.item_count, payload = excluded.payload, \
             updated_at = excluded.updated_at",
            libsql::params_from_iter(params),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, SearchError> {
        let conn = self.conn.lock().await;
        let affected = conn
            .execute(
                "DELETE FROM search_documents WHERE id = ?1",
                [id.to_string()],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SearchDocument>, SearchError> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM search_documents d WHERE d.id = ?1"),
                [id.to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_document(&row)?)),
            None => Ok(None),
        }
    }

    async fn search(&self, filter: &SearchFilter) -> Result<SearchPage<SearchDocument>, SearchError> {
        let (page, page_size) = filter.paging(self.default_page_size, self.max_page_size);
        let (where_sql, params, uses_fts) = build_where(filter)?;
        let from = if uses_fts {
            "search_documents d JOIN search_documents_fts ON search_documents_fts.rowid = d.rowid"
        } else {
            "search_documents d"
        };
        let order = if uses_fts {
            "search_documents_fts.rank, d.updated_at DESC, d.id"
        } else {
            "d.updated_at DESC, d.id"
        };

        let conn = self.conn.lock().await;

        let mut count_rows = conn
            .query(
                &format!("SELECT COUNT(*) FROM {from} WHERE {where_sql}"),
                libsql::params_from_iter(params.clone()),
            )
            .await?;
        let total = match count_rows.next().await? {
            Some(row) => u64::try_from(row.get::<i64>(0)?).unwrap_or_default(),
            None => 0,
        };

        let offset = u64::from(page - 1) * u64::from(page_size);
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM {from} WHERE {where_sql} \
                     ORDER BY {order} LIMIT {page_size} OFFSET {offset}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_document(&row)?);
        }

        Ok(SearchPage {
            items,
            total,
            page,
            page_size,
        })
    }
}
