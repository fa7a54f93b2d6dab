//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::QuestionDb;
use crate::error::DatabaseError;

/// Parent `questions` table.
const MIGRATION_001: &str = include_str!("../migrations/001_questions.sql");
/// 12 variant tables, 5 singleton unique indexes.
const MIGRATION_002: &str = include_str!("../migrations/002_variants.sql");

impl QuestionDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let conn = self.conn().await?;
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_questions: {e}")))?;
        conn.execute_batch(MIGRATION_002)
            .await
            .map_err(|e| DatabaseError::Migration(format!("002_variants: {e}")))?;
        Ok(())
    }
}
