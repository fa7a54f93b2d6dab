//! # qbank-db
//!
//! libSQL relational store for qbank, the only durable source of truth.
//!
//! Holds the parent `questions` table and one child table per variant kind,
//! rebuilds the `QuestionDetail` aggregate, owns the version counter, and
//! enforces the choice-one single-correct-option rule inside write
//! transactions.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) for native FTS5 and a
//! stable async API.

pub mod aggregate;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod updates;
pub mod version;

use std::ops::Deref;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle for all question state.
///
/// Owns a single libSQL connection behind an async mutex. Every read and
/// write acquires it, and writes run inside `BEGIN IMMEDIATE ... COMMIT`, so
/// writers are serialised.
pub struct QuestionDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Mutex<libsql::Connection>,
}

impl QuestionDb {
    /// Open a local database file at the given path (or `":memory:"`).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let qdb = Self {
            db,
            conn: Mutex::new(conn),
        };
        qdb.run_migrations().await?;
        Ok(qdb)
    }

    /// Open a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if migrations fail.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open_local(":memory:").await
    }

    /// Acquire the connection for reads or single statements.
    ///
    /// A transaction left open by a cancelled writer is rolled back first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if rolling back a stale transaction fails.
    pub async fn conn(&self) -> Result<ConnGuard<'_>, DatabaseError> {
        let guard = self.conn.lock().await;
        if !guard.is_autocommit() {
            tracing::warn!("rolling back transaction abandoned by a previous writer");
            guard.execute("ROLLBACK", ()).await?;
        }
        Ok(ConnGuard(guard))
    }

    /// Acquire the connection and start an immediate (write-locking) transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction cannot be started.
    pub async fn begin(&self) -> Result<DbTransaction<'_>, DatabaseError> {
        let guard = self.conn().await?;
        guard.execute("BEGIN IMMEDIATE", ()).await?;
        Ok(DbTransaction {
            guard,
            finished: false,
        })
    }
}

/// Exclusive access to the connection for the lifetime of the guard.
pub struct ConnGuard<'a>(MutexGuard<'a, libsql::Connection>);

impl Deref for ConnGuard<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// An open `BEGIN IMMEDIATE` transaction holding the connection lock.
///
/// Finish it with [`DbTransaction::finish`], [`DbTransaction::commit`], or
/// [`DbTransaction::rollback`]. A transaction dropped unfinished is rolled back
/// by the next [`QuestionDb::conn`] call.
pub struct DbTransaction<'a> {
    guard: ConnGuard<'a>,
    finished: bool,
}

impl DbTransaction<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError` if `COMMIT` fails. The transaction is then rolled back.
    pub async fn commit(mut self) -> Result<(), DatabaseError> {
        self.finished = true;
        if let Err(e) = self.guard.execute("COMMIT", ()).await {
            if let Err(rb) = self.guard.execute("ROLLBACK", ()).await {
                tracing::warn!(error = %rb, "rollback after failed commit also failed");
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if `ROLLBACK` fails.
    pub async fn rollback(mut self) -> Result<(), DatabaseError> {
        self.finished = true;
        self.guard.execute("ROLLBACK", ()).await?;
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`, and pass the result through.
    ///
    /// # Errors
    ///
    /// Returns the original error, or the commit error if committing fails.
    pub async fn finish<T>(self, result: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rb) = self.rollback().await {
                    tracing::warn!(error = %rb, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

impl Deref for DbTransaction<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl Drop for DbTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("transaction dropped unfinished; rolled back on next acquire");
        }
    }
}
