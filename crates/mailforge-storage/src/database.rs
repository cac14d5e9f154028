// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use mailforge_core::MailforgeError;
use tracing::debug;

use crate::migrations;

/// Handle to the single SQLite connection used for all storage operations.
///
/// Opening runs PRAGMA setup and all pending migrations. Cloning the inner
/// `tokio_rusqlite::Connection` is cheap and shares the same background
/// writer thread.
#[derive(Clone)]
pub struct Database {
    connection: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, apply PRAGMAs,
    /// and run migrations. `wal_mode` switches the journal to write-ahead
    /// logging; rollback journaling otherwise.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, MailforgeError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| MailforgeError::Storage {
                source: Box::new(e),
            })?;
        }

        let connection = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| MailforgeError::Storage {
                source: Box::new(e),
            })?;

        connection
            .call(move |conn| {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch(
                    "PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )?;
                migrations::run_migrations(conn)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { connection })
    }

    /// The shared connection handle. All query modules go through this.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.connection
    }

    /// Checkpoint the WAL and close the background thread.
    pub async fn close(&self) -> Result<(), MailforgeError> {
        self.connection
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> MailforgeError {
    MailforgeError::Storage {
        source: Box::new(e),
    }
}
