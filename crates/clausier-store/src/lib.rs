//! Clausier Storage Layer
//!
//! Implements the `ClauseStore` trait over SQLite.
//!
//! Documents and their clauses live in two tables; clause order is the
//! persisted `order_index`, so a stored result reads back in exactly the
//! order the orchestrator finalized it. Saving a document replaces any
//! prior result for the same id.
//!
//! # Thread Safety
//!
//! SQLite connections are not thread-safe; callers share a store through
//! `Arc<Mutex<SqliteStore>>`.
//!
//! # Examples
//!
//! ```
//! use clausier_store::SqliteStore;
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! ```

#![warn(missing_docs)]

use clausier_domain::{
    Clause, ClauseId, ClauseStore, Document, DocumentId, ExtractionMetadata, ExtractionResult,
    ExtractionStatus, ExtractionSummary, StoredExtraction,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data did not round-trip
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-backed implementation of `ClauseStore`.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store, useful for testing.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    fn status_to_str(status: ExtractionStatus) -> &'static str {
        match status {
            ExtractionStatus::Processing => "processing",
            ExtractionStatus::Completed => "completed",
            ExtractionStatus::Partial => "partial",
            ExtractionStatus::Failed => "failed",
        }
    }

    fn str_to_status(s: &str) -> Result<ExtractionStatus, StoreError> {
        match s {
            "processing" => Ok(ExtractionStatus::Processing),
            "completed" => Ok(ExtractionStatus::Completed),
            "partial" => Ok(ExtractionStatus::Partial),
            "failed" => Ok(ExtractionStatus::Failed),
            other => Err(StoreError::InvalidData(format!("Unknown status: {}", other))),
        }
    }

    fn indices_to_json(indices: &BTreeSet<usize>) -> String {
        serde_json::to_string(&indices.iter().collect::<Vec<_>>()).unwrap_or_else(|_| "[]".into())
    }

    fn json_to_indices(json: &str) -> Result<BTreeSet<usize>, StoreError> {
        serde_json::from_str::<Vec<usize>>(json)
            .map(|v| v.into_iter().collect())
            .map_err(|e| StoreError::InvalidData(format!("Bad chunk index list: {}", e)))
    }

    fn load_clauses(&self, id: &DocumentId) -> Result<Vec<Clause>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT clause_id, title, content, clause_type, page_number, start_position, end_position
             FROM clauses WHERE document_id = ?1 ORDER BY order_index",
        )?;

        let rows = stmt.query_map(params![id.to_string()], |row| {
            let clause_id_str: String = row.get(0)?;
            let page_number: Option<i64> = row.get(4)?;
            Ok((
                clause_id_str,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                page_number,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut clauses = Vec::new();
        for row in rows {
            let (clause_id_str, title, content, clause_type, page_number, start, end) = row?;
            let clause_id = ClauseId::parse(&clause_id_str).map_err(StoreError::InvalidData)?;
            clauses.push(Clause {
                clause_id,
                title,
                content,
                clause_type,
                page_number: page_number.and_then(|n| u32::try_from(n).ok()),
                start_position: start as usize,
                end_position: end as usize,
            });
        }
        Ok(clauses)
    }
}

impl ClauseStore for SqliteStore {
    type Error = StoreError;

    fn save(&mut self, document: &Document, result: &ExtractionResult) -> Result<(), Self::Error> {
        // processed_at stays NULL until the run reaches a terminal state
        let processed_at: Option<i64> = result.metadata.status.is_terminal().then(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64
        });

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO documents
             (id, filename, byte_size, uploaded_at, processed_at, status,
              processing_time_seconds, total_clauses, chunks_processed, text_length,
              failed_chunks, repaired_chunks)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                document.id.to_string(),
                document.filename,
                document.byte_size as i64,
                document.uploaded_at as i64,
                processed_at,
                Self::status_to_str(result.metadata.status),
                result.metadata.processing_time_seconds,
                result.metadata.total_clauses as i64,
                result.metadata.chunks_processed as i64,
                result.metadata.text_length as i64,
                Self::indices_to_json(&result.metadata.failed_chunk_indices),
                Self::indices_to_json(&result.metadata.repaired_chunk_indices),
            ],
        )?;

        tx.execute(
            "DELETE FROM clauses WHERE document_id = ?1",
            params![document.id.to_string()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO clauses
                 (document_id, order_index, clause_id, title, content, clause_type,
                  page_number, start_position, end_position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (idx, clause) in result.clauses.iter().enumerate() {
                stmt.execute(params![
                    document.id.to_string(),
                    idx as i64,
                    clause.clause_id.to_string(),
                    clause.title,
                    clause.content,
                    clause.clause_type,
                    clause.page_number.map(|n| n as i64),
                    clause.start_position as i64,
                    clause.end_position as i64,
                ])?;
            }
        }

        tx.commit()?;
        debug!(document_id = %document.id, clauses = result.clauses.len(), "Saved extraction");
        Ok(())
    }

    fn get(&self, id: &DocumentId) -> Result<Option<StoredExtraction>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT filename, byte_size, uploaded_at, processed_at, status,
                        processing_time_seconds, total_clauses, chunks_processed,
                        text_length, failed_chunks, repaired_chunks
                 FROM documents WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, f64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, i64>(7)?,
                        row.get::<_, i64>(8)?,
                        row.get::<_, String>(9)?,
                        row.get::<_, String>(10)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            filename,
            byte_size,
            uploaded_at,
            processed_at,
            status_str,
            processing_time_seconds,
            total_clauses,
            chunks_processed,
            text_length,
            failed_json,
            repaired_json,
        )) = row
        else {
            return Ok(None);
        };

        let status = Self::str_to_status(&status_str)?;
        let clauses = self.load_clauses(id)?;

        let summary = ExtractionSummary {
            document_id: *id,
            filename,
            byte_size: byte_size as usize,
            uploaded_at: uploaded_at as u64,
            processed_at: processed_at.map(|t| t as u64),
            total_clauses: total_clauses as usize,
            status,
        };

        let result = ExtractionResult {
            document_id: *id,
            clauses,
            metadata: ExtractionMetadata {
                total_clauses: total_clauses as usize,
                processing_time_seconds,
                status,
                failed_chunk_indices: Self::json_to_indices(&failed_json)?,
                repaired_chunk_indices: Self::json_to_indices(&repaired_json)?,
                chunks_processed: chunks_processed as usize,
                text_length: text_length as usize,
            },
        };

        Ok(Some(StoredExtraction { summary, result }))
    }

    fn list(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<ExtractionSummary>, usize), Self::Error> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;

        let page = page.max(1);
        let offset = (page - 1).saturating_mul(page_size);

        let mut stmt = self.conn.prepare(
            "SELECT id, filename, byte_size, uploaded_at, processed_at, status, total_clauses
             FROM documents
             ORDER BY uploaded_at DESC, id
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![page_size as i64, offset as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<i64>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id_str, filename, byte_size, uploaded_at, processed_at, status_str, total_clauses) =
                row?;
            summaries.push(ExtractionSummary {
                document_id: DocumentId::parse(&id_str).map_err(StoreError::InvalidData)?,
                filename,
                byte_size: byte_size as usize,
                uploaded_at: uploaded_at as u64,
                processed_at: processed_at.map(|t| t as u64),
                total_clauses: total_clauses as usize,
                status: Self::str_to_status(&status_str)?,
            });
        }

        Ok((summaries, total as usize))
    }
}
