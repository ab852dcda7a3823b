//! Clearpath Database Layer
//!
//! Persists jobs, their append-only source results, the per-job trademark
//! result and the entity-detail cache in `SQLite` through `SQLx`, with
//! embedded migrations. [`MemoryStore`] implements the same seams in process.
//!
//! # Example
//!
//! ```ignore
//! use clearpath_db::{Database, JobStore};
//!
//! let db = Database::open("clearpath.db").await?;
//! let snapshot = db.get_job(&job_id).await?;
//! ```
//!
//! # Design Principles
//!
//! - Migrations run automatically when a database is opened
//! - Collections (matches, names, flags) are stored as JSON text columns
//! - Timestamps are RFC3339 text
//! - Source results are ordered by insertion sequence, never updated

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod detail_cache;
pub mod error;
pub mod jobs;
pub mod memory;
pub mod migrations;
pub mod source_results;
pub mod store;
pub mod trademark_results;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use memory::MemoryStore;
pub use store::{DetailCache, JobStore};

use sqlx::{Pool, Sqlite};
use std::path::Path;

/// `SQLite`-backed store with migrations applied.
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database with migrations applied.
    pub async fn in_memory() -> Result<Self> {
        Self::open(connection::IN_MEMORY).await
    }

    /// Highest applied migration version.
    pub async fn schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Underlying `SQLx` pool for custom queries.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close all connections.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}
