//! SQLite implementation of [`SnippetStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature. Migrations are run automatically
//! on startup via [`SqliteStore::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR` (the crate root), so the directory is
//! embedded into the binary. The database file location is determined at
//! runtime by the `REVIEWD_DATABASE_URL` environment variable and is **not**
//! related to the current working directory at runtime.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used deliberately so that no
//! `DATABASE_URL` environment variable is needed at compile time.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use super::{NewSnippet, SnippetStore, StoredSnippet};

type SnippetRow = (
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
    String,
);

/// SQLite-backed snippet store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://reviewd.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        // An in-memory database exists per connection, so the pool must be
        // pinned to a single connection that never gets recycled.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await?
        } else {
            SqlitePool::connect(url).await?
        };
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn row_to_snippet(row: SnippetRow) -> StoredSnippet {
    let (
        id,
        language,
        code,
        user,
        filename,
        lines,
        commit_hash,
        review_summary,
        review_suggestions,
        review_severity,
        created_at,
    ) = row;
    StoredSnippet {
        id,
        language,
        code,
        user,
        filename,
        lines,
        commit_hash,
        review_summary,
        review_suggestions,
        review_severity,
        created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
            tracing::warn!(raw = %created_at, error = %e, "failed to parse snippet created_at; using now");
            Utc::now()
        }),
    }
}

const SELECT_COLUMNS: &str = "id, language, code, user, filename, lines, commit_hash, \
     review_summary, review_suggestions, review_severity, created_at";

impl SnippetStore for SqliteStore {
    async fn insert_snippet(&self, snippet: NewSnippet) -> Result<i64, sqlx::Error> {
        let created_at = snippet.created_at.to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO snippets (language, code, user, filename, lines, commit_hash, \
             review_summary, review_suggestions, review_severity, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&snippet.language)
        .bind(&snippet.code)
        .bind(&snippet.user)
        .bind(&snippet.filename)
        .bind(&snippet.lines)
        .bind(&snippet.commit_hash)
        .bind(&snippet.review_summary)
        .bind(&snippet.review_suggestions)
        .bind(&snippet.review_severity)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_snippet(&self, id: i64) -> Result<Option<StoredSnippet>, sqlx::Error> {
        let row: Option<SnippetRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM snippets WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_snippet))
    }

    async fn list_snippets(&self) -> Result<Vec<StoredSnippet>, sqlx::Error> {
        let rows: Vec<SnippetRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM snippets ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_snippet).collect())
    }

    async fn delete_snippet(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM snippets WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn wipe_snippets(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM snippets")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
