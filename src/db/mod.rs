//! Database abstraction layer.
//!
//! [`SnippetStore`] defines the interface for persisting reviewed snippets.
//! The default implementation is [`sqlite::SqliteStore`]. To swap to another
//! database (Postgres, MySQL, …), implement [`SnippetStore`] for your new
//! type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::review::Review;

/// Separator used to flatten the suggestion list into one column.
///
/// This encoding is lossy: a suggestion that itself contains `"; "` merges
/// ambiguously with its neighbours when split back. Accepted trade-off for a
/// single-column layout; see the round-trip test in [`sqlite`].
pub const SUGGESTION_SEPARATOR: &str = "; ";

/// Snippet + review fields headed for insertion; the row id does not exist yet.
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub language: String,
    pub code: String,
    pub user: String,
    pub filename: Option<String>,
    pub lines: Option<String>,
    pub commit_hash: Option<String>,
    pub review_summary: String,
    /// Suggestions pre-joined with [`SUGGESTION_SEPARATOR`].
    pub review_suggestions: String,
    pub review_severity: String,
    pub created_at: DateTime<Utc>,
}

/// A single row in the `snippets` table.
#[derive(Debug, Clone)]
pub struct StoredSnippet {
    /// Primary key, assigned by the database on insert.
    pub id: i64,
    pub language: String,
    pub code: String,
    pub user: String,
    pub filename: Option<String>,
    pub lines: Option<String>,
    pub commit_hash: Option<String>,
    pub review_summary: String,
    pub review_suggestions: String,
    pub review_severity: String,
    pub created_at: DateTime<Utc>,
}

impl StoredSnippet {
    /// Reconstruct the [`Review`] baked into this row.
    ///
    /// Splits the flattened suggestion column back on
    /// [`SUGGESTION_SEPARATOR`]; the result may differ from the original
    /// list when a suggestion contained the separator.
    pub fn review(&self) -> Review {
        Review {
            id: Some(self.id),
            summary: self.review_summary.clone(),
            suggestions: split_suggestions(&self.review_suggestions),
            severity: crate::review::Severity::parse(&self.review_severity),
        }
    }
}

/// Join suggestions into the single stored column.
pub fn join_suggestions(suggestions: &[String]) -> String {
    suggestions.join(SUGGESTION_SEPARATOR)
}

/// Split the stored column back into a suggestion list.
pub fn split_suggestions(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined
        .split(SUGGESTION_SEPARATOR)
        .map(str::to_owned)
        .collect()
}

/// Trait for persisting reviewed snippets.
///
/// Implement this trait to swap SQLite for another database backend without
/// touching any handler code.
pub trait SnippetStore: Send + Sync + 'static {
    /// Insert a new row and return its database-assigned id.
    fn insert_snippet(
        &self,
        snippet: NewSnippet,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Retrieve a single row by id.
    fn get_snippet(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<StoredSnippet>, sqlx::Error>> + Send;

    /// Retrieve all rows in insertion order.
    fn list_snippets(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<StoredSnippet>, sqlx::Error>> + Send;

    /// Delete a row by id. Returns `true` if a row was removed.
    fn delete_snippet(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Delete every row unconditionally. Returns the number of rows removed.
    fn wipe_snippets(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, sqlx::Error>> + Send;
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn join_and_split_round_trip_for_clean_suggestions() {
        let original = vec!["Add tests".to_owned(), "Rename foo".to_owned()];
        let joined = join_suggestions(&original);
        assert_eq!(joined, "Add tests; Rename foo");
        assert_eq!(split_suggestions(&joined), original);
    }

    #[test]
    fn split_of_empty_column_is_empty_list() {
        assert!(split_suggestions("").is_empty());
        assert_eq!(join_suggestions(&[]), "");
    }

    // Known lossy-encoding boundary: a suggestion containing the separator
    // merges ambiguously with its neighbours.
    #[test]
    fn join_is_lossy_when_suggestion_contains_separator() {
        let original = vec!["Use X; then Y".to_owned(), "Add tests".to_owned()];
        let joined = join_suggestions(&original);
        let restored = split_suggestions(&joined);
        assert_ne!(restored, original);
        assert_eq!(restored, vec!["Use X", "then Y", "Add tests"]);
    }
}
