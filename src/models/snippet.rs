//! Snippet API request / response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::StoredSnippet;
use crate::review::Review;

/// Optional provenance attached to a submitted snippet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CodeMetadata {
    /// Originating file name, e.g. `"main.rs"`.
    pub filename: String,
    /// Line range within the file, e.g. `"10-42"`.
    pub lines: String,
    /// Commit the snippet was taken from.
    pub commit_hash: String,
}

/// Request body for `POST /snippets`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateSnippetRequest {
    /// Programming language of the snippet.
    #[validate(length(min = 1, message = "language must not be empty"))]
    pub language: String,
    /// The raw code to review.
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    /// Submitting user.
    #[validate(length(min = 1, message = "user must not be empty"))]
    pub user: String,
    /// Optional provenance metadata.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<CodeMetadata>,
}

/// Full stored record, returned by `GET /snippets/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnippetResponse {
    pub id: i64,
    pub language: String,
    pub code: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CodeMetadata>,
    pub review: Review,
    pub created_at: String,
}

/// Summary projection, returned by `GET /snippets`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnippetSummary {
    pub id: i64,
    pub language: String,
    pub user: String,
    pub review_summary: String,
    pub review_severity: String,
}

/// Response body for `DELETE /snippets/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    /// `true` when a row was actually removed.
    pub deleted: bool,
    pub message: String,
}

/// Response body for `DELETE /snippets`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WipeResponse {
    /// Number of rows removed.
    pub deleted: u64,
    pub message: String,
}

impl StoredSnippet {
    /// Project the row into the full API response.
    ///
    /// The three metadata columns collapse back into one optional structure:
    /// absent only when none of them were stored.
    pub fn to_response(&self) -> SnippetResponse {
        let metadata = if self.filename.is_none() && self.lines.is_none() && self.commit_hash.is_none()
        {
            None
        } else {
            Some(CodeMetadata {
                filename: self.filename.clone().unwrap_or_default(),
                lines: self.lines.clone().unwrap_or_default(),
                commit_hash: self.commit_hash.clone().unwrap_or_default(),
            })
        };
        SnippetResponse {
            id: self.id,
            language: self.language.clone(),
            code: self.code.clone(),
            user: self.user.clone(),
            metadata,
            review: self.review(),
            created_at: self.created_at.to_rfc3339(),
        }
    }

    /// Project the row into the list-view summary.
    pub fn to_summary(&self) -> SnippetSummary {
        SnippetSummary {
            id: self.id,
            language: self.language.clone(),
            user: self.user.clone(),
            review_summary: self.review_summary.clone(),
            review_severity: self.review_severity.clone(),
        }
    }
}
