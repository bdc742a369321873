//! Snippet submission / retrieval / deletion routes.
//!
//! `POST /snippets` runs the full review workflow: validate the body, ask the
//! review generator for a structured review, persist snippet + review as one
//! row, and return the review with its freshly assigned id. The remaining
//! routes are thin projections over the store.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::{info, warn};
use utoipa::OpenApi;
use validator::Validate;

use crate::db::{join_suggestions, NewSnippet, SnippetStore};
use crate::error::ServerError;
use crate::models::snippet::{
    CodeMetadata, CreateSnippetRequest, DeleteResponse, SnippetResponse, SnippetSummary,
    WipeResponse,
};
use crate::review::Review;
use crate::state::AppState;

/// Maximum accepted snippet size in bytes; larger bodies are rejected before
/// any provider call.
const MAX_CODE_BYTES: usize = 128 * 1024; // 128 KiB

#[derive(OpenApi)]
#[openapi(
    paths(create_snippet, get_snippet, list_snippets, delete_snippet, wipe_snippets),
    components(schemas(
        CreateSnippetRequest,
        CodeMetadata,
        Review,
        SnippetResponse,
        SnippetSummary,
        DeleteResponse,
        WipeResponse
    ))
)]
pub struct SnippetsApi;

/// Register snippet routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/snippets",
            post(create_snippet).get(list_snippets).delete(wipe_snippets),
        )
        .route("/snippets/{id}", get(get_snippet).delete(delete_snippet))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Submit a snippet for review (`POST /snippets`).
///
/// Invokes the review generator, stores snippet + review as a single row,
/// and returns the review with the stored snippet's id filled in.
#[utoipa::path(
    post,
    path = "/snippets",
    tag = "snippets",
    request_body = CreateSnippetRequest,
    responses(
        (status = 200, description = "Review generated and snippet stored", body = Review),
        (status = 400, description = "Invalid snippet"),
        (status = 502, description = "Review provider error"),
    )
)]
pub async fn create_snippet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSnippetRequest>,
) -> Result<Json<Review>, ServerError> {
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
    if req.code.len() > MAX_CODE_BYTES {
        return Err(ServerError::BadRequest(format!(
            "snippet too large ({} bytes); maximum is {} bytes",
            req.code.len(),
            MAX_CODE_BYTES
        )));
    }

    let mut review = state.reviewer.generate(&req.code, &req.language).await?;

    let metadata = req.metadata;
    let id = state
        .store
        .insert_snippet(NewSnippet {
            language: req.language,
            code: req.code,
            user: req.user,
            filename: metadata.as_ref().map(|m| m.filename.clone()),
            lines: metadata.as_ref().map(|m| m.lines.clone()),
            commit_hash: metadata.as_ref().map(|m| m.commit_hash.clone()),
            review_summary: review.summary.clone(),
            review_suggestions: join_suggestions(&review.suggestions),
            review_severity: review.severity.as_str().to_owned(),
            created_at: Utc::now(),
        })
        .await?;

    review.id = Some(id);
    info!(id, severity = %review.severity, "snippet reviewed and stored");
    Ok(Json(review))
}

/// Fetch a stored snippet by id (`GET /snippets/{id}`).
#[utoipa::path(
    get,
    path = "/snippets/{id}",
    tag = "snippets",
    params(("id" = i64, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "Stored snippet", body = SnippetResponse),
        (status = 404, description = "No snippet with this id"),
    )
)]
pub async fn get_snippet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SnippetResponse>, ServerError> {
    let snippet = state
        .store
        .get_snippet(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("snippet {id} not found")))?;
    Ok(Json(snippet.to_response()))
}

/// List all stored snippets as summaries (`GET /snippets`).
#[utoipa::path(
    get,
    path = "/snippets",
    tag = "snippets",
    responses(
        (status = 200, description = "All stored snippets", body = Vec<SnippetSummary>),
    )
)]
pub async fn list_snippets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SnippetSummary>>, ServerError> {
    let snippets = state.store.list_snippets().await?;
    Ok(Json(snippets.iter().map(|s| s.to_summary()).collect()))
}

/// Delete one snippet (`DELETE /snippets/{id}`).
///
/// A missing id is reported in the response body, not as an error.
#[utoipa::path(
    delete,
    path = "/snippets/{id}",
    tag = "snippets",
    params(("id" = i64, Path, description = "Snippet id")),
    responses(
        (status = 200, description = "Deletion outcome", body = DeleteResponse),
    )
)]
pub async fn delete_snippet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ServerError> {
    let deleted = state.store.delete_snippet(id).await?;
    let message = if deleted {
        info!(id, "snippet deleted");
        format!("snippet {id} deleted")
    } else {
        format!("snippet {id} not found")
    };
    Ok(Json(DeleteResponse { deleted, message }))
}

/// Delete every stored snippet (`DELETE /snippets`).
#[utoipa::path(
    delete,
    path = "/snippets",
    tag = "snippets",
    responses(
        (status = 200, description = "Wipe outcome", body = WipeResponse),
    )
)]
pub async fn wipe_snippets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WipeResponse>, ServerError> {
    let deleted = state.store.wipe_snippets().await?;
    warn!(deleted, "all snippets wiped");
    Ok(Json(WipeResponse {
        deleted,
        message: format!("{deleted} snippets deleted"),
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::review::Severity;

    async fn mock_state() -> Arc<AppState> {
        AppState::mock().await
    }

    fn request(language: &str, code: &str, user: &str) -> CreateSnippetRequest {
        CreateSnippetRequest {
            language: language.to_owned(),
            code: code.to_owned(),
            user: user.to_owned(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn create_returns_review_with_assigned_id() {
        let state = mock_state().await;
        let Json(review) = create_snippet(
            State(state),
            Json(request("rust", "fn main() {}", "alice")),
        )
        .await
        .unwrap();

        assert!(review.id.is_some());
        assert!(!review.summary.is_empty());
        assert!(!review.severity.as_str().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_code() {
        let state = mock_state().await;
        let err = create_snippet(State(state), Json(request("rust", "", "alice")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn create_rejects_oversized_code() {
        let state = mock_state().await;
        let big = "x".repeat(MAX_CODE_BYTES + 1);
        let err = create_snippet(State(state), Json(request("rust", &big, "alice")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn list_contains_created_snippet_with_matching_severity() {
        let state = mock_state().await;
        let Json(review) = create_snippet(
            State(state.clone()),
            Json(request("rust", "fn main() {}", "alice")),
        )
        .await
        .unwrap();
        let id = review.id.unwrap();

        let Json(summaries) = list_snippets(State(state)).await.unwrap();
        let entry = summaries.iter().find(|s| s.id == id).expect("listed");
        assert_eq!(entry.language, "rust");
        assert_eq!(entry.user, "alice");
        assert_eq!(entry.review_severity, review.severity.as_str());
    }

    #[tokio::test]
    async fn get_returns_stored_record() {
        let state = mock_state().await;
        let Json(review) = create_snippet(
            State(state.clone()),
            Json(CreateSnippetRequest {
                metadata: Some(CodeMetadata {
                    filename: "main.rs".into(),
                    lines: "1-3".into(),
                    commit_hash: "abc123".into(),
                }),
                ..request("rust", "fn main() {}", "alice")
            }),
        )
        .await
        .unwrap();
        let id = review.id.unwrap();

        let Json(stored) = get_snippet(State(state), Path(id)).await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.code, "fn main() {}");
        assert_eq!(stored.metadata.unwrap().filename, "main.rs");
        assert_eq!(stored.review.severity, Severity::Low);
        assert_eq!(stored.review.suggestions, review.suggestions);
    }

    #[tokio::test]
    async fn get_missing_id_is_not_found() {
        let state = mock_state().await;
        let err = get_snippet(State(state), Path(404)).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_reports_found_and_not_found() {
        let state = mock_state().await;
        let Json(review) = create_snippet(
            State(state.clone()),
            Json(request("rust", "fn main() {}", "alice")),
        )
        .await
        .unwrap();
        let id = review.id.unwrap();

        let Json(outcome) = delete_snippet(State(state.clone()), Path(id)).await.unwrap();
        assert!(outcome.deleted);

        let Json(listed) = list_snippets(State(state.clone())).await.unwrap();
        assert!(listed.iter().all(|s| s.id != id));

        // Deleting a second time is a message, not an error.
        let Json(outcome) = delete_snippet(State(state), Path(id)).await.unwrap();
        assert!(!outcome.deleted);
        assert!(outcome.message.contains("not found"));
    }

    #[tokio::test]
    async fn wipe_then_list_is_empty() {
        let state = mock_state().await;
        for user in ["alice", "bob"] {
            create_snippet(
                State(state.clone()),
                Json(request("rust", "fn main() {}", user)),
            )
            .await
            .unwrap();
        }

        let Json(outcome) = wipe_snippets(State(state.clone())).await.unwrap();
        assert_eq!(outcome.deleted, 2);

        let Json(listed) = list_snippets(State(state)).await.unwrap();
        assert!(listed.is_empty());
    }
}
