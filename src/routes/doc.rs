use crate::routes::{health, snippets};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "reviewd",
    description = "LLM-backed code snippet review API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(snippets::SnippetsApi::openapi());
    root
}
