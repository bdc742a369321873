//! LLM-backed review generation.
//!
//! The generator owns a single [`reqwest::Client`] built from the startup
//! configuration (timeout included) rather than a global client. The provider
//! protocol is the OpenAI chat-completions shape, so any compatible gateway
//! works by pointing `REVIEWD_LLM_API_BASE` at it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{Review, ReviewError, Severity};
use crate::config::Config;

const SYSTEM_INSTRUCTION: &str =
    "You are a senior software engineer performing a focused code review. \
     Respond with JSON only, no prose around it.";

/// Produces a [`Review`] for a snippet, either by calling the configured
/// provider or by returning a fixed mock review.
#[derive(Debug, Clone)]
pub struct ReviewGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    mock: bool,
}

impl ReviewGenerator {
    /// Build the generator from startup configuration. The HTTP client is
    /// created once here; per-request state is limited to the prompt.
    pub fn new(cfg: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.llm_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: cfg.llm_api_base.trim_end_matches('/').to_owned(),
            api_key: cfg.llm_api_key.clone(),
            model: cfg.llm_model.clone(),
            mock: cfg.mock_reviews,
        })
    }

    /// Review `code` written in `language`.
    ///
    /// In mock mode this returns [`mock_review`] without any network call.
    pub async fn generate(&self, code: &str, language: &str) -> Result<Review, ReviewError> {
        if self.mock {
            debug!("mock mode enabled; skipping provider call");
            return Ok(mock_review());
        }

        let prompt = build_prompt(code, language);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_INSTRUCTION.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        let content = extract_content(completion)?;
        let review = parse_review(&content)?;
        info!(
            model = %self.model,
            severity = %review.severity,
            suggestions = review.suggestions.len(),
            "review generated"
        );
        Ok(review)
    }
}

/// Fixed review returned in mock mode. Stable content so tests can assert
/// against it.
pub fn mock_review() -> Review {
    Review {
        id: None,
        summary: "Mock review: the snippet compiles in spirit and raises no immediate concerns."
            .into(),
        suggestions: vec![
            "Add unit tests covering the main code path".into(),
            "Document the public interface".into(),
        ],
        severity: Severity::Low,
    }
}

/// Natural-language prompt embedding the snippet plus the fixed instruction
/// block describing the required JSON shape.
fn build_prompt(code: &str, language: &str) -> String {
    format!(
        "Review the following {language} code snippet.\n\n\
         ```{language}\n{code}\n```\n\n\
         Reply with a JSON object of exactly this shape:\n\
         {{\"summary\": \"<one-paragraph assessment>\", \
         \"suggestions\": [\"<improvement>\", ...], \
         \"severity\": \"low\" | \"medium\" | \"high\"}}"
    )
}

/// First completion's text, or [`ReviewError::EmptyCompletion`] when the
/// provider sent no choices or only whitespace content.
fn extract_content(completion: ChatResponse) -> Result<String, ReviewError> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(ReviewError::EmptyCompletion)
}

/// Completion text → [`Review`].
///
/// Models frequently wrap JSON in a Markdown code fence despite instructions;
/// strip one before parsing. The severity string is untrusted and maps
/// through [`Severity::parse`].
fn parse_review(content: &str) -> Result<Review, ReviewError> {
    let payload: ReviewPayload = serde_json::from_str(strip_code_fence(content))?;
    Ok(Review {
        id: None,
        summary: payload.summary,
        suggestions: payload.suggestions,
        severity: Severity::parse(&payload.severity),
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag on the opening fence line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ── Provider wire types ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// The JSON shape the instruction block asks the model for.
#[derive(Debug, Deserialize)]
struct ReviewPayload {
    summary: String,
    suggestions: Vec<String>,
    severity: String,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn response_with(content: &str) -> ChatResponse {
        ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    role: "assistant".into(),
                    content: content.into(),
                },
            }],
        }
    }

    #[test]
    fn prompt_embeds_code_and_language() {
        let prompt = build_prompt("fn main() {}", "rust");
        assert!(prompt.contains("fn main() {}"));
        assert!(prompt.contains("rust code snippet"));
        assert!(prompt.contains("\"severity\""));
    }

    #[test]
    fn parse_review_accepts_plain_json() {
        let review = parse_review(
            r#"{"summary": "ok", "suggestions": ["a", "b"], "severity": "medium"}"#,
        )
        .unwrap();
        assert_eq!(review.summary, "ok");
        assert_eq!(review.suggestions, vec!["a", "b"]);
        assert_eq!(review.severity, Severity::Medium);
        assert!(review.id.is_none());
    }

    #[test]
    fn parse_review_strips_markdown_fence() {
        let fenced = "```json\n{\"summary\": \"s\", \"suggestions\": [], \"severity\": \"high\"}\n```";
        let review = parse_review(fenced).unwrap();
        assert_eq!(review.severity, Severity::High);
    }

    #[test]
    fn parse_review_maps_unrecognized_severity_to_unknown() {
        let review = parse_review(
            r#"{"summary": "s", "suggestions": [], "severity": "catastrophic"}"#,
        )
        .unwrap();
        assert_eq!(review.severity, Severity::Unknown);
    }

    #[test]
    fn parse_review_rejects_malformed_json() {
        assert!(matches!(
            parse_review("not json at all"),
            Err(ReviewError::Malformed(_))
        ));
        // Structurally valid JSON missing required fields is also malformed.
        assert!(matches!(
            parse_review(r#"{"summary": "s"}"#),
            Err(ReviewError::Malformed(_))
        ));
    }

    #[test]
    fn extract_content_returns_the_first_choice() {
        let content = extract_content(response_with("{\"summary\": \"s\"}")).unwrap();
        assert_eq!(content, "{\"summary\": \"s\"}");
    }

    #[test]
    fn no_choices_is_an_empty_completion() {
        let response = ChatResponse { choices: vec![] };
        assert!(matches!(
            extract_content(response),
            Err(ReviewError::EmptyCompletion)
        ));
    }

    #[test]
    fn whitespace_only_content_is_an_empty_completion() {
        assert!(matches!(
            extract_content(response_with("  \n\t ")),
            Err(ReviewError::EmptyCompletion)
        ));
    }

    #[test]
    fn parse_review_preserves_suggestion_order() {
        let review = parse_review(
            r#"{"summary": "s", "suggestions": ["first", "second", "third"], "severity": "low"}"#,
        )
        .unwrap();
        assert_eq!(review.suggestions, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn mock_mode_returns_fixed_review_regardless_of_input() {
        let generator = ReviewGenerator::new(&Config::mock()).unwrap();
        let a = generator.generate("fn main() {}", "rust").await.unwrap();
        let b = generator.generate("print('hi')", "python").await.unwrap();
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.suggestions, b.suggestions);
        assert_eq!(a.severity, Severity::Low);
        assert!(!a.severity.as_str().is_empty());
    }
}
