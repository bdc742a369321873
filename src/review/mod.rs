//! Snippet review types and the LLM-backed review generator.
//!
//! [`generator::ReviewGenerator`] turns a snippet (code + language) into a
//! structured [`Review`]. In mock mode it returns a fixed review without any
//! network traffic; otherwise it calls an OpenAI-compatible chat-completions
//! endpoint and parses the completion as JSON.

pub mod generator;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Review severity classification.
///
/// The LLM is asked for `"low"`, `"medium"`, or `"high"`, but its output is
/// not trusted: anything unrecognized maps to [`Severity::Unknown`] instead
/// of being stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Case-insensitive parse with an `Unknown` fallback. Never fails.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured feedback produced for a snippet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    /// Identifier of the stored snippet; populated after persistence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// One-paragraph assessment of the snippet.
    pub summary: String,
    /// Concrete improvement suggestions, in the order the generator
    /// produced them.
    pub suggestions: Vec<String>,
    /// Overall severity of the findings.
    pub severity: Severity,
}

/// Errors from the review generator.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Transport-level failure talking to the provider (includes timeouts).
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider returned no usable completion text.
    #[error("provider returned an empty completion")]
    EmptyCompletion,

    /// The completion text was not the requested JSON shape.
    #[error("completion was not valid review JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn severity_parses_known_values_case_insensitively() {
        assert_eq!(Severity::parse("low"), Severity::Low);
        assert_eq!(Severity::parse("MEDIUM"), Severity::Medium);
        assert_eq!(Severity::parse("  High "), Severity::High);
    }

    #[test]
    fn severity_falls_back_to_unknown() {
        assert_eq!(Severity::parse("critical"), Severity::Unknown);
        assert_eq!(Severity::parse(""), Severity::Unknown);
        assert_eq!(Severity::parse("severe!!"), Severity::Unknown);
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&Severity::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn review_omits_id_until_persisted() {
        let review = Review {
            id: None,
            summary: "fine".into(),
            suggestions: vec![],
            severity: Severity::Low,
        };
        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("id").is_none());
    }
}
