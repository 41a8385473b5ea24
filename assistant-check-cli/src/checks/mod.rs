mod inspect;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{looks_rate_limited, ApiError, AssistantResponse};

pub use inspect::Inspector;

/// Characters of the assistant message shown in diagnostics
const MESSAGE_PREVIEW_CHARS: usize = 200;

/// Result of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    /// The upstream quota was exceeded; counted as a soft pass
    RateLimited,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
            Outcome::RateLimited => "RATE LIMITED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Missing,
    Error,
}

/// One diagnostic line produced while inspecting a response
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub level: Level,
    pub text: String,
}

impl Finding {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: Level::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: Level::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: Level::Warning, text: text.into() }
    }

    pub fn missing(text: impl Into<String>) -> Self {
        Self { level: Level::Missing, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: Level::Error, text: text.into() }
    }
}

/// What a response must show for a check to pass
///
/// Matching is deliberately loose: one recognised tool key, one keyword in
/// the message or, when allowed, any message at all is enough.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectation {
    /// Any non-blank message passes
    #[serde(default)]
    pub accept_any_message: bool,

    /// Keys whose presence in a tool result passes
    #[serde(default)]
    pub tool_keys: Vec<String>,

    /// Case-insensitive substrings looked for in the message
    #[serde(default)]
    pub message_keywords: Vec<String>,

    /// Tool-specific diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect: Option<Inspector>,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub details: String,
    pub findings: Vec<Finding>,
}

impl Evaluation {
    fn new(outcome: Outcome, details: impl Into<String>, findings: Vec<Finding>) -> Self {
        Self {
            outcome,
            details: details.into(),
            findings,
        }
    }

    /// Turn a request failure into a result; never escalates
    pub fn from_error(error: &ApiError) -> Self {
        let text = error.to_string();
        if error.is_rate_limited() {
            Self::new(
                Outcome::RateLimited,
                "Rate limited - tool exists but API quota exceeded",
                vec![Finding::warning(format!("Rate limited: {}", text))],
            )
        } else {
            Self::new(
                Outcome::Failed,
                format!("Error: {}", text),
                vec![Finding::error(text)],
            )
        }
    }
}

/// Judge a response against an expectation
pub fn evaluate(expect: &Expectation, response: &AssistantResponse) -> Evaluation {
    let mut findings = Vec::new();

    if let Some(error) = response.error_text() {
        let outcome = if looks_rate_limited(&error) {
            findings.push(Finding::warning(format!("Rate limited: {}", error)));
            Outcome::RateLimited
        } else {
            findings.push(Finding::error(error.clone()));
            Outcome::Failed
        };
        return Evaluation::new(outcome, format!("Error: {}", error), findings);
    }

    if response.is_empty() {
        findings.push(Finding::error("Response has neither a message nor tool results"));
        return Evaluation::new(Outcome::Failed, "Empty response", findings);
    }

    let mut passed_with: Option<String> = None;

    if let Some(tool_results) = &response.tool_results {
        findings.push(Finding::info("Tool results found:"));

        for (tool_id, result) in tool_results {
            let success = result.get("success").and_then(Value::as_bool).unwrap_or(false);
            findings.push(Finding::info(format!("Tool {}: success={}", tool_id, success)));

            if let Some(error) = result.get("error").and_then(Value::as_str) {
                findings.push(Finding::error(format!("Tool {} reported: {}", tool_id, error)));
            }

            match &expect.inspect {
                Some(inspector) => inspector.inspect(result, &mut findings),
                None => inspect::describe_keys(result, &expect.tool_keys, &mut findings),
            }

            let found: Vec<&str> = expect
                .tool_keys
                .iter()
                .filter(|key| result.get(key.as_str()).is_some())
                .map(String::as_str)
                .collect();

            if !found.is_empty() && passed_with.is_none() {
                passed_with = Some(format!("Tool working - found keys: {}", found.join(", ")));
            }
        }
    }

    if let Some(message) = &response.message {
        findings.push(Finding::info(format!("Assistant message: {}", preview(message))));

        if passed_with.is_none() {
            if expect.accept_any_message && response.message_text().is_some() {
                passed_with = Some(format!("Got response: {}", preview(message)));
            } else {
                let lower = message.to_lowercase();
                let matched: Vec<&str> = expect
                    .message_keywords
                    .iter()
                    .filter(|keyword| lower.contains(&keyword.to_lowercase()))
                    .map(String::as_str)
                    .collect();

                if !matched.is_empty() {
                    passed_with = Some(format!(
                        "Response contains expected content: {}",
                        matched.join(", ")
                    ));
                }
            }
        }
    }

    match passed_with {
        Some(details) => {
            findings.push(Finding::success(details.clone()));
            Evaluation::new(Outcome::Passed, details, findings)
        }
        None => {
            findings.push(Finding::error("No expected data found in response"));
            Evaluation::new(Outcome::Failed, "No expected data found in response", findings)
        }
    }
}

/// First characters of a message, on a char boundary
pub fn preview(text: &str) -> String {
    truncate(text, MESSAGE_PREVIEW_CHARS)
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
