//! Closed-set theme classification for requests that let the system choose.

use crate::error::BuildError;
use crate::generation::client::GenerationClient;
use crate::generation::prompt::{self, THEME_SYSTEM};
use tracing::{debug, info, warn};

pub const DEFAULT_THEME_ATTEMPTS: usize = 3;

pub struct ThemeSelector {
    client: GenerationClient,
    attempts: usize,
}

impl ThemeSelector {
    pub fn new(client: GenerationClient, attempts: usize) -> Self {
        Self {
            client,
            attempts: attempts.max(1),
        }
    }

    /// Ask the generation service to pick one of `candidates` for `description`.
    ///
    /// Returns the candidate's canonical spelling. Answers outside the list and
    /// transport errors both use up an attempt.
    pub async fn select(&self, description: &str, candidates: &[String]) -> Result<String, BuildError> {
        if candidates.is_empty() {
            return Err(BuildError::MissingResource(
                "No themes available for automatic selection".to_string(),
            ));
        }

        let user_prompt = prompt::theme_prompt(description, candidates);
        let mut last_error = String::new();

        for attempt in 0..self.attempts {
            match self.client.generate(THEME_SYSTEM, &user_prompt).await {
                Ok(answer) => {
                    if let Some(theme) = match_candidate(&answer, candidates) {
                        info!(theme = %theme, attempt, "Theme selected");
                        return Ok(theme.to_string());
                    }
                    debug!(answer = %answer, attempt, "Answer is not a known theme");
                    last_error = format!("'{}' is not one of the available themes", answer);
                }
                Err(err) if err.is_retryable() => {
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
            warn!(attempt, error = %last_error, "Theme selection attempt failed");
        }

        Err(BuildError::MaxRetriesExceeded {
            target: "theme".to_string(),
            attempts: self.attempts,
            last_error,
        })
    }
}

/// Match a free-text answer against the candidate names.
fn match_candidate<'a>(answer: &str, candidates: &'a [String]) -> Option<&'a str> {
    let cleaned = answer
        .trim()
        .trim_start_matches("- ")
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c.is_whitespace());

    candidates
        .iter()
        .find(|c| c.eq_ignore_ascii_case(cleaned))
        .map(String::as_str)
}
