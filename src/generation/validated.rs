//! Validated generation: the bounded retry loop around the generation client.
//!
//! Each attempt sends the same prompt, extracts a JSON object from the reply and
//! checks that it has as many keys as the reference values. Only the key *count*
//! is enforced; key names are not compared, so a reply with the right number of
//! wrongly named keys is accepted (its entries simply match no placeholder when
//! rendered). Transport failures and validation failures are treated alike.

use crate::error::BuildError;
use crate::generation::client::GenerationClient;
use crate::generation::extract::parse_page_values;
use crate::generation::prompt::{self, VALUES_SYSTEM};
use crate::types::PageValues;
use tracing::{debug, error, info, warn};

/// Retries after the first attempt when nothing is configured.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Position of one `produce` call in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// About to make attempt `n` (zero-based)
    Attempting(usize),
    Succeeded,
    Failed,
}

/// Attempt counter scoped to one `produce` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: usize,
    max_attempts: usize,
}

impl RetryState {
    /// `max_attempts` counts retries: total calls allowed are `max_attempts + 1`.
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempt: 0,
            max_attempts,
        }
    }

    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn state(&self) -> GenerationState {
        if self.attempt > self.max_attempts {
            GenerationState::Failed
        } else {
            GenerationState::Attempting(self.attempt)
        }
    }

    /// Count a failed attempt and return the resulting state.
    pub fn record_failure(&mut self) -> GenerationState {
        self.attempt += 1;
        self.state()
    }
}

/// Produces page values that structurally match a reference set.
pub struct ValidatedGenerator {
    client: GenerationClient,
    max_retries: usize,
}

impl ValidatedGenerator {
    pub fn new(client: GenerationClient, max_retries: usize) -> Self {
        Self {
            client,
            max_retries,
        }
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Generate replacement values for one page.
    ///
    /// Makes at most `max_retries + 1` generation calls. Fails with
    /// `MaxRetriesExceeded` once every attempt has produced unparsable output, a key
    /// count different from `reference`, or a transport error.
    pub async fn produce(
        &self,
        file_key: &str,
        description: &str,
        reference: &PageValues,
    ) -> Result<PageValues, BuildError> {
        // Built once: every attempt sends the identical prompt.
        let user_prompt = prompt::values_prompt(description, reference)?;
        let mut retry = RetryState::new(self.max_retries);

        loop {
            debug!(
                file_key,
                state = ?retry.state(),
                max_attempts = retry.max_attempts(),
                "Requesting page values"
            );

            let failure = match self.attempt(&user_prompt, reference).await {
                Ok(values) => {
                    info!(
                        file_key,
                        state = ?GenerationState::Succeeded,
                        attempts = retry.attempt() + 1,
                        keys = values.len(),
                        "Page values generated"
                    );
                    return Ok(values);
                }
                Err(err) if err.is_retryable() => err,
                Err(err) => return Err(err),
            };

            match retry.record_failure() {
                GenerationState::Attempting(next) => {
                    warn!(
                        file_key,
                        attempt = next,
                        error = %failure,
                        "Generated values rejected, retrying"
                    );
                }
                state => {
                    error!(
                        file_key,
                        state = ?state,
                        attempts = retry.attempt(),
                        error = %failure,
                        "Giving up on page values"
                    );
                    return Err(BuildError::MaxRetriesExceeded {
                        target: file_key.to_string(),
                        attempts: retry.attempt(),
                        last_error: failure.to_string(),
                    });
                }
            }
        }
    }

    async fn attempt(
        &self,
        user_prompt: &str,
        reference: &PageValues,
    ) -> Result<PageValues, BuildError> {
        let raw = self.client.generate(VALUES_SYSTEM, user_prompt).await?;
        let candidate = parse_page_values(&raw)?;

        if candidate.len() != reference.len() {
            return Err(BuildError::Validation(format!(
                "expected {} keys, got {}",
                reference.len(),
                candidate.len()
            )));
        }

        let unmatched = candidate
            .keys()
            .filter(|key| !reference.contains_key(*key))
            .count();
        if unmatched > 0 {
            debug!(unmatched, "Generated keys differ from reference; they will not render");
        }

        Ok(candidate)
    }
}
