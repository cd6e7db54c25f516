//! Generation domain: prompt contracts, the single-call generation client, JSON
//! extraction, the bounded retry loop that validates generated page values, and
//! closed-set theme selection.

pub mod client;
pub mod extract;
pub mod prompt;
pub mod theme;
pub mod validated;

pub use client::GenerationClient;
pub use theme::ThemeSelector;
pub use validated::{GenerationState, RetryState, ValidatedGenerator};
