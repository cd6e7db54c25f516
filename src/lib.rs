//! Pagesmith: single-shot website build worker
//!
//! Picks the most recent pending build request and generates replacement copy for
//! each page of its theme with a language model. Generated values must match the
//! page's reference key count before they are substituted into the HTML template
//! and published to the request's remote directory.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod provider;
pub mod publish;
pub mod render;
pub mod store;
pub mod templates;
pub mod types;
