//! Integration tests for the Pagesmith build worker

mod cli_binary;
mod config_integration;
mod logging_default;
mod orchestrator_flow;
mod publish_local;
