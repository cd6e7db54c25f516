//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; a single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{command_name, Cli, Commands};
pub use presentation::{
    format_build_report_json, format_build_report_text, format_themes_json, format_themes_text,
    format_validation_report_json, format_validation_report_text, ValidationReport,
};
pub use route::RunContext;
