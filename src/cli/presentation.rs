//! CLI presentation: text and json formatters per command.

use crate::error::BuildError;
use crate::orchestrator::BuildReport;
use crate::types::TemplateSet;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// Problems found by `pagesmith validate`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub config_errors: Vec<String>,
    /// Per theme, in template-set order; themes without problems have an empty list
    pub themes: Vec<(String, Vec<String>)>,
}

impl ValidationReport {
    pub fn problem_count(&self) -> usize {
        self.config_errors.len() + self.themes.iter().map(|(_, p)| p.len()).sum::<usize>()
    }
}

fn section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, BuildError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BuildError::Config(format!("Cannot render JSON output: {}", e)))
}

pub fn format_build_report_text(report: &BuildReport, preview_dir: Option<&Path>) -> String {
    let mut out = format!("{}\n\n", section_heading("Build complete"));
    out.push_str(&format!("  Request: {}\n", report.request_id));
    out.push_str(&format!("  Theme: {}\n", report.theme));
    match preview_dir {
        Some(dir) => out.push_str(&format!("  Preview written to: {}\n", dir.display())),
        None => out.push_str(&format!(
            "  Notification: {}\n",
            if report.notified { "sent" } else { "not sent" }
        )),
    }
    out.push('\n');

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "File"]);
    for (i, file) in report.published.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), file.clone()]);
    }
    out.push_str(&table.to_string());
    out
}

pub fn format_build_report_json(
    report: &BuildReport,
    preview_dir: Option<&Path>,
) -> Result<String, BuildError> {
    to_json(&json!({
        "request_id": report.request_id,
        "theme": report.theme,
        "published": report.published,
        "notified": report.notified,
        "preview_dir": preview_dir.map(|d| d.display().to_string()),
    }))
}

pub fn format_validation_report_text(report: &ValidationReport) -> String {
    let mut out = String::new();
    if report.problem_count() == 0 {
        out.push_str(&format!("{} ", "✓".green()));
        out.push_str(&format!(
            "Validation passed: configuration and {} theme(s) OK",
            report.themes.len()
        ));
        return out;
    }

    out.push_str(&format!(
        "Validation completed with {} problem(s)\n",
        report.problem_count()
    ));
    if !report.config_errors.is_empty() {
        out.push_str(&format!("\n{}\n", section_heading("Configuration")));
        for e in &report.config_errors {
            out.push_str(&format!("  {} {}\n", "✗".red(), e));
        }
    }
    if !report.themes.is_empty() {
        out.push_str(&format!("\n{}\n", section_heading("Themes")));
        for (theme, problems) in &report.themes {
            if problems.is_empty() {
                out.push_str(&format!("  {} {}\n", "✓".green(), theme));
                continue;
            }
            out.push_str(&format!("  {} {}\n", "✗".red(), theme));
            for p in problems {
                out.push_str(&format!("      - {}\n", p));
            }
        }
    }
    out
}

pub fn format_validation_report_json(report: &ValidationReport) -> Result<String, BuildError> {
    let themes: Vec<_> = report
        .themes
        .iter()
        .map(|(theme, problems)| json!({ "theme": theme, "problems": problems }))
        .collect();
    to_json(&json!({
        "valid": report.problem_count() == 0,
        "config_errors": report.config_errors,
        "themes": themes,
    }))
}

pub fn format_themes_text(set: &TemplateSet) -> String {
    let names = set.theme_names();
    if names.is_empty() {
        return "No themes found.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Theme", "Pages", "Files"]);
    for name in &names {
        let files = set.files_for(name).unwrap_or_default();
        table.add_row(vec![name.clone(), files.len().to_string(), files.join(", ")]);
    }
    format!("{}\n\nTotal: {} theme(s)", table, names.len())
}

pub fn format_themes_json(set: &TemplateSet) -> Result<String, BuildError> {
    let themes: Vec<_> = set
        .theme_names()
        .into_iter()
        .map(|name| {
            let files = set.files_for(&name).unwrap_or_default().to_vec();
            json!({ "theme": name, "files": files })
        })
        .collect();
    let total = themes.len();
    to_json(&json!({ "themes": themes, "total": total }))
}
