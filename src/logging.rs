//! Worker logging on top of `tracing`.
//!
//! Text or JSON lines go to stderr by default, or to stdout or a file under the platform
//! state directory.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disable to suppress all log output
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file"); defaults under the platform state directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Default log file: `<state dir>/pagesmith.log`, falling back to the working directory.
pub fn default_log_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "pagesmith")
        .map(|dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .join("pagesmith.log")
        })
        .unwrap_or_else(|| PathBuf::from("pagesmith.log"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputDestination {
    Stdout,
    Stderr,
    File,
}

type FilteredRegistry = Layered<EnvFilter, Registry>;

/// Install the global subscriber.
///
/// `PAGESMITH_LOG`, `PAGESMITH_LOG_FORMAT`, `PAGESMITH_LOG_OUTPUT` and `PAGESMITH_LOG_MODULES`
/// win over `config`; the binary folds its flags into `config` before calling this.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), BuildError> {
    if config.is_some_and(|c| !c.enabled) {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let ansi = output != OutputDestination::File && config.map_or(true, |c| c.color);

    let writer = match output {
        OutputDestination::Stdout => BoxMakeWriter::new(std::io::stdout),
        OutputDestination::Stderr => BoxMakeWriter::new(std::io::stderr),
        OutputDestination::File => {
            let path = config
                .and_then(|c| c.file.clone())
                .unwrap_or_else(default_log_file);
            BoxMakeWriter::new(Arc::new(open_log_file(&path)?))
        }
    };

    let base = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let layer: Box<dyn Layer<FilteredRegistry> + Send + Sync> = match format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Text => base.with_ansi(ansi).boxed(),
    };

    Registry::default()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| BuildError::Config(format!("Failed to initialize logging: {}", e)))
}

fn open_log_file(path: &Path) -> Result<File, BuildError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| BuildError::Config(format!("Failed to create log directory: {}", e)))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BuildError::Config(format!("Failed to open log file {:?}: {}", path, e)))
}

fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, BuildError> {
    if let Ok(filter) = EnvFilter::try_from_env("PAGESMITH_LOG") {
        return Ok(filter);
    }

    let level = config.map_or("info", |c| c.level.as_str());
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut directives: Vec<String> = config
        .map(|c| {
            c.modules
                .iter()
                .map(|(module, lvl)| format!("{}={}", module, lvl))
                .collect()
        })
        .unwrap_or_default();
    if let Ok(modules) = std::env::var("PAGESMITH_LOG_MODULES") {
        directives.extend(
            modules.split(',')
                .filter_map(|part| part.split_once('='))
                .map(|(module, lvl)| format!("{}={}", module.trim(), lvl.trim())),
        );
    }

    directives.into_iter().try_fold(EnvFilter::new(level), |filter, directive| {
        directive
            .parse()
            .map(|d| filter.add_directive(d))
            .map_err(|e| BuildError::Config(format!("Invalid log directive {}: {}", directive, e)))
    })
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<LogFormat, BuildError> {
    if let Ok(format) = std::env::var("PAGESMITH_LOG_FORMAT") {
        if let Ok(parsed) = parse_format(&format) {
            return Ok(parsed);
        }
    }
    parse_format(config.map_or("text", |c| c.format.as_str()))
}

fn parse_format(format: &str) -> Result<LogFormat, BuildError> {
    match format {
        "json" => Ok(LogFormat::Json),
        "text" => Ok(LogFormat::Text),
        other => Err(BuildError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<OutputDestination, BuildError> {
    match std::env::var("PAGESMITH_LOG_OUTPUT") {
        Ok(output) => parse_output_destination(&output),
        Err(_) => parse_output_destination(config.map_or("stderr", |c| c.output.as_str())),
    }
}

fn parse_output_destination(output: &str) -> Result<OutputDestination, BuildError> {
    match output {
        "stdout" => Ok(OutputDestination::Stdout),
        "stderr" => Ok(OutputDestination::Stderr),
        "file" => Ok(OutputDestination::File),
        other => Err(BuildError::Config(format!(
            "Invalid log output: {} (must be stdout, stderr or file)",
            other
        ))),
    }
}
