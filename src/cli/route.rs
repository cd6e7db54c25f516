//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_build_report_json, format_build_report_text, format_themes_json, format_themes_text,
    format_validation_report_json, format_validation_report_text, ValidationReport,
};
use crate::config::{ConfigLoader, PagesmithConfig, ValidationError};
use crate::error::BuildError;
use crate::generation::GenerationClient;
use crate::notify::Notifier;
use crate::orchestrator::{page_filename, BuildReport, Orchestrator};
use crate::provider::ProviderFactory;
use crate::publish::{FtpConnector, LocalDirConnector, Publisher, RemoteConnector};
use crate::store::{MySqlRequestStore, PreviewStore, RequestStore};
use crate::templates::TemplateStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: the loaded configuration and where it came from.
/// Built once from the workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: PagesmithConfig,
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, BuildError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        debug!(
            workspace = %workspace_root.display(),
            config = ?config_path,
            templates = %config.templates.root.display(),
            "Run context ready"
        );
        Ok(Self::from_config(config, workspace_root, config_path))
    }

    /// Wrap an already-built configuration.
    pub fn from_config(
        config: PagesmithConfig,
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            config,
            workspace_root,
            config_path,
        }
    }

    pub fn config(&self) -> &PagesmithConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, BuildError> {
        match command {
            Commands::Run { dry_run, format } => self.handle_run(dry_run.as_deref(), format),
            Commands::Validate { format } => self.handle_validate(format),
            Commands::Themes { format } => self.handle_themes(format),
        }
    }

    fn template_store(&self) -> TemplateStore {
        TemplateStore::new(
            self.config.templates.root.clone(),
            self.config.templates.file_structure.clone(),
        )
    }

    fn handle_run(&self, dry_run: Option<&Path>, format: &str) -> Result<String, BuildError> {
        if let Err(errors) = self.config.validate() {
            // A preview never talks to the FTP server.
            let blocking: Vec<String> = errors
                .iter()
                .filter(|e| !(dry_run.is_some() && matches!(e, ValidationError::Ftp(_))))
                .map(ToString::to_string)
                .collect();
            if !blocking.is_empty() {
                return Err(BuildError::Config(blocking.join("; ")));
            }
        }

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| BuildError::Config(format!("Failed to create runtime: {}", e)))?;
        let report = rt.block_on(self.run_build(dry_run))?;

        match format {
            "json" => format_build_report_json(&report, dry_run),
            _ => Ok(format_build_report_text(&report, dry_run)),
        }
    }

    async fn run_build(&self, dry_run: Option<&Path>) -> Result<BuildReport, BuildError> {
        let config = &self.config;
        let requests = MySqlRequestStore::connect(&config.database).await?;
        let provider = ProviderFactory::from_config(&config.provider)?;
        let client = GenerationClient::new(Arc::from(provider), config.provider.completion_options());

        let (store, connector, notifier): (Arc<dyn RequestStore>, Arc<dyn RemoteConnector>, _) =
            match dry_run {
                Some(dir) => {
                    info!(dir = %dir.display(), "Preview build; status and notification are skipped");
                    (
                        Arc::new(PreviewStore::new(requests)),
                        Arc::new(LocalDirConnector::new(dir)),
                        None,
                    )
                }
                None => (
                    Arc::new(requests),
                    Arc::new(FtpConnector::new(&config.ftp)),
                    Notifier::from_config(&config.notify)?,
                ),
            };

        let orchestrator = Orchestrator::new(
            store,
            self.template_store(),
            client,
            Publisher::new(connector, config.publish.root_dir.clone()),
            &config.generation,
            &config.publish,
        )
        .with_notifier(notifier);

        orchestrator.run_once().await
    }

    fn handle_validate(&self, format: &str) -> Result<String, BuildError> {
        let mut report = ValidationReport {
            config_errors: self
                .config
                .validate()
                .err()
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect(),
            themes: Vec::new(),
        };

        let templates = self.template_store();
        match templates.load_template_set() {
            Ok(set) => {
                for theme in set.theme_names() {
                    let mut problems = templates.validate_theme(&set, &theme);
                    let index = &self.config.publish.index_filename;
                    for file_key in set.files_for(&theme).unwrap_or_default() {
                        if &page_filename(file_key) == index {
                            problems.push(format!(
                                "{}/{}: page would overwrite the index page {}",
                                theme, file_key, index
                            ));
                        }
                    }
                    report.themes.push((theme, problems));
                }
            }
            Err(e) => report.config_errors.push(format!("Templates: {}", e)),
        }

        info!(problems = report.problem_count(), "Validation finished");
        match format {
            "json" => format_validation_report_json(&report),
            _ => Ok(format_validation_report_text(&report)),
        }
    }

    fn handle_themes(&self, format: &str) -> Result<String, BuildError> {
        let set = self.template_store().load_template_set()?;
        match format {
            "json" => format_themes_json(&set),
            _ => Ok(format_themes_text(&set)),
        }
    }
}
