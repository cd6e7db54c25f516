//! Job Orchestrator: drives one build from pending request to published pages.
//!
//! A run fetches the most recent PENDING request and claims it, then resolves its
//! theme. Each selected page is generated, rendered and published before the
//! request is marked COMPLETED. Any failure after the claim releases the request
//! back to PENDING so it is never left BUILDING.

use crate::config::{GenerationConfig, PublishConfig};
use crate::error::BuildError;
use crate::generation::{GenerationClient, ThemeSelector, ValidatedGenerator};
use crate::notify::Notifier;
use crate::publish::Publisher;
use crate::render::{self, IndexPage};
use crate::store::RequestStore;
use crate::templates::TemplateStore;
use crate::types::{BuildRequest, TemplateSet, UserType};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

const NOTHING_TO_BUILD: &str = "There is no website for build.";
const INDEX_TITLE_CHARS: usize = 60;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub request_id: i64,
    pub theme: String,
    /// Remote file names in upload order
    pub published: Vec<String>,
    pub notified: bool,
}

pub struct Orchestrator {
    store: Arc<dyn RequestStore>,
    templates: TemplateStore,
    generator: ValidatedGenerator,
    themes: ThemeSelector,
    publisher: Publisher,
    notifier: Option<Notifier>,
    publish: PublishConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn RequestStore>,
        templates: TemplateStore,
        client: GenerationClient,
        publisher: Publisher,
        generation: &GenerationConfig,
        publish: &PublishConfig,
    ) -> Self {
        Self {
            store,
            templates,
            generator: ValidatedGenerator::new(client.clone(), generation.max_retries),
            themes: ThemeSelector::new(client, generation.theme_attempts),
            publisher,
            notifier: None,
            publish: publish.clone(),
        }
    }

    pub fn with_notifier(mut self, notifier: Option<Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Process at most one pending request.
    pub async fn run_once(&self) -> Result<BuildReport, BuildError> {
        let request = self
            .store
            .fetch_pending()
            .await?
            .ok_or_else(|| BuildError::MissingResource(NOTHING_TO_BUILD.to_string()))?;

        info!(
            request_id = request.id,
            theme = %request.theme,
            user_type = %request.user_type,
            "Found pending request"
        );

        let set = self.templates.load_template_set()?;

        if !self.store.claim(request.id).await? {
            return Err(BuildError::AlreadyClaimed(request.id));
        }

        match self.build(&request, &set).await {
            Ok((theme, published)) => {
                let notified = self.notify(request.id).await;
                Ok(BuildReport {
                    request_id: request.id,
                    theme,
                    published,
                    notified,
                })
            }
            Err(err) => {
                error!(request_id = request.id, error = %err, "Build failed");
                if let Err(release_err) = self.store.release(request.id).await {
                    warn!(
                        request_id = request.id,
                        error = %release_err,
                        "Could not release request back to PENDING"
                    );
                }
                Err(err)
            }
        }
    }

    async fn build(
        &self,
        request: &BuildRequest,
        set: &TemplateSet,
    ) -> Result<(String, Vec<String>), BuildError> {
        let theme = self.resolve_theme(request, set).await?;
        let files = self.select_files(request, set, &theme)?;
        let directory_key = request.id.to_string();
        let mut published = Vec::new();

        for (position, file_key) in files.iter().enumerate() {
            info!(request_id = request.id, theme = %theme, file_key = %file_key, "Building page");

            let reference = self.templates.reference_values(&theme, file_key)?;
            let template = self.templates.html_template(&theme, file_key)?;
            let values = self
                .generator
                .produce(file_key, &request.description, &reference)
                .await?;

            let page_filename = page_filename(file_key);
            let page = render::render(&template, &values);
            self.publisher
                .publish(&directory_key, &page_filename, page)
                .await?;
            published.push(page_filename.clone());

            if self.publish.upload_values {
                let json = serde_json::to_string_pretty(&values).map_err(|e| {
                    BuildError::Publish(format!("Cannot serialize values for {}: {}", file_key, e))
                })?;
                let values_filename = format!("{}.values.json", file_key);
                self.publisher
                    .publish(&directory_key, &values_filename, json)
                    .await?;
                published.push(values_filename);
            }

            if position == 0 {
                let title = index_title(&request.description);
                let index = render::render_index(&IndexPage {
                    page_filename: &page_filename,
                    title: &title,
                    cta_text: &self.publish.cta_text,
                    cta_url: &self.publish.cta_url,
                });
                self.publisher
                    .publish(&directory_key, &self.publish.index_filename, index)
                    .await?;
                published.push(self.publish.index_filename.clone());
            }
        }

        self.store.mark_completed(request.id).await?;
        info!(request_id = request.id, files = published.len(), "Request completed");
        Ok((theme, published))
    }

    async fn resolve_theme(
        &self,
        request: &BuildRequest,
        set: &TemplateSet,
    ) -> Result<String, BuildError> {
        if !request.wants_auto_theme() {
            return Ok(request.theme.trim().to_string());
        }
        self.themes
            .select(&request.description, &set.theme_names())
            .await
    }

    /// File keys to build. FREE requests get the first page only.
    fn select_files(
        &self,
        request: &BuildRequest,
        set: &TemplateSet,
        theme: &str,
    ) -> Result<Vec<String>, BuildError> {
        let files = set.files_for(theme).ok_or_else(|| {
            BuildError::MissingResource(format!("Theme '{}' is not in the template set", theme))
        })?;
        if files.is_empty() {
            return Err(BuildError::MissingResource(format!(
                "Theme '{}' has no files",
                theme
            )));
        }

        let limit = match request.user_type {
            UserType::Free => 1,
            UserType::Paid => files.len(),
        };
        let selected: Vec<String> = files.iter().take(limit).cloned().collect();

        if let Some(clash) = selected
            .iter()
            .find(|key| page_filename(key) == self.publish.index_filename)
        {
            return Err(BuildError::Config(format!(
                "Page '{}' would overwrite the index page {}",
                clash, self.publish.index_filename
            )));
        }
        Ok(selected)
    }

    async fn notify(&self, request_id: i64) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };
        match notifier.notify(request_id).await {
            Ok(()) => true,
            Err(err) => {
                warn!(request_id, error = %err, "Notification failed; build still complete");
                false
            }
        }
    }
}

pub fn page_filename(file_key: &str) -> String {
    format!("{}.html", file_key)
}

fn index_title(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() <= INDEX_TITLE_CHARS {
        return first_line.to_string();
    }
    let mut title: String = first_line.chars().take(INDEX_TITLE_CHARS).collect();
    title.push('…');
    title
}
