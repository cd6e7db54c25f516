//! End-to-end runs of the orchestrator with in-memory collaborators.

use super::test_utils::{
    request, serve_status, write_template_fixture, MemoryStore, ScriptedProvider, GENERATED_JSON,
};
use pagesmith::config::{GenerationConfig, PublishConfig};
use pagesmith::error::BuildError;
use pagesmith::generation::GenerationClient;
use pagesmith::notify::Notifier;
use pagesmith::orchestrator::Orchestrator;
use pagesmith::provider::CompletionOptions;
use pagesmith::publish::{LocalDirConnector, Publisher};
use pagesmith::store::{PreviewStore, RequestStore};
use pagesmith::templates::TemplateStore;
use pagesmith::types::{RequestStatus, UserType};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    templates: TempDir,
    output: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let templates = TempDir::new().unwrap();
        write_template_fixture(templates.path());
        Self {
            templates,
            output: TempDir::new().unwrap(),
        }
    }

    fn orchestrator(
        &self,
        store: Arc<dyn RequestStore>,
        provider: Arc<ScriptedProvider>,
        generation: GenerationConfig,
        publish: PublishConfig,
    ) -> Orchestrator {
        Orchestrator::new(
            store,
            TemplateStore::new(self.templates.path(), "file_structure.json"),
            GenerationClient::new(provider, CompletionOptions::default()),
            Publisher::new(
                Arc::new(LocalDirConnector::new(self.output.path())),
                publish.root_dir.clone(),
            ),
            &generation,
            &publish,
        )
    }

    fn published(&self, id: i64) -> Vec<String> {
        let dir = self.output.path().join("LIVE").join(id.to_string());
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[tokio::test]
async fn test_free_bakery_request_end_to_end() {
    let fixture = Fixture::new();
    let store = Arc::new(MemoryStore::new(vec![request(42, "demo-corporate", UserType::Free)]));
    let provider = Arc::new(ScriptedProvider::always(GENERATED_JSON));
    let orchestrator = fixture.orchestrator(
        store.clone(),
        provider.clone(),
        GenerationConfig::default(),
        PublishConfig::default(),
    );

    let report = orchestrator.run_once().await.unwrap();

    assert_eq!(report.request_id, 42);
    assert_eq!(report.published, vec!["home.html", "index.html"]);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(fixture.published(42), vec!["home.html", "index.html"]);
    assert_eq!(store.status(42), Some(RequestStatus::Completed));
    assert_eq!(
        *store.writes.lock(),
        vec![(42, RequestStatus::Building), (42, RequestStatus::Completed)]
    );
}

#[tokio::test]
async fn test_paid_request_retries_a_bad_page_then_completes() {
    let fixture = Fixture::new();
    let store = Arc::new(MemoryStore::new(vec![request(5, "demo-corporate", UserType::Paid)]));
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(GENERATED_JSON),
        Ok(r#"{"{{title}}": "Missing two keys"}"#),
        Err("502 Bad Gateway"),
        Ok(GENERATED_JSON),
    ]));
    let orchestrator = fixture.orchestrator(
        store.clone(),
        provider.clone(),
        GenerationConfig::default(),
        PublishConfig::default(),
    );

    let report = orchestrator.run_once().await.unwrap();

    // home: 1 call; about: 3 calls; contact: 1 call
    assert_eq!(provider.call_count(), 5);
    assert_eq!(
        report.published,
        vec!["home.html", "index.html", "about.html", "contact.html"]
    );
    assert_eq!(store.status(5), Some(RequestStatus::Completed));
}

#[tokio::test]
async fn test_exhausted_generation_leaves_request_pending() {
    let fixture = Fixture::new();
    let store = Arc::new(MemoryStore::new(vec![request(6, "demo-shop", UserType::Free)]));
    let provider = Arc::new(ScriptedProvider::always("I'd rather not."));
    let generation = GenerationConfig {
        max_retries: 1,
        ..GenerationConfig::default()
    };
    let orchestrator =
        fixture.orchestrator(store.clone(), provider.clone(), generation, PublishConfig::default());

    let err = orchestrator.run_once().await.unwrap_err();

    assert!(matches!(err, BuildError::MaxRetriesExceeded { attempts: 2, .. }));
    assert_eq!(provider.call_count(), 2);
    assert!(fixture.published(6).is_empty());
    assert_eq!(store.status(6), Some(RequestStatus::Pending));
}

#[tokio::test]
async fn test_auto_theme_with_unknown_answers_aborts_before_pages() {
    let fixture = Fixture::new();
    let store = Arc::new(MemoryStore::new(vec![request(8, "ai", UserType::Free)]));
    let provider = Arc::new(ScriptedProvider::always("demo-florist"));
    let orchestrator = fixture.orchestrator(
        store.clone(),
        provider.clone(),
        GenerationConfig::default(),
        PublishConfig::default(),
    );

    let err = orchestrator.run_once().await.unwrap_err();

    assert!(matches!(err, BuildError::MaxRetriesExceeded { attempts: 3, .. }));
    assert_eq!(provider.call_count(), 3);
    // Only classification prompts were sent.
    let systems = provider.system_prompts();
    assert!(systems.windows(2).all(|w| w[0] == w[1]));
    assert!(fixture.published(8).is_empty());
    assert_eq!(store.status(8), Some(RequestStatus::Pending));
}

#[tokio::test]
async fn test_no_pending_rows_performs_no_writes() {
    let fixture = Fixture::new();
    let mut done = request(1, "demo-shop", UserType::Free);
    done.status = RequestStatus::Completed;
    let store = Arc::new(MemoryStore::new(vec![done]));
    let provider = Arc::new(ScriptedProvider::always(GENERATED_JSON));
    let orchestrator = fixture.orchestrator(
        store.clone(),
        provider.clone(),
        GenerationConfig::default(),
        PublishConfig::default(),
    );

    let err = orchestrator.run_once().await.unwrap_err();

    assert!(matches!(err, BuildError::MissingResource(_)));
    assert!(store.writes.lock().is_empty());
    assert_eq!(provider.call_count(), 0);
    assert!(!fixture.output.path().join("LIVE").exists());
}

#[tokio::test]
async fn test_preview_store_never_changes_status() {
    let fixture = Fixture::new();
    let inner = MemoryStore::new(vec![request(12, "demo-shop", UserType::Paid)]);
    let store = Arc::new(PreviewStore::new(inner));
    let provider = Arc::new(ScriptedProvider::always(GENERATED_JSON));
    let publish = PublishConfig {
        upload_values: true,
        ..PublishConfig::default()
    };
    let orchestrator =
        fixture.orchestrator(store.clone(), provider, GenerationConfig::default(), publish);

    let report = orchestrator.run_once().await.unwrap();
    assert_eq!(
        fixture.published(12),
        vec!["index.html", "shop.html", "shop.values.json"]
    );
    assert_eq!(report.published.len(), 3);

    // Still pending, so the next run would pick it up again.
    let again = store.fetch_pending().await.unwrap().unwrap();
    assert_eq!(again.id, 12);
    assert_eq!(again.status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_rejected_notification_still_completes_build() {
    let fixture = Fixture::new();
    let (base, seen) = serve_status("204 No Content");
    let store = Arc::new(MemoryStore::new(vec![request(31, "demo-shop", UserType::Free)]));
    let provider = Arc::new(ScriptedProvider::always(GENERATED_JSON));
    let notifier = Notifier::new(format!("{}/done/{{id}}", base), Some(Duration::from_secs(5)))
        .unwrap();
    let orchestrator = fixture
        .orchestrator(
            store.clone(),
            provider,
            GenerationConfig::default(),
            PublishConfig::default(),
        )
        .with_notifier(Some(notifier));

    let report = orchestrator.run_once().await.unwrap();

    assert!(!report.notified);
    assert_eq!(report.published, vec!["shop.html", "index.html"]);
    assert_eq!(store.status(31), Some(RequestStatus::Completed));
    assert_eq!(*seen.lock(), vec!["GET /done/31 HTTP/1.1".to_string()]);
}

#[tokio::test]
async fn test_accepted_notification_is_reported() {
    let fixture = Fixture::new();
    let (base, _seen) = serve_status("200 OK");
    let store = Arc::new(MemoryStore::new(vec![request(32, "demo-shop", UserType::Free)]));
    let provider = Arc::new(ScriptedProvider::always(GENERATED_JSON));
    let notifier = Notifier::new(format!("{}/done/{{id}}", base), None).unwrap();
    let orchestrator = fixture
        .orchestrator(
            store.clone(),
            provider,
            GenerationConfig::default(),
            PublishConfig::default(),
        )
        .with_notifier(Some(notifier));

    let report = orchestrator.run_once().await.unwrap();

    assert!(report.notified);
    assert_eq!(store.status(32), Some(RequestStatus::Completed));
}
