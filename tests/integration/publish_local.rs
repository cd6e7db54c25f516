//! Publisher against a local directory.

use pagesmith::error::BuildError;
use pagesmith::publish::{ensure_dir, LocalDirConnector, Publisher, RemoteConnector};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_publish_twice_to_same_request() {
    let temp_dir = TempDir::new().unwrap();
    let publisher = Publisher::new(Arc::new(LocalDirConnector::new(temp_dir.path())), "LIVE");

    publisher.publish("42", "home.html", "<p>first</p>").await.unwrap();
    publisher.publish("42", "home.html", "<p>second</p>").await.unwrap();
    publisher.publish("42", "index.html", "<iframe>").await.unwrap();

    let dir = temp_dir.path().join("LIVE/42");
    assert_eq!(fs::read_to_string(dir.join("home.html")).unwrap(), "<p>second</p>");
    assert!(dir.join("index.html").is_file());
}

#[tokio::test]
async fn test_nested_root_directory_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let publisher = Publisher::new(
        Arc::new(LocalDirConnector::new(temp_dir.path())),
        "sites/LIVE/",
    );

    publisher.publish("7", "shop.html", vec![0u8, 159, 146, 150]).await.unwrap();

    let written = fs::read(temp_dir.path().join("sites/LIVE/7/shop.html")).unwrap();
    assert_eq!(written, vec![0u8, 159, 146, 150]);
}

#[test]
fn test_ensure_dir_walks_existing_prefix() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("LIVE")).unwrap();

    let connector = LocalDirConnector::new(temp_dir.path());
    let mut session = connector.connect().unwrap();
    ensure_dir(session.as_mut(), "LIVE/99/assets").unwrap();
    session.store("app.css", b"body{}").unwrap();

    assert!(temp_dir.path().join("LIVE/99/assets/app.css").is_file());
}

#[tokio::test]
async fn test_unwritable_target_is_publish_error() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the root directory should be.
    fs::write(temp_dir.path().join("LIVE"), "not a directory").unwrap();
    let publisher = Publisher::new(Arc::new(LocalDirConnector::new(temp_dir.path())), "LIVE");

    let err = publisher.publish("1", "home.html", "x").await.unwrap_err();
    assert!(matches!(err, BuildError::Publish(_)));
}
