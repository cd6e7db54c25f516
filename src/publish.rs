//! Publisher: uploads finished pages to a remote directory keyed by request id.
//!
//! Remote sessions are blocking (the FTP client is synchronous), so every upload
//! runs on tokio's blocking pool. Each call opens its own session; files are
//! independent units of work and nothing is rolled back on a later failure.

pub mod ftp;
pub mod local;

pub use ftp::FtpConnector;
pub use local::LocalDirConnector;

use crate::error::BuildError;
use std::sync::Arc;
use tracing::{debug, info};

/// Root directory used when nothing is configured.
pub const DEFAULT_ROOT_DIR: &str = "LIVE";

/// One open connection to a remote file store.
///
/// Directory operations are relative to the session's current directory.
pub trait RemoteSession: Send {
    fn change_dir(&mut self, path: &str) -> Result<(), BuildError>;
    fn make_dir(&mut self, path: &str) -> Result<(), BuildError>;
    fn store(&mut self, filename: &str, content: &[u8]) -> Result<(), BuildError>;

    fn close(&mut self) -> Result<(), BuildError> {
        Ok(())
    }
}

/// Opens remote sessions.
pub trait RemoteConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn RemoteSession>, BuildError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

#[derive(Clone)]
pub struct Publisher {
    connector: Arc<dyn RemoteConnector>,
    root_dir: String,
}

impl Publisher {
    pub fn new(connector: Arc<dyn RemoteConnector>, root_dir: impl Into<String>) -> Self {
        Self {
            connector,
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    /// Remote directory for a request: `{root_dir}/{directory_key}`.
    pub fn remote_dir(&self, directory_key: &str) -> String {
        let root = self.root_dir.trim_matches('/');
        if root.is_empty() {
            directory_key.to_string()
        } else {
            format!("{}/{}", root, directory_key)
        }
    }

    /// Upload `content` as `filename` under the request's remote directory.
    ///
    /// Missing directories are created one segment at a time, so publishing to
    /// the same key again is safe.
    pub async fn publish(
        &self,
        directory_key: &str,
        filename: &str,
        content: impl Into<Vec<u8>>,
    ) -> Result<(), BuildError> {
        let connector = Arc::clone(&self.connector);
        let remote_dir = self.remote_dir(directory_key);
        let filename = filename.to_string();
        let content = content.into();
        let target = connector.describe();

        let uploaded = tokio::task::spawn_blocking(move || {
            upload(connector.as_ref(), &remote_dir, &filename, &content)
                .map(|()| (remote_dir, filename, content.len()))
        })
        .await
        .map_err(|e| BuildError::Publish(format!("Upload task failed: {}", e)))?;

        let (remote_dir, filename, bytes) = uploaded?;
        info!(target = %target, dir = %remote_dir, file = %filename, bytes, "Published file");
        Ok(())
    }
}

fn upload(
    connector: &dyn RemoteConnector,
    remote_dir: &str,
    filename: &str,
    content: &[u8],
) -> Result<(), BuildError> {
    let mut session = connector.connect()?;
    ensure_dir(session.as_mut(), remote_dir)?;
    session.store(filename, content)?;
    session.close()
}

/// Enter `path`, creating any missing segment on the way.
pub fn ensure_dir(session: &mut dyn RemoteSession, path: &str) -> Result<(), BuildError> {
    if session.change_dir(path).is_ok() {
        return Ok(());
    }

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if session.change_dir(segment).is_err() {
            debug!(segment, "Creating remote directory");
            session.make_dir(segment)?;
            session.change_dir(segment)?;
        }
    }
    Ok(())
}
