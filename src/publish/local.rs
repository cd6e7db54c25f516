//! Local directory transport, used to preview a build without touching the live server.

use crate::error::BuildError;
use crate::publish::{RemoteConnector, RemoteSession};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub struct LocalDirConnector {
    base: PathBuf,
}

impl LocalDirConnector {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl RemoteConnector for LocalDirConnector {
    fn connect(&self) -> Result<Box<dyn RemoteSession>, BuildError> {
        fs::create_dir_all(&self.base).map_err(|e| {
            BuildError::Publish(format!("Cannot create {}: {}", self.base.display(), e))
        })?;
        Ok(Box::new(LocalDirSession {
            cwd: self.base.clone(),
        }))
    }

    fn describe(&self) -> String {
        format!("file://{}", self.base.display())
    }
}

struct LocalDirSession {
    cwd: PathBuf,
}

impl LocalDirSession {
    /// Resolve a relative remote path; anything escaping the base is rejected.
    fn resolve(&self, path: &str) -> Result<PathBuf, BuildError> {
        let relative = Path::new(path);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain {
            return Err(BuildError::Publish(format!("Refusing path '{}'", path)));
        }
        Ok(self.cwd.join(relative))
    }
}

impl RemoteSession for LocalDirSession {
    fn change_dir(&mut self, path: &str) -> Result<(), BuildError> {
        let next = self.resolve(path)?;
        if next.is_dir() {
            self.cwd = next;
            Ok(())
        } else {
            Err(BuildError::Publish(format!("{} does not exist", next.display())))
        }
    }

    fn make_dir(&mut self, path: &str) -> Result<(), BuildError> {
        let dir = self.resolve(path)?;
        fs::create_dir(&dir)
            .map_err(|e| BuildError::Publish(format!("Cannot create {}: {}", dir.display(), e)))
    }

    fn store(&mut self, filename: &str, content: &[u8]) -> Result<(), BuildError> {
        let file = self.resolve(filename)?;
        fs::write(&file, content)
            .map_err(|e| BuildError::Publish(format!("Cannot write {}: {}", file.display(), e)))
    }
}
