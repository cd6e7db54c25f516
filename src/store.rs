//! Request store: the relational table of pending website builds.

pub mod mysql;

pub use mysql::MySqlRequestStore;

use crate::error::BuildError;
use crate::types::BuildRequest;
use async_trait::async_trait;

/// Build request repository.
///
/// Status only moves forward PENDING -> BUILDING -> COMPLETED, except that a
/// failed build releases its claim back to PENDING.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Most recent PENDING request (highest id), if any.
    async fn fetch_pending(&self) -> Result<Option<BuildRequest>, BuildError>;

    /// Move `id` from PENDING to BUILDING.
    ///
    /// Returns `false` when the row is no longer PENDING, meaning another run owns it.
    async fn claim(&self, id: i64) -> Result<bool, BuildError>;

    /// Move `id` from BUILDING back to PENDING.
    async fn release(&self, id: i64) -> Result<(), BuildError>;

    async fn mark_completed(&self, id: i64) -> Result<(), BuildError>;
}

/// Read-only view over another store. Requests are fetched but their status
/// never changes. Used for preview builds.
pub struct PreviewStore<S> {
    inner: S,
}

impl<S: RequestStore> PreviewStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: RequestStore> RequestStore for PreviewStore<S> {
    async fn fetch_pending(&self) -> Result<Option<BuildRequest>, BuildError> {
        self.inner.fetch_pending().await
    }

    async fn claim(&self, _id: i64) -> Result<bool, BuildError> {
        Ok(true)
    }

    async fn release(&self, _id: i64) -> Result<(), BuildError> {
        Ok(())
    }

    async fn mark_completed(&self, _id: i64) -> Result<(), BuildError> {
        Ok(())
    }
}
