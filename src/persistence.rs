//! Persistence gateway: the whole [`Store`] serialized to one JSON file.
//!
//! Writes go to a temp file in the same directory followed by a rename, so a
//! crash mid-write leaves the previous store intact. Every save is wrapped in
//! a timeout so a wedged filesystem surfaces as a persistence error instead
//! of blocking the writer lock indefinitely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::models::Store;

#[derive(Debug, Clone)]
pub struct StoreGateway {
    path: PathBuf,
    save_timeout: Duration,
}

impl StoreGateway {
    pub fn new(path: impl Into<PathBuf>, save_timeout: Duration) -> Self {
        StoreGateway {
            path: path.into(),
            save_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store from disk, or returns the seed inventory when no file
    /// exists yet.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Store, ServiceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let store: Store = serde_json::from_slice(&bytes)?;
                info!(
                    sites = store.sites.len(),
                    transactions = store.transactions.len(),
                    "loaded store from disk"
                );
                Ok(store)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("no store file found, starting from seed inventory");
                Ok(Store::seed())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Serializes the whole store and atomically replaces the backing file.
    #[instrument(skip(self, store), fields(path = %self.path.display()))]
    pub async fn save(&self, store: &Store) -> Result<(), ServiceError> {
        let bytes = serde_json::to_vec_pretty(store)?;
        timeout(self.save_timeout, self.write_atomic(bytes))
            .await
            .map_err(|_| {
                ServiceError::Persistence(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("store write exceeded {:?}", self.save_timeout),
                ))
            })??;
        Ok(())
    }

    async fn write_atomic(&self, bytes: Vec<u8>) -> Result<(), ServiceError> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
