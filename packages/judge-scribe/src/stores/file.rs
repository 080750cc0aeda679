//! JSON-file credential store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreResult;
use crate::security::credentials::SecretString;
use crate::traits::store::CredentialStore;

/// Key-value store persisted as one JSON object.
///
/// A missing file reads as an empty store. Writes rewrite the file.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(values)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), keys = values.len(), "credential store saved");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<SecretString>> {
        let _guard = self.lock.lock().await;
        let values = self.load().await?;
        Ok(values
            .get(key)
            .filter(|value| !value.trim().is_empty())
            .map(|value| SecretString::new(value.as_str())))
    }

    async fn set(&self, key: &str, value: SecretString) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.expose().to_string());
        self.save(&values).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut values = self.load().await?;
        if values.remove(key).is_some() {
            self.save(&values).await?;
        }
        Ok(())
    }
}
