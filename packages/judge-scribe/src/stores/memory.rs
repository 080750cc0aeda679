//! In-memory credential store for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::security::credentials::SecretString;
use crate::traits::store::CredentialStore;

/// In-memory key-value store. Data is lost when dropped.
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, SecretString>>,
}

impl MemoryCredentialStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value (builder pattern).
    pub fn with(self, key: &str, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), SecretString::new(value));
        self
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.read().unwrap().contains_key(key)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> StoreResult<Option<SecretString>> {
        Ok(self
            .values
            .read()
            .unwrap()
            .get(key)
            .filter(|value| !value.is_blank())
            .cloned())
    }

    async fn set(&self, key: &str, value: SecretString) -> StoreResult<()> {
        self.values.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.values.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::store::{GEMINI_API_KEY, GITHUB_TOKEN};

    #[tokio::test]
    async fn test_get_set_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.get(GEMINI_API_KEY).await.unwrap().is_none());

        store
            .set(GEMINI_API_KEY, SecretString::new("key"))
            .await
            .unwrap();
        assert_eq!(store.get(GEMINI_API_KEY).await.unwrap().unwrap().expose(), "key");

        store.remove(GEMINI_API_KEY).await.unwrap();
        assert!(!store.contains(GEMINI_API_KEY));
    }

    #[tokio::test]
    async fn test_blank_reads_as_absent() {
        let store = MemoryCredentialStore::new().with(GITHUB_TOKEN, "");
        assert!(store.get(GITHUB_TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prepopulated_values() {
        let owned = String::from("gho_owned");
        let store = MemoryCredentialStore::new()
            .with(GITHUB_TOKEN, owned)
            .with(GEMINI_API_KEY, " AIza-key ");

        assert_eq!(store.get(GITHUB_TOKEN).await.unwrap().unwrap().expose(), "gho_owned");
        assert_eq!(store.get(GEMINI_API_KEY).await.unwrap().unwrap().expose(), "AIza-key");
    }
}
