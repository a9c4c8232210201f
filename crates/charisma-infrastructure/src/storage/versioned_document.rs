//! One versioned JSON document stored under a single key.

use std::sync::Arc;

use charisma_core::error::{CharismaError, Result};
use charisma_core::storage::KeyValueStore;

/// Raw access to a versioned document.
///
/// Repositories own the migrator for their entity and use this helper for the
/// JSON plumbing around it.
#[derive(Clone)]
pub struct VersionedDocument {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl VersionedDocument {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads and parses the document. Absent or blank values yield `None`.
    pub async fn load_value(&self) -> Result<Option<serde_json::Value>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&raw).map_err(|e| CharismaError::Serialization {
            format: "JSON".to_string(),
            message: format!("Failed to parse document '{}': {}", self.key, e),
        })?;
        Ok(Some(value))
    }

    /// Reads the document, tagging data written before versioning.
    ///
    /// An object without a `version` field is read as `legacy_version`. When
    /// `list_field` is given, a bare JSON array is read as an object holding
    /// that array under `list_field`.
    pub async fn load_tagged(
        &self,
        legacy_version: &str,
        list_field: Option<&str>,
    ) -> Result<Option<serde_json::Value>> {
        let Some(value) = self.load_value().await? else {
            return Ok(None);
        };
        Ok(Some(tag_legacy_version(value, legacy_version, list_field)))
    }

    /// Writes an already serialized document.
    pub async fn save_json(&self, json: String) -> Result<()> {
        self.store.set(&self.key, json).await
    }

    pub async fn remove(&self) -> Result<()> {
        self.store.remove(&self.key).await
    }
}

fn tag_legacy_version(
    value: serde_json::Value,
    legacy_version: &str,
    list_field: Option<&str>,
) -> serde_json::Value {
    use serde_json::{Map, Value};

    match (value, list_field) {
        (Value::Array(items), Some(field)) => {
            tracing::info!("Reading unversioned list as {}", legacy_version);
            let mut object = Map::new();
            object.insert("version".to_string(), Value::String(legacy_version.to_string()));
            object.insert(field.to_string(), Value::Array(items));
            Value::Object(object)
        }
        (Value::Object(mut object), _) if !object.contains_key("version") => {
            tracing::info!("Reading unversioned document as {}", legacy_version);
            object.insert("version".to_string(), Value::String(legacy_version.to_string()));
            Value::Object(object)
        }
        (other, _) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKeyValueStore;

    #[tokio::test]
    async fn test_blank_document_is_absent() {
        let store = InMemoryKeyValueStore::new();
        store.set("doc", "   ".to_string()).await.unwrap();
        let document = VersionedDocument::new(Arc::new(store), "doc");

        assert!(document.load_value().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_serialization_error() {
        let store = InMemoryKeyValueStore::new();
        store.set("doc", "{oops".to_string()).await.unwrap();
        let document = VersionedDocument::new(Arc::new(store), "doc");

        let err = document.load_value().await.unwrap_err();
        assert!(matches!(err, CharismaError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let document = VersionedDocument::new(Arc::new(InMemoryKeyValueStore::new()), "doc");
        document
            .save_json(r#"{"version":"1.0.0","x":1}"#.to_string())
            .await
            .unwrap();

        let value = document.load_value().await.unwrap().unwrap();
        assert_eq!(value["x"], 1);
        document.remove().await.unwrap();
        assert!(document.load_value().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_tagged_wraps_bare_list() {
        let store = InMemoryKeyValueStore::new();
        store.set("doc", r#"[{"id":"1"}]"#.to_string()).await.unwrap();
        let document = VersionedDocument::new(Arc::new(store), "doc");

        let value = document
            .load_tagged("1.0.0", Some("items"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["items"][0]["id"], "1");
    }

    #[tokio::test]
    async fn test_load_tagged_keeps_existing_version() {
        let store = InMemoryKeyValueStore::new();
        store
            .set("doc", r#"{"version":"2.0.0","x":1}"#.to_string())
            .await
            .unwrap();
        store.set("legacy", r#"{"x":1}"#.to_string()).await.unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(store);

        let current = VersionedDocument::new(store.clone(), "doc")
            .load_tagged("1.0.0", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current["version"], "2.0.0");

        let legacy = VersionedDocument::new(store, "legacy")
            .load_tagged("1.0.0", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(legacy["version"], "1.0.0");
    }
}
