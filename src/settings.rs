// src/settings.rs
use crate::db::Database;
use crate::error::ApiError;
use crate::models::settings::{validate_settings, Settings, UpdateMode, SETTINGS_OPTION};
use leptos::logging::{log, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reads and writes the plugin settings record in the options table.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        SettingsStore { db }
    }

    /// The stored record, created with schema defaults on first read.
    pub async fn load(&self) -> Result<Settings, ApiError> {
        match self.db.get_option(SETTINGS_OPTION).await? {
            Some(raw) => {
                let stored: BTreeMap<String, Value> = serde_json::from_str(&raw)?;
                let strings = stored
                    .into_iter()
                    .filter_map(|(key, value)| match value {
                        Value::String(value) => Some((key, value)),
                        other => {
                            warn!("[SETTINGS] Dropping non-string stored value for {}: {}", key, other);
                            None
                        }
                    })
                    .collect();
                Ok(Settings::from_stored(strings))
            }
            None => {
                let defaults = Settings::default();
                self.store(&defaults).await?;
                log!("[SETTINGS] Created default settings record");
                Ok(defaults)
            }
        }
    }

    /// Validates `body` and folds it into the stored record. Nothing is written when
    /// validation fails.
    pub async fn update(&self, body: &Value, mode: UpdateMode) -> Result<Settings, ApiError> {
        let update = validate_settings(body)?;
        let current = self.load().await?;
        let next = current.apply(update, mode);
        self.store(&next).await?;
        log!("[SETTINGS] Settings saved ({:?})", mode);
        Ok(next)
    }

    async fn store(&self, settings: &Settings) -> Result<(), ApiError> {
        let raw = serde_json::to_string(settings)?;
        self.db.update_option(SETTINGS_OPTION, &raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> SettingsStore {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        SettingsStore::new(db)
    }

    #[tokio::test]
    async fn first_read_persists_defaults() {
        let store = store().await;
        let settings = store.load().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(store.db.get_option(SETTINGS_OPTION).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rejected_update_leaves_record_untouched() {
        let store = store().await;
        store
            .update(&json!({"setting1": "kept"}), UpdateMode::Merge)
            .await
            .unwrap();

        let err = store
            .update(&json!({"setting1": "lost", "bogus": "x"}), UpdateMode::Merge)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidSettings(_)));
        assert_eq!(store.load().await.unwrap().get("setting1"), "kept");
    }

    #[tokio::test]
    async fn replace_and_merge_modes() {
        let store = store().await;
        store
            .update(&json!({"setting1": "one", "setting2": "two"}), UpdateMode::Replace)
            .await
            .unwrap();

        let merged = store
            .update(&json!({"setting2": "three"}), UpdateMode::Merge)
            .await
            .unwrap();
        assert_eq!((merged.get("setting1"), merged.get("setting2")), ("one", "three"));

        let replaced = store
            .update(&json!({"setting2": "four"}), UpdateMode::Replace)
            .await
            .unwrap();
        assert_eq!((replaced.get("setting1"), replaced.get("setting2")), ("", "four"));
    }
}
