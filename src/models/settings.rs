// src/models/settings.rs
use crate::utils::sanitize::sanitize_text_field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Option name the settings record is persisted under.
pub const SETTINGS_OPTION: &str = "product_review_manager_settings";

/// One declared property of the settings record. Every property is a string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingProperty {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub default: &'static str,
}

pub const SETTINGS_SCHEMA: &[SettingProperty] = &[
    SettingProperty {
        key: "setting1",
        label: "Setting 1",
        placeholder: "Enter Text",
        default: "",
    },
    SettingProperty {
        key: "setting2",
        label: "Setting 2",
        placeholder: "Enter Another Text",
        default: "",
    },
];

pub fn schema_property(key: &str) -> Option<&'static SettingProperty> {
    SETTINGS_SCHEMA.iter().find(|property| property.key == key)
}

/// How a validated update is folded into the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Keys absent from the update fall back to their schema defaults.
    Replace,
    /// Keys absent from the update keep their stored values.
    Merge,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Invalid settings data provided.")]
    Invalid(Vec<String>),
}

/// The plugin's single configuration record: every schema key, always present.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Settings(BTreeMap<String, String>);

impl Default for Settings {
    fn default() -> Self {
        Settings(
            SETTINGS_SCHEMA
                .iter()
                .map(|property| (property.key.to_string(), property.default.to_string()))
                .collect(),
        )
    }
}

impl Settings {
    /// Builds a record from whatever was persisted, dropping keys the schema no longer
    /// declares and filling the missing ones with defaults.
    pub fn from_stored(stored: BTreeMap<String, String>) -> Self {
        let mut settings = Settings::default();
        for (key, value) in stored {
            if schema_property(&key).is_some() {
                settings.0.insert(key, sanitize_text_field(&value));
            }
        }
        settings
    }

    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Sets a declared key. Undeclared keys are ignored.
    pub fn set(&mut self, key: &str, value: String) {
        if schema_property(key).is_some() {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn apply(&self, update: BTreeMap<String, String>, mode: UpdateMode) -> Settings {
        let mut next = match mode {
            UpdateMode::Replace => Settings::default(),
            UpdateMode::Merge => self.clone(),
        };
        for (key, value) in update {
            next.set(&key, value);
        }
        next
    }
}

/// Validates a full or partial settings body against [`SETTINGS_SCHEMA`] and sanitizes
/// every value. All violations are reported together.
pub fn validate_settings(body: &Value) -> Result<BTreeMap<String, String>, SettingsError> {
    let object = match body {
        Value::Object(object) => object,
        _ => {
            return Err(SettingsError::Invalid(vec![
                "settings is not of type object.".to_string(),
            ]))
        }
    };

    let mut errors = Vec::new();
    let mut update = BTreeMap::new();
    for (key, value) in object {
        if schema_property(key).is_none() {
            errors.push(format!("{key} is not a valid property of Object."));
            continue;
        }
        match value {
            Value::String(value) => {
                update.insert(key.clone(), sanitize_text_field(value));
            }
            _ => errors.push(format!("{key} is not of type string.")),
        }
    }

    if errors.is_empty() {
        Ok(update)
    } else {
        Err(SettingsError::Invalid(errors))
    }
}
