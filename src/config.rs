// src/config.rs
use crate::auth::{Actor, Role};
use crate::search::response::{FormatOptions, FALLBACK_DATE_FORMAT};
use chrono::format::{Item, StrftimeItems};
use leptos::logging::{log, warn};

pub const DEFAULT_DB_PATH: &str = "product-review-manager.db";
pub const DEFAULT_SITE_URL: &str = "http://127.0.0.1:3004";

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    /// Base of every permalink, without a trailing slash.
    pub site_url: String,
    pub date_format: String,
    pub admin_token: Option<String>,
    pub editor_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: DEFAULT_DB_PATH.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            date_format: FALLBACK_DATE_FORMAT.to_string(),
            admin_token: None,
            editor_token: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let date_format = match non_empty("PRM_DATE_FORMAT") {
            Some(format) if is_valid_date_format(&format) => format,
            Some(format) => {
                warn!("[SETTINGS] Ignoring invalid PRM_DATE_FORMAT '{}'", format);
                defaults.date_format
            }
            None => defaults.date_format,
        };

        let config = Config {
            db_path: non_empty("PRM_DB_PATH").unwrap_or(defaults.db_path),
            site_url: non_empty("PRM_SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            date_format,
            admin_token: non_empty("PRM_ADMIN_TOKEN"),
            editor_token: non_empty("PRM_EDITOR_TOKEN"),
        };
        if config.admin_token.is_none() {
            warn!("[SETTINGS] PRM_ADMIN_TOKEN is not set; settings endpoints will reject every request");
        }
        log!("[SETTINGS] Loaded configuration for {}", config.site_url);
        config
    }

    /// Maps a request token onto a role. Unknown or missing tokens are anonymous.
    pub fn resolve_actor(&self, token: Option<&str>) -> Actor {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return Actor::anonymous();
        };
        if self.admin_token.as_deref() == Some(token) {
            Actor::with_role(Role::Administrator)
        } else if self.editor_token.as_deref() == Some(token) {
            Actor::with_role(Role::Editor)
        } else {
            Actor::anonymous()
        }
    }

    pub fn format_options(&self) -> FormatOptions<'_> {
        FormatOptions {
            site_url: &self.site_url,
            date_format: &self.date_format,
        }
    }
}

pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(config(&[]), Config::default());
    }

    #[test]
    fn site_url_loses_trailing_slash() {
        let config = config(&[("PRM_SITE_URL", "https://shop.test/")]);
        assert_eq!(config.site_url, "https://shop.test");
    }

    #[test]
    fn invalid_date_format_falls_back() {
        assert_eq!(config(&[("PRM_DATE_FORMAT", "%Q")]).date_format, FALLBACK_DATE_FORMAT);
        assert_eq!(config(&[("PRM_DATE_FORMAT", "%Y-%m-%d")]).date_format, "%Y-%m-%d");
    }

    #[test]
    fn tokens_resolve_to_roles() {
        let config = config(&[("PRM_ADMIN_TOKEN", "admin-secret"), ("PRM_EDITOR_TOKEN", "ed")]);
        assert_eq!(
            config.resolve_actor(Some("admin-secret")).role(),
            Some(Role::Administrator)
        );
        assert_eq!(config.resolve_actor(Some("ed")).role(), Some(Role::Editor));
        assert!(!config.resolve_actor(Some("guess")).is_authenticated());
        assert!(!config.resolve_actor(None).is_authenticated());
        assert!(!config.resolve_actor(Some("")).is_authenticated());
    }
}
