// src/state.rs
use crate::config::Config;
use crate::db::Database;
use crate::settings::SettingsStore;

/// Services shared by every handler through `web::Data`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: SettingsStore,
    pub config: Config,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        AppState {
            settings: SettingsStore::new(db.clone()),
            db,
            config,
        }
    }
}
