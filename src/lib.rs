pub mod app;
pub mod auth;
pub mod components;
pub mod db;
pub mod fields;
pub mod models;
pub mod reviews;
pub mod search;
pub mod server_fns;
pub mod utils;

#[cfg(feature = "ssr")]
pub mod api;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod error;
#[cfg(feature = "ssr")]
pub mod settings;
#[cfg(feature = "ssr")]
pub mod state;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::AdminApp;
    utils::panic_hook::init();
    leptos::mount_to_body(AdminApp);
}
