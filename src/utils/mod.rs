#[cfg(feature = "hydrate")]
pub mod panic_hook;
pub mod sanitize;
