#[cfg(feature = "cli")]
pub mod cli;
pub mod schema_config;
