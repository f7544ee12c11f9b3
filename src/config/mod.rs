//! Configuration module - typed config with file/env loading

pub mod loader;
pub mod types;

pub use loader::{load_config, load_from_env};
pub use types::{AppConfig, AppSettings, ArbConfig, ExchangeConfig, SizeScaling, SubmissionConfig};
