pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gemini::GeminiClient;
pub use adapters::storage::LocalStorage;
pub use config::{API_KEY_ENV, DEFAULT_ENDPOINT};
pub use core::engine::CleaningEngine;
pub use core::session::SessionContext;
pub use domain::dataset::{ColumnType, Dataset};
pub use domain::model::{CleaningScript, Issue, ScriptOrigin, SessionState};
pub use utils::error::{CleanerError, Result};
