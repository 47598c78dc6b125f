pub mod audit;
pub mod codegen;
pub mod engine;
pub mod executor;
pub mod selection;
pub mod session;

pub use crate::domain::dataset::{ColumnType, Dataset};
pub use crate::domain::model::{CleaningScript, Issue, ScriptOrigin, SessionState};
pub use crate::domain::ports::{ConfigProvider, ModelClient, Storage};
pub use crate::utils::error::Result;
