pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, OpenAiClient};
pub use config::CleanerConfig;
pub use crate::core::{
    cleaner::TranscriptCleaner,
    engine::CleanerEngine,
    pipeline::{CleaningPipeline, RunPaths},
};
pub use utils::error::{CleanerError, Result};
