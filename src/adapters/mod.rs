// Adapters layer: concrete implementations for external systems.

pub mod openai;

pub use crate::config::cli::LocalStorage;
pub use openai::OpenAiClient;
