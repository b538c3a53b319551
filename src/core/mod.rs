pub mod chunker;
pub mod cleaner;
pub mod context;
pub mod engine;
pub mod pipeline;
pub mod processor;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{
    Chunk, CleanReport, CleanedTranscript, ProcessedChunk, QualityReport, TokenUsage, Transcript,
};
pub use crate::domain::ports::{LanguageModel, Pipeline, Storage};
pub use crate::utils::error::Result;
