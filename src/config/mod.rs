pub mod cli;
pub mod toml_config;

pub use toml_config::CleanerConfig;

#[cfg(feature = "cli")]
use crate::utils::error::{CleanerError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "transcript-cleaner")]
#[command(about = "Clean Zoom transcripts using AI")]
pub struct CliConfig {
    /// Input transcript file
    #[arg(short, long)]
    pub input: String,

    /// Output cleaned transcript file
    #[arg(short, long)]
    pub output: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Chat model used for cleaning
    #[arg(long)]
    pub model: Option<String>,

    /// Chat model used for the final quality review
    #[arg(long)]
    pub qa_model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(long)]
    pub chunk_size: Option<usize>,

    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Chunks processed concurrently
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Skip the final quality review
    #[arg(long)]
    pub skip_qa: bool,

    /// Skip the per-chunk speaker identification call
    #[arg(long)]
    pub skip_speakers: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Show the chunk plan without calling the API
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Log CPU and memory usage per phase
    #[arg(long)]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and layers the command line flags on top.
    pub fn resolve(&self) -> Result<CleanerConfig> {
        let mut config = match &self.config {
            Some(path) => CleanerConfig::from_file(path).map_err(|e| {
                CleanerError::config(format!("Failed to load config file '{}': {}", path, e))
            })?,
            None => CleanerConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut CleanerConfig) {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(qa_model) = &self.qa_model {
            config.llm.qa_model = Some(qa_model.clone());
        }
        if let Some(api_base) = &self.api_base {
            config.llm.api_base = api_base.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.processing.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = self.chunk_overlap {
            config.processing.chunk_overlap = chunk_overlap;
        }
        if let Some(max_workers) = self.max_workers {
            config.processing.max_workers = max_workers;
        }
        if self.skip_qa {
            config.quality.enabled = false;
        }
        if self.skip_speakers {
            config.processing.identify_speakers = false;
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output", &self.output)?;
        if let Some(report) = &self.report {
            validation::validate_path("report", report)?;
        }
        Ok(())
    }
}
