use crate::utils::error::{CleanerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Suggested `qa_model` when a stronger reviewer is wanted.
pub const ADVANCED_MODEL: &str = "gpt-4";

pub const CHUNK_SIZE: usize = 3000;
pub const CHUNK_OVERLAP: usize = 500;
pub const MAX_WORKERS: usize = 4;
pub const CONTEXT_WINDOW: usize = 1000;

pub const QUALITY_THRESHOLD: u8 = 80;
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub llm: LlmConfig,
    pub processing: ProcessingConfig,
    pub quality: QualityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub qa_model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            qa_model: None,
            temperature: 0.1,
            max_tokens: 2000,
            timeout_seconds: 120,
            max_retries: MAX_RETRIES,
            retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_workers: usize,
    pub context_window: usize,
    pub identify_speakers: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            chunk_overlap: CHUNK_OVERLAP,
            max_workers: MAX_WORKERS,
            context_window: CONTEXT_WINDOW,
            identify_speakers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub enabled: bool,
    pub threshold: u8,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: QUALITY_THRESHOLD,
        }
    }
}

impl CleanerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| CleanerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// The API key, ignoring `${VAR}` placeholders whose variable was unset.
    pub fn api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }

    pub fn qa_model(&self) -> &str {
        self.llm.qa_model.as_deref().unwrap_or(&self.llm.model)
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables are left as written.
fn substitute_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

impl Validate for CleanerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("llm.api_base", &self.llm.api_base)?;

        if self.llm.model.trim().is_empty() {
            return Err(CleanerError::ConfigValidationError {
                field: "llm.model".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }

        validation::validate_range("llm.temperature", self.llm.temperature as f64, 0.0, 2.0)?;
        validation::validate_positive_number("llm.max_tokens", self.llm.max_tokens as usize, 1)?;
        validation::validate_positive_number("llm.timeout_seconds", self.llm.timeout_seconds as usize, 1)?;

        let processing = &self.processing;
        validation::validate_positive_number("processing.chunk_size", processing.chunk_size, 1)?;
        validation::validate_less_than(
            "processing.chunk_overlap",
            processing.chunk_overlap,
            "processing.chunk_size",
            processing.chunk_size,
        )?;
        validation::validate_positive_number("processing.max_workers", processing.max_workers, 1)?;

        validation::validate_range("quality.threshold", self.quality.threshold as f64, 0.0, 100.0)?;

        Ok(())
    }
}
