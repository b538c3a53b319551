use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("OpenAI API key not found")]
    MissingApiKey,

    #[error("LLM API returned {status}: {message}")]
    LlmStatusError { status: u16, message: String },

    #[error("Malformed LLM response: {message}")]
    LlmResponseError { message: String },

    #[error("Transcript processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Llm,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CleanerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) | Self::ProcessingError { .. } => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingApiKey => ErrorCategory::Configuration,
            Self::LlmStatusError { .. } | Self::LlmResponseError { .. } => ErrorCategory::Llm,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError(_) | Self::LlmStatusError { .. } if self.is_retryable() => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Transient failures worth another attempt: transport errors, rate limits, 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::LlmStatusError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check your network connection and the API base URL, then retry",
            Self::IoError(_) => "Check that the input file exists and the output location is writable",
            Self::SerializationError(_) => "The data could not be encoded or decoded as JSON",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags"
            }
            Self::MissingApiKey => "Set OPENAI_API_KEY in the environment or a .env file, or pass --api-key",
            Self::LlmStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Verify that the API key is valid and has access to the requested model"
            }
            Self::LlmStatusError { .. } => "The LLM service is unavailable or rate limited; wait and retry",
            Self::LlmResponseError { .. } => "Try a different model or a smaller chunk size",
            Self::ProcessingError { .. } => "Inspect the transcript for unusual formatting",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingApiKey => {
                "OpenAI API key not found. Set OPENAI_API_KEY or use --api-key".to_string()
            }
            Self::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            Self::LlmStatusError { status, message } => {
                format!("The language model service rejected the request ({}): {}", status, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable_medium() {
        let err = CleanerError::LlmStatusError {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.category(), ErrorCategory::Llm);
    }

    #[test]
    fn test_unauthorized_is_not_retryable() {
        let err = CleanerError::LlmStatusError {
            status: 401,
            message: "bad key".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("API key"));
    }

    #[test]
    fn test_request_build_failure_is_not_retryable() {
        let build_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = CleanerError::from(build_err);

        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_missing_key_is_configuration() {
        let err = CleanerError::MissingApiKey;
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_friendly_message().contains("--api-key"));
    }
}
