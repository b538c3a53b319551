use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub source: String,
    pub text: String,
}

/// A slice of the transcript sized for a single LLM round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub total: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speaker {
    pub original_format: String,
    pub speaker_id: String,
    pub actual_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Utterance {
    pub speaker_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerAnalysis {
    pub speakers: Vec<Speaker>,
    pub speaker_utterances: Vec<Utterance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarCorrection {
    pub processed_text: Option<String>,
    pub speakers_identified: Vec<String>,
    pub key_context_points: Vec<String>,
    pub processing_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentOutcome {
    pub speaker_analysis: SpeakerAnalysis,
    pub grammar: GrammarCorrection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedChunk {
    pub index: usize,
    pub processed_text: String,
    pub speakers: Vec<String>,
    /// The original chunk text was kept because cleaning failed.
    pub fell_back: bool,
}

/// Reply of the quality-assurance prompt. `passed` is filled in locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityReport {
    #[serde(deserialize_with = "lenient_score")]
    pub quality_score: u8,
    pub issues_found: Vec<String>,
    pub content_loss_detected: bool,
    pub recommendations: Vec<String>,
    pub passed: bool,
}

/// Accepts `85`, `85.5`, `"85"` or `"85%"`, clamped to 0..=100.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match &value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(score.clamp(0.0, 100.0).round() as u8)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub input: String,
    pub output: String,
    pub generated_at: DateTime<Utc>,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub speakers: Vec<String>,
    pub quality: Option<QualityReport>,
    pub usage: TokenUsage,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone)]
pub struct CleanedTranscript {
    pub text: String,
    pub report: CleanReport,
}
