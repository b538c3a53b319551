use crate::config::CleanerConfig;
use crate::core::prompts::{self, parse_json_reply};
use crate::domain::model::{GrammarCorrection, QualityReport, SegmentOutcome, SpeakerAnalysis};
use crate::domain::ports::LanguageModel;
use crate::utils::error::{CleanerError, Result};

#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub context_window: usize,
    pub identify_speakers: bool,
    pub qa_model: Option<String>,
    pub quality_threshold: u8,
}

impl ProcessorOptions {
    pub fn from_config(config: &CleanerConfig) -> Self {
        Self {
            context_window: config.processing.context_window,
            identify_speakers: config.processing.identify_speakers,
            qa_model: config.llm.qa_model.clone(),
            quality_threshold: config.quality.threshold,
        }
    }
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self::from_config(&CleanerConfig::default())
    }
}

/// Runs the per-segment LLM prompts and the final quality review.
pub struct TranscriptProcessor<L: LanguageModel> {
    llm: L,
    options: ProcessorOptions,
}

impl<L: LanguageModel> TranscriptProcessor<L> {
    pub fn new(llm: L, options: ProcessorOptions) -> Self {
        Self { llm, options }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Speaker identification followed by grammar correction.
    ///
    /// API failures are returned as errors. A reply that is not valid JSON
    /// decodes to empty data so the caller can fall back to the raw segment.
    pub async fn process_segment(&self, segment: &str, previous_context: &str) -> Result<SegmentOutcome> {
        let speaker_analysis = if self.options.identify_speakers {
            let reply = self
                .llm
                .complete(prompts::speaker_identification(segment))
                .await?;
            parse_json_reply::<SpeakerAnalysis>(&reply.content).unwrap_or_default()
        } else {
            SpeakerAnalysis::default()
        };

        let reply = self
            .llm
            .complete(prompts::grammar_correction(
                segment,
                previous_context,
                self.options.context_window,
            ))
            .await?;
        let grammar = parse_json_reply::<GrammarCorrection>(&reply.content).unwrap_or_default();

        if let Some(notes) = grammar.processing_notes.as_deref().filter(|n| !n.is_empty()) {
            tracing::debug!("Processing notes: {}", notes);
        }

        Ok(SegmentOutcome {
            speaker_analysis,
            grammar,
        })
    }

    pub async fn quality_check(&self, original: &str, processed: &str) -> Result<QualityReport> {
        let request =
            prompts::quality_review(original, processed).with_model(self.options.qa_model.clone());
        let reply = self.llm.complete(request).await?;

        let mut report: QualityReport =
            parse_json_reply(&reply.content).ok_or_else(|| CleanerError::LlmResponseError {
                message: "quality review reply was not valid JSON".to_string(),
            })?;
        report.passed =
            report.quality_score >= self.options.quality_threshold && !report.content_loss_detected;
        Ok(report)
    }
}
