use crate::config::CleanerConfig;
use crate::core::chunker::Chunker;
use crate::core::context::ContextMemory;
use crate::core::processor::{ProcessorOptions, TranscriptProcessor};
use crate::domain::model::{Chunk, ProcessedChunk, QualityReport, SegmentOutcome, TokenUsage};
use crate::domain::ports::LanguageModel;
use crate::utils::error::{CleanerError, Result};
use crate::utils::text::{extract_speakers_from_text, merge_segments_with_overlap};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub text: String,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub speakers: Vec<String>,
    pub quality: Option<QualityReport>,
    pub usage: TokenUsage,
}

pub struct TranscriptCleaner<L: LanguageModel + 'static> {
    processor: Arc<TranscriptProcessor<L>>,
    chunker: Chunker,
    max_workers: usize,
    quality_enabled: bool,
}

impl<L: LanguageModel + 'static> TranscriptCleaner<L> {
    pub fn new(llm: L, config: &CleanerConfig) -> Self {
        let processing = &config.processing;
        tracing::info!(
            "Initialized transcript cleaner with {} (chunk size {}, overlap {}, {} workers)",
            config.llm.model,
            processing.chunk_size,
            processing.chunk_overlap,
            processing.max_workers
        );

        Self {
            processor: Arc::new(TranscriptProcessor::new(
                llm,
                ProcessorOptions::from_config(config),
            )),
            chunker: Chunker::new(processing.chunk_size, processing.chunk_overlap),
            max_workers: processing.max_workers.max(1),
            quality_enabled: config.quality.enabled,
        }
    }

    pub async fn clean(&self, transcript: &str) -> Result<CleanOutcome> {
        let chunks = self.chunker.chunk(transcript);
        let chunks_total = chunks.len();
        tracing::info!("Created {} chunks", chunks_total);

        if chunks.is_empty() {
            tracing::warn!("Transcript is empty, nothing to clean");
            return Ok(CleanOutcome {
                text: String::new(),
                chunks_total: 0,
                chunks_failed: 0,
                speakers: Vec::new(),
                quality: None,
                usage: TokenUsage::default(),
            });
        }

        let mut processed = self.process_chunks(chunks).await?;
        processed.sort_by_key(|c| c.index);
        let chunks_failed = processed.iter().filter(|c| c.fell_back).count();

        tracing::info!("Assembling final transcript...");
        let segments: Vec<&str> = processed.iter().map(|c| c.processed_text.as_str()).collect();
        let text = merge_segments_with_overlap(&segments);

        let mut speakers: BTreeSet<String> = processed
            .iter()
            .flat_map(|c| c.speakers.iter().cloned())
            .collect();
        if speakers.is_empty() {
            speakers.extend(extract_speakers_from_text(transcript));
        }

        let quality = if self.quality_enabled {
            tracing::info!("Performing final quality check...");
            self.final_quality_check(transcript, &text).await
        } else {
            None
        };

        Ok(CleanOutcome {
            text,
            chunks_total,
            chunks_failed,
            speakers: speakers.into_iter().collect(),
            quality,
            usage: self.processor.llm().usage(),
        })
    }

    /// Runs up to `max_workers` chunks at once. Chunks are started in index
    /// order and each reads the shared context memory when it starts.
    async fn process_chunks(&self, chunks: Vec<Chunk>) -> Result<Vec<ProcessedChunk>> {
        let total = chunks.len();
        let memory = Arc::new(Mutex::new(ContextMemory::new()));
        let slots = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let permit = Arc::clone(&slots)
                .acquire_owned()
                .await
                .map_err(|e| CleanerError::processing(format!("worker pool closed: {}", e)))?;
            let processor = Arc::clone(&self.processor);
            let memory = Arc::clone(&memory);

            tasks.spawn(async move {
                let result = process_chunk(&processor, &memory, chunk).await;
                drop(permit);
                result
            });
        }

        let mut processed = Vec::with_capacity(total);
        let mut errors = 0;
        let mut first_error: Option<(usize, CleanerError)> = None;
        while let Some(joined) = tasks.join_next().await {
            let (chunk, error) = joined
                .map_err(|e| CleanerError::processing(format!("chunk worker panicked: {}", e)))?;
            if let Some(error) = error {
                errors += 1;
                if first_error.as_ref().map_or(true, |(index, _)| chunk.index < *index) {
                    first_error = Some((chunk.index, error));
                }
            }
            processed.push(chunk);
        }

        // Report the lowest-index error only when no chunk got an answer at all.
        if errors == total {
            if let Some((_, error)) = first_error {
                tracing::error!("All {} chunks failed", total);
                return Err(error);
            }
        }
        Ok(processed)
    }

    async fn final_quality_check(&self, original: &str, processed: &str) -> Option<QualityReport> {
        match self.processor.quality_check(original, processed).await {
            Ok(report) => {
                if report.passed {
                    tracing::info!("Quality score: {}/100", report.quality_score);
                } else {
                    tracing::warn!(
                        "Quality check below threshold: score {}/100 (threshold {}), content loss: {}, issues: {:?}",
                        report.quality_score,
                        self.processor.options().quality_threshold,
                        report.content_loss_detected,
                        report.issues_found
                    );
                }
                Some(report)
            }
            Err(e) => {
                tracing::warn!("Quality check failed: {}", e);
                None
            }
        }
    }
}

async fn process_chunk<L: LanguageModel>(
    processor: &TranscriptProcessor<L>,
    memory: &Mutex<ContextMemory>,
    chunk: Chunk,
) -> (ProcessedChunk, Option<CleanerError>) {
    let context = memory
        .lock()
        .map(|m| m.context_for(chunk.index))
        .unwrap_or_default();
    tracing::debug!(
        "Processing chunk {}/{} ({} chars, {} context chars)",
        chunk.index + 1,
        chunk.total,
        chunk.text.len(),
        context.len()
    );

    match processor.process_segment(&chunk.text, &context).await {
        Ok(SegmentOutcome {
            speaker_analysis,
            grammar,
        }) => {
            let mut speakers = grammar.speakers_identified;
            speakers.extend(speaker_analysis.speakers.into_iter().map(|s| {
                let name = s.actual_name.trim();
                if name.is_empty() || name.eq_ignore_ascii_case("unknown") {
                    s.speaker_id
                } else {
                    name.to_string()
                }
            }));
            speakers.retain(|s| !s.trim().is_empty());

            let cleaned = grammar.processed_text.filter(|t| !t.trim().is_empty());
            if cleaned.is_none() {
                tracing::warn!(
                    "Chunk {} reply had no processed text, keeping original",
                    chunk.index
                );
            }

            if let Ok(mut memory) = memory.lock() {
                memory.update(chunk.index, grammar.key_context_points);
            }

            let fell_back = cleaned.is_none();
            (
                ProcessedChunk {
                    index: chunk.index,
                    processed_text: cleaned.unwrap_or(chunk.text),
                    speakers,
                    fell_back,
                },
                None,
            )
        }
        Err(e) => {
            tracing::error!("Failed to process chunk {}: {}", chunk.index, e);
            (
                ProcessedChunk {
                    index: chunk.index,
                    processed_text: chunk.text,
                    speakers: Vec::new(),
                    fell_back: true,
                },
                Some(e),
            )
        }
    }
}
