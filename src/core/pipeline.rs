use crate::core::cleaner::TranscriptCleaner;
use crate::domain::model::{CleanReport, CleanedTranscript, Transcript};
use crate::domain::ports::{LanguageModel, Pipeline, Storage};
use crate::utils::error::{CleanerError, Result};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: String,
    pub output: String,
    pub report: Option<String>,
}

/// Reads a transcript from storage, cleans it and writes the result back.
pub struct CleaningPipeline<S: Storage, L: LanguageModel + 'static> {
    storage: S,
    cleaner: TranscriptCleaner<L>,
    paths: RunPaths,
}

impl<S: Storage, L: LanguageModel + 'static> CleaningPipeline<S, L> {
    pub fn new(storage: S, cleaner: TranscriptCleaner<L>, paths: RunPaths) -> Self {
        Self {
            storage,
            cleaner,
            paths,
        }
    }
}

/// Decodes transcript bytes: UTF-8 only, byte-order mark dropped, CRLF folded to LF.
pub fn decode_transcript(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes)
        .map_err(|e| CleanerError::processing(format!("transcript is not valid UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    Ok(text.replace("\r\n", "\n"))
}

#[async_trait::async_trait]
impl<S: Storage, L: LanguageModel + 'static> Pipeline for CleaningPipeline<S, L> {
    async fn extract(&self) -> Result<Transcript> {
        tracing::info!("Reading transcript from {}", self.paths.input);
        let bytes = self.storage.read_file(&self.paths.input).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        Ok(Transcript {
            source: self.paths.input.clone(),
            text: decode_transcript(bytes)?,
        })
    }

    async fn transform(&self, transcript: Transcript) -> Result<CleanedTranscript> {
        let started = Instant::now();
        let outcome = self.cleaner.clean(&transcript.text).await?;

        let report = CleanReport {
            input: transcript.source,
            output: self.paths.output.clone(),
            generated_at: chrono::Utc::now(),
            chunks_total: outcome.chunks_total,
            chunks_failed: outcome.chunks_failed,
            speakers: outcome.speakers,
            quality: outcome.quality,
            usage: outcome.usage,
            elapsed_ms: started.elapsed().as_millis(),
        };

        Ok(CleanedTranscript {
            text: outcome.text,
            report,
        })
    }

    async fn load(&self, cleaned: CleanedTranscript) -> Result<String> {
        tracing::info!("Writing cleaned transcript to {}", self.paths.output);

        let mut text = cleaned.text;
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        self.storage
            .write_file(&self.paths.output, text.as_bytes())
            .await?;

        if let Some(report_path) = &self.paths.report {
            let json = serde_json::to_string_pretty(&cleaned.report)?;
            self.storage.write_file(report_path, json.as_bytes()).await?;
            tracing::info!("Run report saved to {}", report_path);
        }

        Ok(self.paths.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanerConfig;
    use crate::core::testing::ScriptedModel;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CleanerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn pipeline(storage: MockStorage, report: Option<&str>) -> CleaningPipeline<MockStorage, ScriptedModel> {
        let model = ScriptedModel::new(|request| {
            if request.user_prompt().contains("validate quality") {
                Ok(r#"{"quality_score": 91, "issues_found": []}"#.to_string())
            } else if request.user_prompt().contains("identify all speakers") {
                Ok(r#"{"speakers": [{"speaker_id": "Speaker 1", "actual_name": "Jane Doe"}]}"#.to_string())
            } else {
                Ok(r#"{"processed_text": "Jane Doe: Hello, everyone.", "speakers_identified": ["Jane Doe"]}"#.to_string())
            }
        });
        let cleaner = TranscriptCleaner::new(model, &CleanerConfig::default());
        CleaningPipeline::new(
            storage,
            cleaner,
            RunPaths {
                input: "meeting.txt".to_string(),
                output: "clean.txt".to_string(),
                report: report.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_decode_transcript_normalizes_input() {
        let text = decode_transcript(b"\xef\xbb\xbfJane: hi\r\nJohn: hey\r\n".to_vec()).unwrap();
        assert_eq!(text, "Jane: hi\nJohn: hey\n");
    }

    #[test]
    fn test_decode_transcript_rejects_binary() {
        let err = decode_transcript(vec![0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, CleanerError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_extract_reads_input() {
        let storage = MockStorage::with_file("meeting.txt", b"Jane Doe 10:00:01: um hello everyone");
        let pipeline = pipeline(storage, None);

        let transcript = pipeline.extract().await.unwrap();
        assert_eq!(transcript.source, "meeting.txt");
        assert_eq!(transcript.text, "Jane Doe 10:00:01: um hello everyone");
    }

    #[tokio::test]
    async fn test_extract_missing_input_fails() {
        let storage = MockStorage::with_file("other.txt", b"");
        let pipeline = pipeline(storage, None);

        assert!(matches!(
            pipeline.extract().await,
            Err(CleanerError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_builds_report() {
        let storage = MockStorage::with_file("meeting.txt", b"");
        let pipeline = pipeline(storage, None);

        let cleaned = pipeline
            .transform(Transcript {
                source: "meeting.txt".to_string(),
                text: "Jane Doe 10:00:01: um hello everyone".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(cleaned.text, "Jane Doe: Hello, everyone.");
        assert_eq!(cleaned.report.chunks_total, 1);
        assert_eq!(cleaned.report.chunks_failed, 0);
        assert_eq!(cleaned.report.speakers, vec!["Jane Doe"]);
        assert_eq!(cleaned.report.quality.as_ref().unwrap().quality_score, 91);
        assert_eq!(cleaned.report.output, "clean.txt");
    }

    #[tokio::test]
    async fn test_full_run_writes_output_and_report() {
        let storage = MockStorage::with_file("meeting.txt", b"Jane Doe 10:00:01: um hello everyone");
        let pipeline = pipeline(storage.clone(), Some("report.json"));

        let transcript = pipeline.extract().await.unwrap();
        let cleaned = pipeline.transform(transcript).await.unwrap();
        let output = pipeline.load(cleaned).await.unwrap();

        assert_eq!(output, "clean.txt");
        let written = storage.get_file("clean.txt").await.unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), "Jane Doe: Hello, everyone.\n");

        let report: serde_json::Value =
            serde_json::from_slice(&storage.get_file("report.json").await.unwrap()).unwrap();
        assert_eq!(report["chunks_total"], 1);
        assert_eq!(report["quality"]["quality_score"], 91);
        assert_eq!(report["speakers"][0], "Jane Doe");
    }
}
