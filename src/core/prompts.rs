use crate::domain::ports::CompletionRequest;
use crate::utils::text::truncate_chars;
use serde::de::DeserializeOwned;

pub const SPEAKER_MAX_TOKENS: u32 = 2000;
pub const GRAMMAR_MAX_TOKENS: u32 = 3000;
pub const QA_MAX_TOKENS: u32 = 500;
/// Characters of original and processed text shown to the reviewer.
pub const QA_EXCERPT_CHARS: usize = 2000;

const SPEAKER_SYSTEM: &str =
    "You are a professional transcript analyzer. Identify and standardize speakers.";
const GRAMMAR_SYSTEM: &str = "You are a professional transcript cleaner. Correct grammar and improve readability while preserving all content and speaker attribution.";
const QA_SYSTEM: &str = "You are a quality assurance expert. Review transcript processing quality.";

pub fn speaker_identification(segment: &str) -> CompletionRequest {
    let prompt = format!(
        r#"Analyze this Zoom transcript segment and identify all speakers.
For each speaker, provide:
1. Their original name/timestamp format
2. A standardized speaker ID (Speaker 1, Speaker 2, etc.)
3. The actual speaker name if identifiable

Transcript segment:
{segment}

Return ONLY a JSON object in this exact format:
{{
    "speakers": [
        {{
            "original_format": "string",
            "speaker_id": "Speaker 1",
            "actual_name": "John Smith or Unknown"
        }}
    ],
    "speaker_utterances": [
        {{
            "speaker_id": "Speaker 1",
            "text": "their complete utterance"
        }}
    ]
}}"#
    );
    CompletionRequest::new(SPEAKER_SYSTEM, prompt, SPEAKER_MAX_TOKENS)
}

pub fn grammar_correction(segment: &str, previous_context: &str, context_window: usize) -> CompletionRequest {
    let context = truncate_chars(previous_context, context_window);
    let context = if context.trim().is_empty() {
        "(none, this is the start of the transcript)"
    } else {
        context
    };

    let prompt = format!(
        r#"Clean this transcript segment with these requirements:

1. CORRECT GRAMMAR: Fix all grammatical errors, punctuation, and sentence structure
2. MAINTAIN SPEAKER ATTRIBUTION: Keep all speaker information intact
3. PRESERVE CONTEXT: Maintain conversation flow and meaning
4. CLEAN FORMAT: Remove filler words, but keep important content
5. STANDARDIZE SPEAKERS: Use consistent speaker naming

Previous context for continuity:
{context}

Current transcript segment to process:
{segment}

Return ONLY a JSON object in this exact format:
{{
    "processed_text": "cleaned transcript with proper formatting",
    "speakers_identified": ["Speaker 1", "Speaker 2"],
    "key_context_points": ["important topics or decisions made"],
    "processing_notes": "any notes about challenges or decisions made"
}}"#
    );
    CompletionRequest::new(GRAMMAR_SYSTEM, prompt, GRAMMAR_MAX_TOKENS)
}

pub fn quality_review(original: &str, processed: &str) -> CompletionRequest {
    let original = truncate_chars(original, QA_EXCERPT_CHARS);
    let processed = truncate_chars(processed, QA_EXCERPT_CHARS);

    let prompt = format!(
        r#"Review this transcript processing result and validate quality:

Original segment:
{original}

Processed segment:
{processed}

Check for:
1. Content completeness (no information loss)
2. Speaker attribution accuracy
3. Grammar improvement
4. Context preservation
5. Formatting quality

Return ONLY a JSON object:
{{
    "quality_score": 0-100,
    "issues_found": ["list of any issues"],
    "content_loss_detected": true/false,
    "recommendations": ["improvement suggestions"]
}}"#
    );
    CompletionRequest::new(QA_SYSTEM, prompt, QA_MAX_TOKENS)
}

/// Decodes a JSON reply, tolerating Markdown fences and prose around the object.
pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    let body = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                "Failed to parse JSON reply ({}): {}...",
                e,
                truncate_chars(trimmed, 100)
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GrammarCorrection;

    #[test]
    fn test_grammar_prompt_limits_context() {
        let context = "x".repeat(5000);
        let request = grammar_correction("Jane: um hi", &context, 1000);
        let prompt = request.user_prompt();

        assert!(prompt.contains("Jane: um hi"));
        assert!(prompt.contains(&"x".repeat(1000)));
        assert!(!prompt.contains(&"x".repeat(1001)));
        assert_eq!(request.max_tokens, GRAMMAR_MAX_TOKENS);
        assert_eq!(request.messages[0].role, "system");
    }

    #[test]
    fn test_grammar_prompt_marks_missing_context() {
        let request = grammar_correction("hello", "", 1000);
        assert!(request.user_prompt().contains("start of the transcript"));
    }

    #[test]
    fn test_quality_prompt_truncates_excerpts() {
        let original = "o".repeat(3000);
        let request = quality_review(&original, "short");
        assert!(!request.user_prompt().contains(&"o".repeat(2001)));
        assert_eq!(request.max_tokens, QA_MAX_TOKENS);
    }

    #[test]
    fn test_parse_json_reply_handles_fences() {
        let raw = "Sure! Here it is:\n```json\n{\"processed_text\": \"Hello.\"}\n```";
        let parsed: GrammarCorrection = parse_json_reply(raw).unwrap();
        assert_eq!(parsed.processed_text.as_deref(), Some("Hello."));
    }

    #[test]
    fn test_parse_json_reply_rejects_garbage() {
        assert!(parse_json_reply::<GrammarCorrection>("I cannot help with that.").is_none());
        assert!(parse_json_reply::<GrammarCorrection>("").is_none());
    }
}
