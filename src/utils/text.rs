//! Char-safe string helpers shared by the chunker, prompts and assembler.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Longest overlap [`find_overlap`] will look for, in characters.
pub const MAX_OVERLAP_SEARCH: usize = 500;

/// Byte offset of the `n`th character, or `s.len()` when `s` is shorter.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    &s[..byte_offset(s, max_chars)]
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Longest prefix of `next` (up to [`MAX_OVERLAP_SEARCH`] chars) that `merged` ends with.
pub fn find_overlap<'a>(merged: &str, next: &'a str) -> &'a str {
    let limit = MAX_OVERLAP_SEARCH
        .min(char_len(merged))
        .min(char_len(next));

    for n in (1..=limit).rev() {
        let prefix = truncate_chars(next, n);
        if merged.ends_with(prefix) {
            return prefix;
        }
    }
    ""
}

/// Joins cleaned segments with blank lines, dropping text repeated across chunk boundaries.
pub fn merge_segments_with_overlap<S: AsRef<str>>(segments: &[S]) -> String {
    let mut iter = segments.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut merged = first.as_ref().to_string();
    for segment in iter {
        let segment = segment.as_ref();
        let overlap = find_overlap(&merged, segment);
        let rest = if overlap.is_empty() {
            segment
        } else {
            segment[overlap.len()..].trim()
        };
        merged.push_str("\n\n");
        merged.push_str(rest);
    }
    merged
}

fn speaker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z\s.]+)(?:\s+\d{1,2}:\d{2}:\d{2})?:").expect("speaker pattern is valid")
    })
}

/// Speaker names found at the start of lines like `Jane Doe 10:30:22: ...`.
pub fn extract_speakers_from_text(text: &str) -> Vec<String> {
    let mut speakers = BTreeSet::new();
    for line in text.lines() {
        if let Some(caps) = speaker_pattern().captures(line) {
            let name = caps[1].trim();
            if !name.is_empty() {
                speakers.insert(name.to_string());
            }
        }
    }
    speakers.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_find_overlap() {
        assert_eq!(find_overlap("Hello world", "world today"), "world");
        assert_eq!(find_overlap("abc", "xyz"), "");
        assert_eq!(find_overlap("", "xyz"), "");
        assert_eq!(find_overlap("naïve café", "café au lait"), "café");
    }

    #[test]
    fn test_merge_segments_with_overlap() {
        let merged = merge_segments_with_overlap(&["Hello world", "world today"]);
        assert_eq!(merged, "Hello world\n\ntoday");

        let merged = merge_segments_with_overlap(&["First part.", "Second part."]);
        assert_eq!(merged, "First part.\n\nSecond part.");
    }

    #[test]
    fn test_merge_empty_and_single() {
        let empty: Vec<String> = vec![];
        assert_eq!(merge_segments_with_overlap(&empty), "");
        assert_eq!(merge_segments_with_overlap(&["only"]), "only");
    }

    #[test]
    fn test_extract_speakers_from_text() {
        let text = "John Smith 10:30:15: Hello everyone.\n\
                    Jane Doe 10:30:22: Thanks, John.\n\
                    John Smith 10:30:28: Let's start.\n\
                    Dr. Mike Johnson: Quarterly results.\n\
                    (no speaker on this line)";
        let speakers = extract_speakers_from_text(text);
        assert_eq!(speakers, vec!["Dr. Mike Johnson", "Jane Doe", "John Smith"]);
    }
}
