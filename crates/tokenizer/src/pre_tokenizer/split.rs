//! Text splitting for pre-tokenization.
//!
//! Segments are found left to right without overlap. Alternatives are tried
//! in order: English contraction suffixes, runs of letters, single digits and
//! runs of anything that is neither whitespace, letter nor digit. Whitespace
//! never ends up in a segment.

use regex::Regex;
use std::sync::OnceLock;

/// Segmentation grammar shared by CLIP-style and GPT-style vocabularies.
pub const CLIP_PATTERN: &str = r"'s|'t|'re|'ve|'m|'ll|'d|[\p{L}]+|[\p{N}]|[^\s\p{L}\p{N}]+";

fn clip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CLIP_PATTERN).expect("Invalid regex pattern"))
}

/// Regex-based text splitter for pre-tokenization.
#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    regex: &'static Regex,
}

impl Splitter {
    /// Create the CLIP splitter.
    pub fn clip() -> Self {
        Self {
            regex: clip_regex(),
        }
    }

    /// Split text into segments borrowed from `text`.
    pub fn split<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.regex.find_iter(text).map(|m| m.as_str())
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::clip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        Splitter::clip().split(text).collect()
    }

    #[test]
    fn test_reference_sentence() {
        assert_eq!(
            split("a photo of a really, functistaner big cat."),
            vec!["a", "photo", "of", "a", "really", ",", "functistaner", "big", "cat", "."]
        );
    }

    #[test]
    fn test_contractions() {
        assert_eq!(split("it's we'll"), vec!["it", "'s", "we", "'ll"]);
    }

    #[test]
    fn test_digits_are_single() {
        assert_eq!(split("abc123"), vec!["abc", "1", "2", "3"]);
    }

    #[test]
    fn test_symbol_runs() {
        assert_eq!(split("wow!!! ..."), vec!["wow", "!!!", "..."]);
    }

    #[test]
    fn test_unicode_letters() {
        assert_eq!(split("こんにちは 世界"), vec!["こんにちは", "世界"]);
    }

    #[test]
    fn test_empty_string() {
        assert!(split("").is_empty());
        assert!(split(" \t\n ").is_empty());
    }
}
