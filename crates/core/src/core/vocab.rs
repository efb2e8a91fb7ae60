//! Vocabulary storage and lookup.
//!
//! This module provides vocabulary storage using AHashMap for fast lookups
//! and CompactString for memory-efficient string storage. Keys keep exact
//! byte equality, including the `</w>` end-of-word marker.

use crate::error::{NodeError, Result};
use ahash::AHashMap;
use compact_str::CompactString;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string
pub type VocabR = AHashMap<u32, CompactString>;

/// Start-of-text sentinel used by CLIP-style vocabularies.
pub const START_OF_TEXT: &str = "<|startoftext|>";

/// End-of-text sentinel shared by CLIP and GPT-2 vocabularies.
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Vocabulary with forward and reverse mappings.
///
/// Built once at load time and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    pub vocab: Vocab,
    /// Reverse mapping: ID -> token string
    pub vocab_r: VocabR,
    /// Special token IDs (cached for fast access)
    pub special: SpecialTokens,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
            special: SpecialTokens::default(),
        }
    }

    /// Build a vocabulary from a token -> id table such as `vocab.json`.
    ///
    /// Sentinels are detected afterwards; order of the input is irrelevant.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let entries = entries.into_iter();
        let mut vocab = Self::with_capacity(entries.size_hint().0);
        for (token, id) in entries {
            vocab.add_token_with_id(token.as_ref(), id)?;
        }
        vocab.detect_special_tokens();
        Ok(vocab)
    }

    /// Add a token with a specific ID.
    ///
    /// Returns an error if the ID is already taken by another token.
    pub fn add_token_with_id(&mut self, token: &str, id: u32) -> Result<()> {
        let token = CompactString::new(token);

        if let Some(existing) = self.vocab_r.get(&id) {
            if existing != &token {
                return Err(NodeError::Load(format!(
                    "Token ID {} assigned to both '{}' and '{}'",
                    id, existing, token
                )));
            }
        }

        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);

        Ok(())
    }

    /// Resolve the CLIP/GPT sentinels and any other `<|...|>` entries.
    pub fn detect_special_tokens(&mut self) {
        self.special.start_of_text = self.get_id(START_OF_TEXT);
        self.special.end_of_text = self.get_id(END_OF_TEXT);
        self.special.others = self
            .vocab
            .iter()
            .filter(|(token, _)| is_special_token(token))
            .map(|(_, &id)| id)
            .collect();
        self.special.others.sort_unstable();
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|s| s.as_str())
    }

    /// Get the ID for a token string, failing on unknown subwords.
    pub fn require_id(&self, token: &str) -> Result<u32> {
        self.get_id(token)
            .ok_or_else(|| NodeError::UnknownToken(token.to_string()))
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

/// Special token IDs cached for fast access.
#[derive(Debug, Clone, Default)]
pub struct SpecialTokens {
    /// `<|startoftext|>` when the vocabulary defines it
    pub start_of_text: Option<u32>,
    /// `<|endoftext|>` when the vocabulary defines it
    pub end_of_text: Option<u32>,
    /// Every `<|...|>` entry, sorted, sentinels included
    pub others: Vec<u32>,
}

impl SpecialTokens {
    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        Some(id) == self.start_of_text
            || Some(id) == self.end_of_text
            || self.others.binary_search(&id).is_ok()
    }

    /// Both CLIP sentinels are present.
    #[inline]
    pub fn has_sentinels(&self) -> bool {
        self.start_of_text.is_some() && self.end_of_text.is_some()
    }
}

fn is_special_token(token: &str) -> bool {
    token.len() > 4 && token.starts_with("<|") && token.ends_with("|>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries() {
        let vocab = Vocabulary::from_entries([("hello</w>", 0), ("world</w>", 1)]).unwrap();

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.get_id("hello</w>"), Some(0));
        assert_eq!(vocab.get_id("hello"), None);
        assert_eq!(vocab.get_token(1), Some("world</w>"));
        assert!(!vocab.special.has_sentinels());
    }

    #[test]
    fn test_add_token_with_id_conflict() {
        let mut vocab = Vocabulary::new();
        vocab.add_token_with_id("a</w>", 320).unwrap();
        vocab.add_token_with_id("a</w>", 320).unwrap();

        let err = vocab.add_token_with_id("b</w>", 320).unwrap_err();
        assert!(matches!(err, NodeError::Load(_)));
    }

    #[test]
    fn test_require_id() {
        let vocab = Vocabulary::from_entries([("cat</w>", 2368)]).unwrap();
        assert_eq!(vocab.require_id("cat</w>").unwrap(), 2368);

        let err = vocab.require_id("dog</w>").unwrap_err();
        assert!(matches!(err, NodeError::UnknownToken(ref t) if t == "dog</w>"));
    }

    #[test]
    fn test_special_tokens() {
        let vocab = Vocabulary::from_entries([
            (START_OF_TEXT, 49406),
            (END_OF_TEXT, 49407),
            ("<|pad|>", 7),
            ("a</w>", 320),
        ])
        .unwrap();

        assert!(vocab.special.has_sentinels());
        assert_eq!(vocab.special.start_of_text, Some(49406));
        assert!(vocab.special.is_special(49407));
        assert!(vocab.special.is_special(7));
        assert!(!vocab.special.is_special(320));
    }
}
