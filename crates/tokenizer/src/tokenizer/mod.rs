//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that integrates
//! vocabulary, merge ranks, pre-tokenization and the segment cache.

use crate::io::TokenizerLoader;
use crate::pre_tokenizer::{Normalizer, Splitter};
use crate::utils::{CacheStats, EncodingCache};
use bpenode_core::{
    bpe_merge, ByteAlphabet, MergeRanks, NodeError, NodeParams, Result, Vocabulary,
};
use compact_str::CompactString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, trace};

/// Sentinel handling of the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerStyle {
    /// Plain ids, no sentinels
    Gpt,
    /// Ids bracketed by `<|startoftext|>` and `<|endoftext|>`
    Clip,
}

impl TokenizerStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerStyle::Gpt => "gpt",
            TokenizerStyle::Clip => "clip",
        }
    }

    /// Style implied by the vocabulary: CLIP when both sentinels exist.
    pub fn detect(vocab: &Vocabulary) -> Self {
        if vocab.special.has_sentinels() {
            TokenizerStyle::Clip
        } else {
            TokenizerStyle::Gpt
        }
    }
}

impl fmt::Display for TokenizerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenizerStyle {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gpt" | "gpt2" => Ok(TokenizerStyle::Gpt),
            "clip" => Ok(TokenizerStyle::Clip),
            other => Err(NodeError::Config(format!(
                "style must be 'gpt' or 'clip' (got '{}')",
                other
            ))),
        }
    }
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Sentinel style; `None` detects it from the vocabulary
    pub style: Option<TokenizerStyle>,
    /// Lowercase and collapse whitespace before segmentation
    pub lowercase: bool,
    /// Capacity for the segment cache, 0 disables it
    pub cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            style: None,
            lowercase: false,
            cache_capacity: 1000,
        }
    }
}

impl TokenizerConfig {
    /// Read the initialize-time parameters `style`, `lowercase` and
    /// `cache_capacity`.
    pub fn from_params(params: &NodeParams<'_>) -> Result<Self> {
        let defaults = Self::default();

        let style = match params.get("style").map(str::trim) {
            None | Some("") | Some("auto") => None,
            Some(raw) => Some(raw.parse()?),
        };

        let cache_capacity =
            params.get_int_parameter("cache_capacity", defaults.cache_capacity as i64)?;
        let cache_capacity = usize::try_from(cache_capacity).map_err(|_| {
            NodeError::Config(format!(
                "cache_capacity must not be negative (got {})",
                cache_capacity
            ))
        })?;

        Ok(Self {
            style,
            lowercase: params.get_bool_parameter("lowercase", defaults.lowercase)?,
            cache_capacity,
        })
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    model_path: Option<PathBuf>,
    tables: Option<(Vocabulary, MergeRanks)>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: TokenizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Force a sentinel style.
    pub fn style(mut self, style: TokenizerStyle) -> Self {
        self.config.style = Some(style);
        self
    }

    /// Enable CLIP text cleaning.
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    /// Set the segment cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Load tables from a model directory or `vocab.json` path.
    pub fn model_path(mut self, path: impl AsRef<Path>) -> Self {
        self.model_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use tables that are already in memory.
    pub fn tables(mut self, vocab: Vocabulary, merges: MergeRanks) -> Self {
        self.tables = Some((vocab, merges));
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        let (vocab, merges) = match (self.tables, self.model_path) {
            (Some(tables), _) => tables,
            (None, Some(path)) => TokenizerLoader::load(&path)?,
            (None, None) => {
                return Err(NodeError::Config(
                    "tokenizer needs a model path or in-memory tables".to_string(),
                ))
            }
        };
        Tokenizer::new(vocab, merges, self.config)
    }
}

/// Main tokenizer struct.
///
/// Tables are immutable after construction; `encode` takes `&self` and may be
/// called from several threads. Only the segment cache is shared mutable
/// state.
#[derive(Debug)]
pub struct Tokenizer {
    /// Vocabulary
    vocab: Vocabulary,
    /// Merge ranks
    merges: MergeRanks,
    /// Resolved sentinel style
    style: TokenizerStyle,
    /// Text splitter
    splitter: Splitter,
    /// Text cleaning
    normalizer: Normalizer,
    /// Byte-mapped segment -> ids
    cache: Mutex<EncodingCache>,
}

impl Tokenizer {
    /// Create a tokenizer from loaded tables.
    ///
    /// Fails when the CLIP style is requested but the vocabulary lacks a
    /// sentinel.
    pub fn new(vocab: Vocabulary, merges: MergeRanks, config: TokenizerConfig) -> Result<Self> {
        let style = match config.style {
            Some(TokenizerStyle::Clip) if !vocab.special.has_sentinels() => {
                return Err(NodeError::Config(
                    "clip style needs <|startoftext|> and <|endoftext|> in the vocabulary"
                        .to_string(),
                ))
            }
            Some(style) => style,
            None => TokenizerStyle::detect(&vocab),
        };

        info!(
            style = %style,
            vocab = vocab.len(),
            merges = merges.len(),
            lowercase = config.lowercase,
            "tokenizer ready"
        );

        Ok(Self {
            vocab,
            merges,
            style,
            splitter: Splitter::clip(),
            normalizer: Normalizer::new(config.lowercase),
            cache: Mutex::new(EncodingCache::with_capacity(config.cache_capacity)),
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Load a tokenizer from a model directory or `vocab.json` path.
    pub fn load(path: &Path, config: TokenizerConfig) -> Result<Self> {
        Self::builder().config(config).model_path(path).build()
    }

    /// Encode text to token IDs.
    ///
    /// Every subword must resolve to a vocabulary id; the first one that does
    /// not fails the whole call.
    pub fn encode(&self, text: &str) -> Result<Encoding> {
        let normalized = self.normalizer.normalize(text);
        let alphabet = ByteAlphabet::get();

        let mut ids = Vec::new();
        if self.style == TokenizerStyle::Clip {
            ids.extend(self.vocab.special.start_of_text);
        }

        for segment in self.splitter.split(&normalized) {
            let mapped = alphabet.encode_bytes(segment.as_bytes());
            let cached = self.lock_cache().get(&mapped);
            let segment_ids = match cached {
                Some(segment_ids) => segment_ids,
                None => {
                    // Merging runs unlocked; failures are never cached
                    let segment_ids = self.encode_word(&mapped)?;
                    self.lock_cache().insert(&mapped, segment_ids.clone());
                    segment_ids
                }
            };
            ids.extend_from_slice(&segment_ids);
        }

        if self.style == TokenizerStyle::Clip {
            ids.extend(self.vocab.special.end_of_text);
        }

        Ok(Encoding {
            ids,
            text: text.to_string(),
        })
    }

    /// Encode a batch of texts, in order.
    pub fn encode_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Encoding>> {
        texts.iter().map(|text| self.encode(text.as_ref())).collect()
    }

    /// Split one byte-mapped word into subwords.
    pub fn bpe(&self, word: &str) -> Result<Vec<CompactString>> {
        bpe_merge(word, &self.merges)
    }

    fn encode_word(&self, word: &str) -> Result<Vec<u32>> {
        let subwords = self.bpe(word)?;
        trace!(word, subwords = ?subwords, "bpe");
        subwords
            .iter()
            .map(|subword| self.vocab.require_id(subword))
            .collect()
    }

    /// Get the resolved sentinel style.
    pub fn style(&self) -> TokenizerStyle {
        self.style
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get a reference to the merge ranks.
    pub fn merges(&self) -> &MergeRanks {
        &self.merges
    }

    /// Snapshot of the segment cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    fn lock_cache(&self) -> MutexGuard<'_, EncodingCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of encoding text.
#[derive(Debug, Clone)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Original text
    pub text: String,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
