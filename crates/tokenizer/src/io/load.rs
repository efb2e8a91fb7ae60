//! Load functionality for pre-trained tokenizers.
//!
//! Models are read once at node initialization. Any malformed line or
//! unreadable file fails the whole load; no partial tables escape.

use super::format::ModelFiles;
use ahash::AHashMap;
use bpenode_core::{MergeRanks, NodeError, Result, Vocabulary, MAX_MERGE_LINES};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Tokenizer loader - handles loading trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load vocabulary and merge table from `model_path`.
    ///
    /// See [`ModelFiles::resolve`] for the accepted layouts.
    pub fn load(model_path: &Path) -> Result<(Vocabulary, MergeRanks)> {
        let files = ModelFiles::resolve(model_path)?;
        let vocab = Self::load_vocab(&files.vocab)?;
        let merges = Self::load_merges(&files.merges)?;
        Ok((vocab, merges))
    }

    /// Load a `vocab.json` token -> id table.
    pub fn load_vocab(path: &Path) -> Result<Vocabulary> {
        let file = File::open(path).map_err(|err| NodeError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        let table: AHashMap<String, u32> = serde_json::from_reader(BufReader::new(file))?;

        let vocab = Vocabulary::from_entries(table)?;
        debug!(path = %path.display(), entries = vocab.len(), "vocabulary loaded");
        Ok(vocab)
    }

    /// Load a `merges.txt` merge table.
    pub fn load_merges(path: &Path) -> Result<MergeRanks> {
        let content = std::fs::read_to_string(path).map_err(|err| NodeError::Io {
            path: path.to_path_buf(),
            err,
        })?;

        let merges = Self::parse_merges(&content)?;
        debug!(path = %path.display(), rules = merges.len(), "merge table loaded");
        Ok(merges)
    }

    /// Parse merge rules from text.
    ///
    /// The first line is a version header and is skipped. At most
    /// [`MAX_MERGE_LINES`] rules are read; the rest of the file is ignored.
    pub fn parse_merges(content: &str) -> Result<MergeRanks> {
        let mut merges = MergeRanks::with_capacity(MAX_MERGE_LINES);

        for (idx, line) in content.lines().enumerate().skip(1).take(MAX_MERGE_LINES) {
            let mut parts = line.split_whitespace();
            let (Some(left), Some(right), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(NodeError::InvalidMerge {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };

            if merges.rank(left, right).is_some() {
                warn!(line = idx + 1, left, right, "duplicate merge rule, keeping first rank");
            }
            merges.push(left, right);
        }

        Ok(merges)
    }
}
