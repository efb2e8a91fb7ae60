//! Reverse vocabulary model.
//!
//! Maps ids back to token strings, turns `</w>` into a space and reassembles
//! raw bytes through the byte-level alphabet. A character may be spread over
//! several ids, so a UTF-8 sequence left incomplete at the very end is held
//! back instead of being replaced.

use crate::io::{ModelFiles, TokenizerLoader};
use bpenode_core::{ByteAlphabet, NodeError, Result, Vocabulary, END_OF_WORD};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

static NEXT_MODEL_ID: AtomicUsize = AtomicUsize::new(0);

/// Loaded reverse vocabulary.
///
/// Every instance takes a process-wide id used to correlate its log lines.
#[derive(Debug)]
pub struct Detokenizer {
    id: usize,
    vocab: Vocabulary,
}

impl Detokenizer {
    /// Load from a `vocab.json` path or a directory holding one.
    pub fn load(model_path: &Path) -> Result<Self> {
        let vocab_path = ModelFiles::resolve_vocab(model_path)?;
        let vocab = TokenizerLoader::load_vocab(&vocab_path)?;
        Ok(Self::from_vocabulary(vocab))
    }

    pub fn from_vocabulary(vocab: Vocabulary) -> Self {
        let id = NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed);
        info!(model_id = id, entries = vocab.len(), "Model loaded");
        Self { id, vocab }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Convert `ids` to text of at most `max_bytes` bytes.
    ///
    /// Truncation happens on a character boundary. Ids outside the reverse
    /// vocabulary fail with [`NodeError::UnknownTokenId`].
    pub fn detokenize(&self, ids: &[i64], max_bytes: usize, skip_special: bool) -> Result<String> {
        debug!(model_id = self.id, count = ids.len(), "Detokenizing tokens");

        let alphabet = ByteAlphabet::get();
        let mut bytes = Vec::new();

        for &raw in ids {
            let id = u32::try_from(raw).map_err(|_| NodeError::UnknownTokenId(raw))?;
            let token = self
                .vocab
                .get_token(id)
                .ok_or(NodeError::UnknownTokenId(raw))?;

            if skip_special && self.vocab.special.is_special(id) {
                continue;
            }

            let mut parts = token.split(END_OF_WORD);
            if let Some(first) = parts.next() {
                alphabet.decode_into(first, &mut bytes);
            }
            for part in parts {
                bytes.push(b' ');
                alphabet.decode_into(part, &mut bytes);
            }
        }

        let mut text = decode_utf8(&bytes);
        truncate_at_char_boundary(&mut text, max_bytes);
        Ok(text)
    }
}

impl Drop for Detokenizer {
    fn drop(&mut self) {
        info!(model_id = self.id, "Model unloaded");
    }
}

/// Lossy UTF-8 decoding that drops an incomplete trailing sequence.
fn decode_utf8(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match err.error_len() {
                    // Truncated sequence at the end
                    None => break,
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                }
            }
        }
    }

    text
}

fn truncate_at_char_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
