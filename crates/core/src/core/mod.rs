//! Core BPE data structures.
//!
//! This module contains the vocabulary and merge-rank tables shared by the
//! encoder and the detokenizer.

pub mod merges;
pub mod vocab;

pub use merges::{MergeMap, MergeRanks, Pair, MAX_MERGE_LINES};
pub use vocab::{SpecialTokens, Vocab, VocabR, Vocabulary, END_OF_TEXT, START_OF_TEXT};
