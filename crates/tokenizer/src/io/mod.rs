//! Loading of pre-trained BPE models.
//!
//! Vocabulary and merge tables are read in the HuggingFace layout
//! (`vocab.json` + `merges.txt`).

pub mod format;
pub mod load;

pub use format::{ModelFiles, MERGES_FILE, VOCAB_FILE};
pub use load::TokenizerLoader;
