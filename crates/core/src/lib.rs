//! Bpenode-core - shared building blocks for the tokenizer and detokenizer nodes
//!
//! This crate provides the data structures both nodes rely on, independent
//! of how they are driven by a host.
//!
//! # Features
//!
//! - Tensor descriptors, borrowed input views and owned outputs
//! - Key/value node parameters with typed lookups
//! - Vocabulary storage using `AHashMap` and compact strings
//! - Rank-ordered BPE merges with `</w>` end-of-word marking
//! - Error handling with host status codes
//!
//! # Example
//!
//! ```rust
//! use bpenode_core::{bpe_merge, MergeRanks};
//!
//! let ranks = MergeRanks::from_pairs([("c", "a"), ("ca", "t</w>")]);
//! let symbols = bpe_merge("cat", &ranks).unwrap();
//! assert_eq!(symbols, vec!["cat</w>"]);
//! ```

pub mod error;
pub use error::{NodeError, Result};

pub mod params;
pub use params::{NodeParam, NodeParams};

pub mod tensor;
pub use tensor::{NodeOutputs, Precision, Tensor, TensorInfo, TensorView, DYNAMIC_DIM};

// Vocabulary and merge tables
pub mod core;
pub use self::core::{
    MergeMap, MergeRanks, Pair, SpecialTokens, Vocab, VocabR, Vocabulary, END_OF_TEXT,
    MAX_MERGE_LINES, START_OF_TEXT,
};

pub mod encoding;
pub use encoding::{bpe_merge, ByteAlphabet, END_OF_WORD};
