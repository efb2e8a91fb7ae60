//! Bpenode-tokenizer - text <-> id conversion behind the processing nodes
//!
//! This crate integrates the core tables into the two models the nodes
//! drive: a BPE tokenizer and a reverse-vocabulary detokenizer.
//!
//! # Features
//!
//! - Builder pattern for tokenizer configuration
//! - CLIP and GPT sentinel styles
//! - Pre-tokenization pipeline (text cleaning, regex segmentation)
//! - Loading of `vocab.json` + `merges.txt` models
//! - Byte-level detokenization with multi-id character support
//!
//! # Example
//!
//! ```rust,no_run
//! use bpenode_tokenizer::{Detokenizer, Tokenizer};
//!
//! let tokenizer = Tokenizer::builder().model_path("models/clip").build()?;
//! let encoding = tokenizer.encode("a photo of a cat")?;
//! println!("{:?}", encoding.ids);
//!
//! let detokenizer = Detokenizer::load("models/gpt2/vocab.json".as_ref())?;
//! let text = detokenizer.detokenize(&[18435, 995], 256, false)?;
//! # Ok::<(), bpenode_tokenizer::NodeError>(())
//! ```

// Re-export core types
pub use bpenode_core::{NodeError, Result};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig, TokenizerStyle};

// Reverse vocabulary model
pub mod detokenizer;
pub use detokenizer::Detokenizer;

// Model loading
pub mod io;
pub use io::{ModelFiles, TokenizerLoader};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{Normalizer, Splitter};

// Utilities
pub mod utils;
pub use utils::{CacheStats, EncodingCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
