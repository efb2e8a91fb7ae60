//! Encoding primitives for BPE tokenization.
//!
//! - Byte-level: GPT-2 byte <-> unicode alphabet
//! - Word-level: rank-ordered merges over one word with `</w>` marking

pub mod byte_level;
pub mod word_level;

pub use byte_level::ByteAlphabet;
pub use word_level::{bpe_merge, END_OF_WORD};
