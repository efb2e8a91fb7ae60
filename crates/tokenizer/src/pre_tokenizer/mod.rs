//! Pre-tokenization pipeline.
//!
//! This module provides pre-tokenization operations that are applied
//! before BPE encoding: text cleaning and regex segmentation.

pub mod normalize;
pub mod split;

pub use normalize::Normalizer;
pub use split::{Splitter, CLIP_PATTERN};
