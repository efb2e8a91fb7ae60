//! Text cleaning for pre-tokenization.
//!
//! CLIP preprocessing lowercases the input and collapses whitespace runs to a
//! single space, trimming both ends.

/// Text normalizer applied before segmentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Lowercase and collapse whitespace
    lowercase: bool,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        if !self.lowercase {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        for word in text.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.extend(word.chars().flat_map(char::to_lowercase));
        }
        out
    }

    /// Check if normalization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.lowercase
    }
}
