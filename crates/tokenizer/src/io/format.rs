//! On-disk model layout.
//!
//! A model directory holds `vocab.json` (token -> id) and `merges.txt`
//! (a header line followed by one whitespace-separated pair per line).

use bpenode_core::{NodeError, Result};
use std::path::{Path, PathBuf};

/// File name of the vocabulary table.
pub const VOCAB_FILE: &str = "vocab.json";

/// File name of the merge table.
pub const MERGES_FILE: &str = "merges.txt";

/// Resolved paths of the files making up a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub vocab: PathBuf,
    pub merges: PathBuf,
}

impl ModelFiles {
    /// Resolve `model_path`, which is either a model directory or the
    /// vocabulary file itself with the merge table beside it.
    pub fn resolve(model_path: &Path) -> Result<Self> {
        if model_path.is_dir() {
            return Ok(Self {
                vocab: model_path.join(VOCAB_FILE),
                merges: model_path.join(MERGES_FILE),
            });
        }

        if model_path.is_file() {
            let dir = model_path.parent().unwrap_or_else(|| Path::new("."));
            return Ok(Self {
                vocab: model_path.to_path_buf(),
                merges: dir.join(MERGES_FILE),
            });
        }

        Err(NodeError::Load(format!(
            "Model path {} does not exist",
            model_path.display()
        )))
    }

    /// Path of the vocabulary file alone, for models without merges.
    pub fn resolve_vocab(model_path: &Path) -> Result<PathBuf> {
        Self::resolve(model_path).map(|files| files.vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = ModelFiles::resolve(dir.path()).unwrap();
        assert_eq!(files.vocab, dir.path().join("vocab.json"));
        assert_eq!(files.merges, dir.path().join("merges.txt"));
    }

    #[test]
    fn test_resolve_vocab_file() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("clip-vocab.json");
        std::fs::write(&vocab, "{}").unwrap();

        let files = ModelFiles::resolve(&vocab).unwrap();
        assert_eq!(files.vocab, vocab);
        assert_eq!(files.merges, dir.path().join("merges.txt"));
    }

    #[test]
    fn test_resolve_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelFiles::resolve(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, NodeError::Load(_)));
    }
}
