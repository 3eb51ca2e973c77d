//! Scratch space for temporary files created during a load.
//!
//! Every file is a [`tempfile::NamedTempFile`] with a unique name, so files
//! are removed when their owner drops them and concurrent loads never share
//! a path.

use camino::Utf8PathBuf;
use std::io;
use tempfile::NamedTempFile;

/// Creates uniquely named temporary files in a fixed directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchSpace {
    dir: Option<Utf8PathBuf>,
}

impl ScratchSpace {
    /// Use the OS temporary directory.
    #[must_use]
    pub const fn system() -> Self {
        Self { dir: None }
    }

    /// Use `dir` instead of the OS temporary directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Create an empty temporary file named `<prefix><random><suffix>`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(&self, prefix: &str, suffix: &str) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }
}
