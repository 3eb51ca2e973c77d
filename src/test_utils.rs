//! Shared test utilities for archive fixtures and load observation.
//!
//! Available in unit tests and, through the `test-support` feature, to
//! integration tests.

use crate::native::{NativeLoadError, NativeLoader};
use camino::Utf8PathBuf;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builds zip archives in memory from `(name, bytes)` entries.
///
/// Entries are stored uncompressed so their bytes appear verbatim in the
/// archive.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    /// Start an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn entry(mut self, name: &str, bytes: &[u8]) -> Self {
        self.entries.push((name.to_owned(), bytes.to_vec()));
        self
    }

    /// Return the encoded archive.
    ///
    /// # Panics
    ///
    /// Panics if the zip writer fails, which only happens on invalid input.
    #[must_use]
    #[expect(clippy::expect_used, reason = "test fixture construction")]
    pub fn into_bytes(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in &self.entries {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            writer.start_file(name.as_str(), options).expect("start entry");
            writer.write_all(bytes).expect("write entry");
        }
        writer.finish().expect("finish archive").into_inner()
    }

    /// Write the encoded archive to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[expect(clippy::expect_used, reason = "test fixture construction")]
    pub fn write_to(self, path: &Path) {
        fs::write(path, self.into_bytes()).expect("write archive");
    }
}

/// Return a temporary directory's path as UTF-8.
///
/// # Panics
///
/// Panics if the path is not valid UTF-8.
#[must_use]
#[expect(clippy::expect_used, reason = "temporary directories are UTF-8 in tests")]
pub fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir")
}

/// List the files currently present in `dir`.
///
/// A missing directory is reported as empty.
#[must_use]
pub fn scratch_entries(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .collect()
        })
        .unwrap_or_default()
}

/// What a [`RecordingLoader`] saw at the moment of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    /// Path passed to the loader.
    pub path: PathBuf,
    /// File contents at that path, or `None` if it could not be read.
    pub contents: Option<Vec<u8>>,
}

/// A [`NativeLoader`] that records every attempt instead of loading code.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    attempts: Mutex<Vec<LoadAttempt>>,
    reject_with: Option<String>,
}

impl RecordingLoader {
    /// Record attempts and report success.
    #[must_use]
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Record attempts and reject each with `reason`.
    #[must_use]
    pub fn rejecting(reason: &str) -> Self {
        Self {
            attempts: Mutex::default(),
            reject_with: Some(reason.to_owned()),
        }
    }

    /// Return the attempts recorded so far.
    #[must_use]
    pub fn attempts(&self) -> Vec<LoadAttempt> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }
}

impl NativeLoader for RecordingLoader {
    fn load(&self, path: &Path) -> Result<(), NativeLoadError> {
        let attempt = LoadAttempt {
            path: path.to_path_buf(),
            contents: fs::read(path).ok(),
        };
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(attempt);
        }
        match &self.reject_with {
            Some(reason) => Err(NativeLoadError::Rejected {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}
