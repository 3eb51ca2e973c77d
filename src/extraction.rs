//! Extraction of the first matching native library from an archive.

use crate::archive::JarArchive;
use crate::candidates::LibraryCandidate;
use crate::scratch::ScratchSpace;
use log::{debug, warn};
use std::io;
use std::path::Path;
use tempfile::TempPath;

/// Errors arising while copying a library out of an archive.
#[derive(Debug, thiserror::Error)]
#[error("failed to extract {entry}: {source}")]
pub struct ExtractionError {
    entry: String,
    #[source]
    source: io::Error,
}

impl ExtractionError {
    /// Return the entry that failed to extract.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }
}

/// A native library copied to a temporary file.
///
/// The file is removed when this value is dropped; [`Self::remove`] does the
/// same but reports failures.
#[derive(Debug)]
pub struct ExtractedLibrary {
    entry: String,
    path: TempPath,
}

impl ExtractedLibrary {
    /// Return the in-archive path the library was copied from.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Return the path of the temporary copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the temporary copy, logging a warning if that fails.
    pub fn remove(self) {
        let display = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            warn!("failed to delete temporary library file {display}: {e}");
        }
    }
}

/// Copy the first candidate present in `archive` to a temporary file.
///
/// The file is named `<name><random><extension>`. Returns `Ok(None)` without
/// touching the file system when no candidate is present.
///
/// # Errors
///
/// Returns [`ExtractionError`] if the copy fails; the partial file is
/// removed before returning.
pub fn extract(
    archive: &mut JarArchive,
    name: &str,
    candidates: &[LibraryCandidate],
    scratch: &ScratchSpace,
) -> Result<Option<ExtractedLibrary>, ExtractionError> {
    let Some(candidate) = candidates.iter().find(|c| archive.contains(c.path())) else {
        debug!(
            "no native library for {name} among {} candidate(s)",
            candidates.len()
        );
        return Ok(None);
    };

    let to_error = |source| ExtractionError {
        entry: candidate.path().to_owned(),
        source,
    };

    let mut temporary = scratch
        .create(name, candidate.extension())
        .map_err(to_error)?;
    archive
        .copy_entry(candidate.path(), temporary.as_file_mut())
        .map_err(to_error)?;
    debug!(
        "extracted {} to {}",
        candidate.path(),
        temporary.path().display()
    );

    Ok(Some(ExtractedLibrary {
        entry: candidate.path().to_owned(),
        path: temporary.into_temp_path(),
    }))
}
