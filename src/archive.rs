//! Archive resolution, including nested archives.
//!
//! A [`JarArchive`] is always backed by a real, seekable file. Nested
//! archives are copied out of their outer archive into a scratch file first;
//! the scratch file is owned by the resulting [`JarArchive`] and removed once
//! the archive handle has been closed.

use crate::location::LocationDescriptor;
use crate::scratch::ScratchSpace;
use crate::verification::{VerificationError, verify_archive};
use camino::Utf8Path;
use log::debug;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::TempPath;
use zip::ZipArchive;

/// Chunk size used when streaming entry bytes.
pub const COPY_BUFFER_SIZE: usize = 8192;

/// Suffix given to materialised nested archives.
const NESTED_SUFFIX: &str = ".jar";

/// Errors arising while opening an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The archive file could not be read or the nested copy failed.
    #[error("archive I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes are not a valid zip archive.
    #[error("invalid archive: {0}")]
    Invalid(#[from] zip::result::ZipError),

    /// The outer archive has no entry for the nested archive.
    #[error("nested archive {entry} not found")]
    NestedEntryMissing {
        /// The missing entry path.
        entry: String,
    },

    /// Verification was requested and failed.
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),
}

/// An open archive, closed exactly once when dropped.
#[derive(Debug)]
pub struct JarArchive {
    inner: ZipArchive<File>,
    // Declared after `inner` so the handle closes before the file is removed.
    _backing: Option<TempPath>,
}

impl JarArchive {
    /// Open the archive at `path`, verifying it when `verify` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] if the file cannot be opened, is not a zip
    /// archive, or fails verification.
    pub fn open(path: &Utf8Path, verify: bool) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        Self::from_file(file, None, verify)
    }

    fn from_file(file: File, backing: Option<TempPath>, verify: bool) -> Result<Self, ArchiveError> {
        let mut inner = ZipArchive::new(file)?;
        if verify {
            verify_archive(&mut inner)?;
        }
        Ok(Self {
            inner,
            _backing: backing,
        })
    }

    /// Whether `entry` exists in the archive.
    #[must_use]
    pub fn contains(&self, entry: &str) -> bool {
        self.inner.file_names().any(|name| name == entry)
    }

    /// Stream the bytes of `entry` into `out`, returning the number copied.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the entry is missing, cannot be decompressed,
    /// or `out` rejects a write.
    pub fn copy_entry(&mut self, entry: &str, out: &mut dyn Write) -> io::Result<u64> {
        let mut file = self.inner.by_name(entry).map_err(io::Error::other)?;
        copy_chunked(&mut file, out)
    }
}

/// Copy `reader` into `writer` through a fixed-size buffer.
///
/// # Errors
///
/// Returns the first read or write error.
pub fn copy_chunked(reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let chunk = buffer.get(..bytes_read).unwrap_or_default();
        writer.write_all(chunk)?;
        total += chunk.len() as u64;
    }
    writer.flush()?;
    Ok(total)
}

/// Open the archive named by `location`.
///
/// Nested archives are copied into a scratch file named
/// `<nested_prefix><random>.jar` which lives as long as the returned archive.
///
/// # Errors
///
/// Returns [`ArchiveError`] if either archive cannot be opened or verified,
/// or if the nested entry is missing.
pub fn resolve(
    location: &LocationDescriptor,
    verify: bool,
    scratch: &ScratchSpace,
    nested_prefix: &str,
) -> Result<JarArchive, ArchiveError> {
    let mut outer = JarArchive::open(location.outer(), verify)?;
    let LocationDescriptor::Nested { inner, .. } = location else {
        return Ok(outer);
    };
    if !outer.contains(inner) {
        return Err(ArchiveError::NestedEntryMissing {
            entry: inner.clone(),
        });
    }

    let mut temporary = scratch.create(nested_prefix, NESTED_SUFFIX)?;
    debug!(
        "extracting nested archive {location} to {}",
        temporary.path().display()
    );
    outer.copy_entry(inner, temporary.as_file_mut())?;
    drop(outer);

    let (mut file, path) = temporary.into_parts();
    file.seek(SeekFrom::Start(0))?;
    JarArchive::from_file(file, Some(path), verify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ArchiveBuilder, scratch_entries, utf8_dir};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn nested_fixture(dir: &TempDir) -> LocationDescriptor {
        let inner = ArchiveBuilder::new()
            .entry("lib/x86_64/linux/libfoo.so", b"native")
            .into_bytes();
        let outer = utf8_dir(dir).join("outer.jar");
        ArchiveBuilder::new()
            .entry("BOOT-INF/lib/inner.jar", &inner)
            .write_to(outer.as_std_path());
        LocationDescriptor::parse(&format!("{outer}!/BOOT-INF/lib/inner.jar"))
    }

    #[rstest]
    fn opens_direct_archive(dir: TempDir) {
        let path = utf8_dir(&dir).join("app.jar");
        ArchiveBuilder::new()
            .entry("lib/x86_64/linux/libfoo.so", b"native")
            .write_to(path.as_std_path());

        let archive = resolve(
            &LocationDescriptor::Direct(path),
            false,
            &ScratchSpace::system(),
            "nested",
        )
        .expect("open archive");

        assert!(archive.contains("lib/x86_64/linux/libfoo.so"));
        assert!(!archive.contains("lib/x86_64/linux/libbar.so"));
    }

    #[rstest]
    fn rejects_non_archive_bytes(dir: TempDir) {
        let path = utf8_dir(&dir).join("bogus.jar");
        std::fs::write(&path, b"definitely not a zip").expect("write bogus file");

        let result = JarArchive::open(&path, false);
        assert!(matches!(result, Err(ArchiveError::Invalid(_))));
    }

    #[rstest]
    fn missing_archive_is_an_io_error(dir: TempDir) {
        let path = utf8_dir(&dir).join("absent.jar");
        let result = JarArchive::open(&path, false);
        assert!(matches!(result, Err(ArchiveError::Io(_))));
    }

    #[rstest]
    fn nested_archive_is_materialised_and_cleaned_up(dir: TempDir) {
        let location = nested_fixture(&dir);
        let scratch_dir = tempfile::tempdir().expect("scratch dir");
        let scratch = ScratchSpace::in_dir(utf8_dir(&scratch_dir));

        let archive = resolve(&location, true, &scratch, "nested-test").expect("resolve");
        assert!(archive.contains("lib/x86_64/linux/libfoo.so"));
        assert_eq!(scratch_entries(scratch_dir.path()).len(), 1);

        drop(archive);
        assert!(scratch_entries(scratch_dir.path()).is_empty());
    }

    #[rstest]
    fn missing_nested_entry_creates_no_scratch_file(dir: TempDir) {
        let outer = utf8_dir(&dir).join("outer.jar");
        ArchiveBuilder::new()
            .entry("unrelated.txt", b"hello")
            .write_to(outer.as_std_path());
        let scratch_dir = tempfile::tempdir().expect("scratch dir");
        let scratch = ScratchSpace::in_dir(utf8_dir(&scratch_dir));

        let result = resolve(
            &LocationDescriptor::parse(&format!("{outer}!/lib/inner.jar")),
            false,
            &scratch,
            "nested-test",
        );

        assert!(matches!(
            result,
            Err(ArchiveError::NestedEntryMissing { ref entry }) if entry == "lib/inner.jar"
        ));
        assert!(scratch_entries(scratch_dir.path()).is_empty());
    }

    #[rstest]
    fn invalid_nested_archive_removes_scratch_file(dir: TempDir) {
        let outer = utf8_dir(&dir).join("outer.jar");
        ArchiveBuilder::new()
            .entry("lib/inner.jar", b"not a zip either")
            .write_to(outer.as_std_path());
        let scratch_dir = tempfile::tempdir().expect("scratch dir");
        let scratch = ScratchSpace::in_dir(utf8_dir(&scratch_dir));

        let result = resolve(
            &LocationDescriptor::parse(&format!("{outer}!/lib/inner.jar")),
            false,
            &scratch,
            "nested-test",
        );

        assert!(matches!(result, Err(ArchiveError::Invalid(_))));
        assert!(scratch_entries(scratch_dir.path()).is_empty());
    }

    #[test]
    fn chunked_copy_handles_multiple_buffers() {
        let source: Vec<u8> = (0..COPY_BUFFER_SIZE * 3 + 17)
            .map(|i| u8::try_from(i % 251).expect("fits in u8"))
            .collect();
        let mut out = Vec::new();

        let copied = copy_chunked(&mut source.as_slice(), &mut out).expect("copy");

        assert_eq!(copied, source.len() as u64);
        assert_eq!(out, source);
    }
}
