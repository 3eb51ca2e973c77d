//! Error types for a native library load.
//!
//! One variant per failure kind. [`crate::loader::ArchiveLibraryLoader::load`]
//! converts all of them into `false` plus a log record; the structured form is
//! available through [`crate::loader::ArchiveLibraryLoader::try_load`].

use crate::archive::ArchiveError;
use crate::extraction::ExtractionError;
use crate::native::NativeLoadError;
use crate::platform::Platform;
use thiserror::Error;

/// Errors that can occur while locating, extracting, or loading a library.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The library name is empty or would escape the temporary directory.
    #[error("invalid native library name {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The running platform has no candidate paths.
    #[error("unsupported platform {platform}")]
    UnsupportedPlatform {
        /// The detected platform.
        platform: Platform,
    },

    /// The archive is missing, corrupt, or failed verification.
    #[error("failed to open archive {location}: {source}")]
    ArchiveOpen {
        /// The location descriptor that was resolved.
        location: String,
        /// The underlying archive failure.
        #[source]
        source: ArchiveError,
    },

    /// None of the candidate paths exist in the archive.
    #[error("no native library named {name} in archive; tried {}", .tried.join(", "))]
    EntryNotFound {
        /// The logical library name.
        name: String,
        /// Candidate paths in the order they were tried.
        tried: Vec<String>,
    },

    /// Copying the library out of the archive failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The dynamic linker rejected the extracted file.
    #[error("failed to load native library {entry}: {source}")]
    Native {
        /// The in-archive path of the library.
        entry: String,
        /// The linker failure.
        #[source]
        source: NativeLoadError,
    },
}

impl LoadError {
    /// Whether this error is an expected degrade path rather than a fault.
    ///
    /// Unsupported platforms and archives without a matching library are
    /// normal outcomes for a best-effort probe.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform { .. } | Self::EntryNotFound { .. }
        )
    }
}

/// Result type alias using [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
