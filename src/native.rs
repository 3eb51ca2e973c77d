//! The native-load primitive.
//!
//! [`NativeLoader`] is the seam between the extraction pipeline and the
//! dynamic linker so that tests can observe load attempts without mapping
//! real code into the process.

use std::path::Path;

/// Errors reported by a [`NativeLoader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeLoadError {
    /// The dynamic linker rejected the file.
    #[error("{reason}")]
    Rejected {
        /// The linker's description of the failure.
        reason: String,
    },
}

/// Maps a shared library file into the current process.
#[cfg_attr(test, mockall::automock)]
pub trait NativeLoader {
    /// Load the shared library at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NativeLoadError::Rejected`] if the file is not a loadable
    /// library for this process (wrong architecture, missing symbols, and so on).
    fn load(&self, path: &Path) -> Result<(), NativeLoadError>;
}

/// Loads libraries through the platform dynamic linker via `libloading`.
///
/// Loaded libraries stay mapped for the rest of the process lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicLoader;

impl NativeLoader for DynamicLoader {
    fn load(&self, path: &Path) -> Result<(), NativeLoadError> {
        // SAFETY: running library initialisers is the purpose of this call;
        // callers opt in by bundling the library in their own archive.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            NativeLoadError::Rejected {
                reason: e.to_string(),
            }
        })?;
        // Never unload: symbols may be bound for the rest of the process.
        std::mem::forget(library);
        Ok(())
    }
}
