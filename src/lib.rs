//! Extract and load platform-specific native libraries bundled in archives.
//!
//! A host application ships shared libraries inside a zip archive (a jar,
//! possibly nested inside another jar) under
//! `<library_path>/<arch>/<os>/lib<name><ext>`. At run time this crate
//! detects the platform, finds the matching entry, copies it to a temporary
//! file, loads it with the dynamic linker, and removes every temporary file
//! before returning. Loading is a best-effort probe: callers keep a portable
//! fallback for when it returns `false`.
//!
//! # Modules
//!
//! - [`platform`] - OS and architecture detection
//! - [`candidates`] - In-archive candidate paths per platform
//! - [`location`] - Archive location descriptors, including nested archives
//! - [`archive`] - Archive resolution and nested archive materialisation
//! - [`verification`] - CRC and manifest digest verification
//! - [`extraction`] - Copying the matching library to a temporary file
//! - [`native`] - The native-load primitive
//! - [`loader`] - Orchestration and cleanup
//! - [`config`] - Loader configuration from TOML or the environment
//! - [`error`] - Load failure kinds
//! - [`scratch`] - Temporary file creation

pub mod archive;
pub mod candidates;
pub mod config;
pub mod error;
pub mod extraction;
pub mod loader;
pub mod location;
pub mod native;
pub mod platform;
pub mod scratch;
pub mod verification;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use config::LoaderConfig;
pub use error::LoadError;
pub use loader::{ArchiveLibraryLoader, LoadedLibrary};
pub use platform::Platform;

/// Load the library `name` using configuration from the environment.
///
/// See [`LoaderConfig::from_env`] for the variables consulted. Returns
/// `false` when the configuration cannot be built or the library cannot be
/// loaded; details are logged.
pub fn load(name: &str, verify: bool) -> bool {
    match LoaderConfig::from_env() {
        Ok(config) => ArchiveLibraryLoader::new(config).load(name, verify),
        Err(err) => {
            log::error!("error loading native library {name}: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ARCHIVE_ENV, LIBRARY_PATH_ENV, TEMP_DIR_ENV};

    #[test]
    fn load_reports_false_for_missing_archive() {
        let dir = tempfile::tempdir().expect("temp dir");
        let archive = dir.path().join("absent.jar");
        let archive = archive.to_str().expect("UTF-8 temp path");

        temp_env::with_vars(
            [
                (ARCHIVE_ENV, Some(archive)),
                (LIBRARY_PATH_ENV, None),
                (TEMP_DIR_ENV, None),
            ],
            || assert!(!load("scrypt", false)),
        );
    }
}
