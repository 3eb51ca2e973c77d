//! Load orchestration.
//!
//! [`ArchiveLibraryLoader`] runs detect → resolve → extract → load → clean up
//! for one library. Every temporary file is owned by a scoped value, so the
//! nested archive copy and the extracted library are removed on every exit
//! path. The extracted library is removed only after the native load returns.

use crate::archive::resolve;
use crate::candidates::candidates;
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::extraction::extract;
use crate::location::LocationDescriptor;
use crate::native::{DynamicLoader, NativeLoader};
use crate::platform::Platform;
use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};

/// A library that was found, extracted, and loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLibrary {
    entry: String,
    platform: Platform,
}

impl LoadedLibrary {
    /// Return the in-archive path of the loaded library.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Return the platform the library was selected for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }
}

/// Extracts and loads native libraries bundled in an archive.
///
/// Each call opens its own archive handle and creates its own uniquely named
/// temporary files, so one loader may serve concurrent callers.
///
/// # Examples
///
/// ```no_run
/// use nativeload::config::LoaderConfig;
/// use nativeload::loader::ArchiveLibraryLoader;
///
/// let loader = ArchiveLibraryLoader::new(LoaderConfig::for_location("/opt/app.jar"));
/// if !loader.load("scrypt", false) {
///     // fall back to the portable implementation
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveLibraryLoader<L = DynamicLoader> {
    config: LoaderConfig,
    native: L,
    platform: Option<Platform>,
}

impl ArchiveLibraryLoader<DynamicLoader> {
    /// Create a loader that maps libraries with the platform dynamic linker.
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_native_loader(config, DynamicLoader)
    }
}

impl<L: NativeLoader> ArchiveLibraryLoader<L> {
    /// Create a loader that delegates the final load to `native`.
    #[must_use]
    pub fn with_native_loader(config: LoaderConfig, native: L) -> Self {
        Self {
            config,
            native,
            platform: None,
        }
    }

    /// Select libraries for `platform` instead of the detected one.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Return the native loader in use.
    #[must_use]
    pub const fn native_loader(&self) -> &L {
        &self.native
    }

    /// Return the platform libraries are selected for.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// Load the library `name`, optionally verifying the archive first.
    ///
    /// Returns `true` only if a matching library was extracted and loaded.
    /// Failures are logged and never propagate, panics included; callers
    /// should fall back to a portable implementation on `false`.
    pub fn load(&self, name: &str, verify: bool) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_load(name, verify))) {
            Ok(Ok(loaded)) => {
                info!(
                    "loaded native library {name} from {} for {}",
                    loaded.entry(),
                    loaded.platform()
                );
                true
            }
            Ok(Err(err)) if err.is_expected() => {
                debug!("native library {name} unavailable: {err}");
                false
            }
            Ok(Err(err)) => {
                error!("error loading native library {name}: {err}");
                false
            }
            Err(_) => {
                error!("unexpected panic while loading native library {name}");
                false
            }
        }
    }

    /// Load the library `name`, reporting why it could not be loaded.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing the first failing step.
    /// [`LoadError::InvalidName`] is returned before the archive is touched
    /// when `name` is empty or contains a path separator or `..`.
    pub fn try_load(&self, name: &str, verify: bool) -> Result<LoadedLibrary> {
        check_name(name)?;
        let platform = self.platform();
        let candidates = candidates(&self.config.library_path, platform, name);
        if candidates.is_empty() {
            return Err(LoadError::UnsupportedPlatform { platform });
        }

        let location = LocationDescriptor::parse(&self.config.location);
        let scratch = self.config.scratch_space();
        let mut archive = resolve(&location, verify, &scratch, &self.config.nested_prefix)
            .map_err(|source| LoadError::ArchiveOpen {
                location: self.config.location.clone(),
                source,
            })?;

        let Some(library) = extract(&mut archive, name, &candidates, &scratch)? else {
            return Err(LoadError::EntryNotFound {
                name: name.to_owned(),
                tried: candidates.iter().map(|c| c.path().to_owned()).collect(),
            });
        };

        let outcome = self.native.load(library.path());
        let entry = library.entry().to_owned();
        library.remove();
        drop(archive);

        outcome.map_err(|source| LoadError::Native {
            entry: entry.clone(),
            source,
        })?;
        Ok(LoadedLibrary { entry, platform })
    }
}

/// Reject names that cannot serve as a temporary file prefix.
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(LoadError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
