//! Loader configuration.
//!
//! `LoaderConfig` names the archive that bundles native libraries and the
//! layout inside it. Values are deserialised from TOML when a host keeps them
//! in a file, or read from `NATIVELOAD_*` environment variables. Missing
//! fields fall back to the defaults below.

use crate::candidates::DEFAULT_LIBRARY_PATH;
use crate::scratch::ScratchSpace;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::io;
use thiserror::Error;

/// Environment variable holding the archive location descriptor.
pub const ARCHIVE_ENV: &str = "NATIVELOAD_ARCHIVE";
/// Environment variable overriding the in-archive library directory.
pub const LIBRARY_PATH_ENV: &str = "NATIVELOAD_LIBRARY_PATH";
/// Environment variable overriding the temporary directory.
pub const TEMP_DIR_ENV: &str = "NATIVELOAD_TEMP_DIR";

/// Default file name prefix for materialised nested archives.
pub const DEFAULT_NESTED_PREFIX: &str = "nativeload-temporary";

/// Errors arising while building a [`LoaderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid TOML or has unknown fields.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// No archive was configured and the running executable is unknown.
    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] io::Error),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

/// Settings for an [`crate::loader::ArchiveLibraryLoader`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Location descriptor of the archive; `outer!/inner` names a nested archive.
    pub location: String,
    /// Directory inside the archive holding `<arch>/<os>/lib<name><ext>`.
    pub library_path: String,
    /// Directory for temporary files; the OS temporary directory when absent.
    pub temp_dir: Option<Utf8PathBuf>,
    /// File name prefix for materialised nested archives.
    pub nested_prefix: String,
}

impl LoaderConfig {
    /// Create a configuration for `location` with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use nativeload::config::LoaderConfig;
    ///
    /// let config = LoaderConfig::for_location("/opt/app.jar");
    /// assert_eq!(config.library_path, "lib");
    /// ```
    #[must_use]
    pub fn for_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use nativeload::config::LoaderConfig;
    ///
    /// let config = LoaderConfig::from_toml_str("location = \"app.jar\"\nlibrary_path = \"native\"\n")
    ///     .expect("valid configuration");
    /// assert_eq!(config.location, "app.jar");
    /// assert_eq!(config.library_path, "native");
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is invalid.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Build a configuration from `NATIVELOAD_*` environment variables.
    ///
    /// Without `NATIVELOAD_ARCHIVE` the running executable is used as the
    /// archive, which suits binaries with a zip appended to them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CurrentExe`] if the executable path is needed
    /// but unavailable, or [`ConfigError::NonUtf8Path`] if it is not UTF-8.
    pub fn from_env() -> Result<Self, ConfigError> {
        let location = match non_blank_env(ARCHIVE_ENV) {
            Some(location) => location,
            None => current_exe_location()?,
        };
        let defaults = Self::default();

        Ok(Self {
            location,
            library_path: non_blank_env(LIBRARY_PATH_ENV).unwrap_or(defaults.library_path),
            temp_dir: non_blank_env(TEMP_DIR_ENV).map(Utf8PathBuf::from),
            nested_prefix: defaults.nested_prefix,
        })
    }

    /// Return the scratch space described by `temp_dir`.
    #[must_use]
    pub fn scratch_space(&self) -> ScratchSpace {
        self.temp_dir
            .as_ref()
            .map_or_else(ScratchSpace::system, |dir| ScratchSpace::in_dir(dir.clone()))
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            location: String::new(),
            library_path: DEFAULT_LIBRARY_PATH.to_owned(),
            temp_dir: None,
            nested_prefix: DEFAULT_NESTED_PREFIX.to_owned(),
        }
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn current_exe_location() -> Result<String, ConfigError> {
    let exe = std::env::current_exe().map_err(ConfigError::CurrentExe)?;
    Utf8PathBuf::try_from(exe)
        .map(Utf8PathBuf::into_string)
        .map_err(|e| ConfigError::NonUtf8Path(e.into_path_buf().display().to_string()))
}
