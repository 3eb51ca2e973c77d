//! Archive location descriptors.
//!
//! A location is either a plain archive path or `outer!/inner`, where `inner`
//! names an archive stored as an entry of `outer`. Only one level of nesting
//! is modelled; segments after the first nested path are ignored.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Reserved delimiter separating an outer archive from a nested entry.
pub const NESTED_DELIMITER: char = '!';

const FILE_SCHEME: &str = "file:";

/// Where the archive holding native libraries lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationDescriptor {
    /// An archive that can be opened directly.
    Direct(Utf8PathBuf),
    /// An archive stored as the entry `inner` of the archive at `outer`.
    Nested {
        /// Path to the outer archive on disk.
        outer: Utf8PathBuf,
        /// Entry path of the nested archive inside `outer`.
        inner: String,
    },
}

impl LocationDescriptor {
    /// Parse a location string.
    ///
    /// # Examples
    ///
    /// ```
    /// use nativeload::location::LocationDescriptor;
    ///
    /// let nested = LocationDescriptor::parse("file:/opt/app.jar!/BOOT-INF/lib/scrypt.jar!/");
    /// assert_eq!(
    ///     nested,
    ///     LocationDescriptor::Nested {
    ///         outer: "/opt/app.jar".into(),
    ///         inner: "BOOT-INF/lib/scrypt.jar".to_owned(),
    ///     }
    /// );
    /// ```
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.strip_prefix(FILE_SCHEME).unwrap_or(location);
        let mut segments = location.split(NESTED_DELIMITER);
        let outer = Utf8PathBuf::from(segments.next().unwrap_or_default());
        let inner = segments.next().map_or("", |segment| segment.trim_matches('/'));

        if inner.is_empty() {
            Self::Direct(outer)
        } else {
            Self::Nested {
                outer,
                inner: inner.to_owned(),
            }
        }
    }

    /// Return the path of the archive that exists on disk.
    #[must_use]
    pub fn outer(&self) -> &Utf8Path {
        match self {
            Self::Direct(path) | Self::Nested { outer: path, .. } => path,
        }
    }
}

impl fmt::Display for LocationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(path) => write!(f, "{path}"),
            Self::Nested { outer, inner } => write!(f, "{outer}{NESTED_DELIMITER}/{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("/opt/app.jar", "/opt/app.jar")]
    #[case::file_scheme("file:/opt/app.jar", "/opt/app.jar")]
    #[case::self_reference("/opt/app.jar!/", "/opt/app.jar")]
    #[case::relative("app.zip", "app.zip")]
    fn parses_direct_locations(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(
            LocationDescriptor::parse(raw),
            LocationDescriptor::Direct(Utf8PathBuf::from(expected))
        );
    }

    #[rstest]
    #[case::leading_slash("/opt/app.jar!/lib/inner.jar")]
    #[case::no_slash("/opt/app.jar!lib/inner.jar")]
    #[case::trailing_delimiter("/opt/app.jar!/lib/inner.jar!/")]
    #[case::extra_levels("/opt/app.jar!/lib/inner.jar!/deeper.jar")]
    fn parses_nested_locations(#[case] raw: &str) {
        let parsed = LocationDescriptor::parse(raw);
        assert_eq!(
            parsed,
            LocationDescriptor::Nested {
                outer: Utf8PathBuf::from("/opt/app.jar"),
                inner: "lib/inner.jar".to_owned(),
            }
        );
        assert_eq!(parsed.outer().as_str(), "/opt/app.jar");
    }

    #[test]
    fn display_round_trips_nested_form() {
        let raw = "/opt/app.jar!/lib/inner.jar";
        assert_eq!(LocationDescriptor::parse(raw).to_string(), raw);
    }
}
