//! Candidate in-archive paths for a native library.
//!
//! Paths follow the layout `<library_path>/<arch>/<os>/lib<name><ext>`, with
//! one entry per extension accepted on the target OS. The first candidate
//! present in the archive wins.

use crate::platform::Platform;

/// Default directory inside the archive that holds native libraries.
pub const DEFAULT_LIBRARY_PATH: &str = "lib";

/// A plausible location for a native library inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCandidate {
    path: String,
    extension: &'static str,
}

impl LibraryCandidate {
    /// Return the full in-archive entry path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return the file extension, including the leading dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.extension
    }
}

/// Build the ordered candidate list for `name` on `platform`.
///
/// Unsupported platforms produce an empty list.
///
/// # Examples
///
/// ```
/// use nativeload::candidates::candidates;
/// use nativeload::platform::Platform;
///
/// let darwin = Platform::detect_from("macos", "aarch64");
/// let paths: Vec<_> = candidates("lib", darwin, "scrypt")
///     .iter()
///     .map(|c| c.path().to_owned())
///     .collect();
/// assert_eq!(
///     paths,
///     ["lib/aarch64/darwin/libscrypt.dylib", "lib/aarch64/darwin/libscrypt.jnilib"]
/// );
/// ```
#[must_use]
pub fn candidates(library_path: &str, platform: Platform, name: &str) -> Vec<LibraryCandidate> {
    if !platform.is_supported() {
        return Vec::new();
    }

    let stem = format!(
        "{}/{}/{}/lib{name}",
        library_path.trim_end_matches('/'),
        platform.arch(),
        platform.os()
    );

    platform
        .os()
        .library_extensions()
        .iter()
        .copied()
        .map(|extension| LibraryCandidate {
            path: format!("{stem}{extension}"),
            extension,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use rstest::rstest;

    const ALL_OS: [Os; 4] = [Os::Linux, Os::Darwin, Os::FreeBsd, Os::Windows];
    const ALL_ARCH: [Arch; 4] = [Arch::X86_64, Arch::X86, Arch::Aarch64, Arch::Arm];

    fn paths(list: &[LibraryCandidate]) -> Vec<&str> {
        list.iter().map(LibraryCandidate::path).collect()
    }

    #[rstest]
    #[case::linux(Os::Linux, &["lib/x86_64/linux/libfoo.so"])]
    #[case::freebsd(Os::FreeBsd, &["lib/x86_64/freebsd/libfoo.so"])]
    #[case::windows(Os::Windows, &["lib/x86_64/windows/libfoo.dll"])]
    #[case::darwin(
        Os::Darwin,
        &["lib/x86_64/darwin/libfoo.dylib", "lib/x86_64/darwin/libfoo.jnilib"]
    )]
    fn builds_paths_per_os(#[case] os: Os, #[case] expected: &[&str]) {
        let list = candidates(DEFAULT_LIBRARY_PATH, Platform::new(os, Arch::X86_64), "foo");
        assert_eq!(paths(&list), expected);
    }

    #[test]
    fn every_supported_pair_has_canonical_extensions() {
        for os in ALL_OS {
            for arch in ALL_ARCH {
                let list = candidates("lib", Platform::new(os, arch), "foo");
                assert!(!list.is_empty(), "no candidates for {os}/{arch}");
                for (candidate, extension) in list.iter().zip(os.library_extensions()) {
                    assert!(candidate.path().ends_with(extension));
                    assert_eq!(candidate.extension(), *extension);
                }
            }
        }
    }

    #[rstest]
    #[case::os(Platform::new(Os::Unsupported, Arch::X86_64))]
    #[case::arch(Platform::new(Os::Linux, Arch::Unsupported))]
    fn unsupported_platform_has_no_candidates(#[case] platform: Platform) {
        assert!(candidates("lib", platform, "foo").is_empty());
    }

    #[test]
    fn ordering_is_deterministic() {
        let platform = Platform::new(Os::Darwin, Arch::Aarch64);
        assert_eq!(
            candidates("lib", platform, "foo"),
            candidates("lib", platform, "foo")
        );
    }

    #[test]
    fn trailing_slash_in_library_path_is_ignored() {
        let list = candidates("native/", Platform::new(Os::Linux, Arch::Arm), "bar");
        assert_eq!(paths(&list), ["native/arm/linux/libbar.so"]);
    }
}
