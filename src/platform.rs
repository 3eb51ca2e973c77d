//! Platform detection for native library selection.
//!
//! Maps the operating system and CPU architecture identifiers reported by the
//! running environment onto a closed set of variants. Unrecognised values map
//! to an `Unsupported` sentinel rather than an error so that callers degrade
//! to an empty candidate list.

use std::fmt;
use std::sync::OnceLock;

/// Operating systems with a known shared library naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// Linux (`.so`).
    Linux,
    /// macOS (`.dylib`, `.jnilib`).
    Darwin,
    /// FreeBSD (`.so`).
    FreeBsd,
    /// Windows (`.dll`).
    Windows,
    /// Any operating system without a naming convention.
    Unsupported,
}

impl Os {
    /// Parse an operating system identifier, tolerating case and common aliases.
    ///
    /// # Examples
    ///
    /// ```
    /// use nativeload::platform::Os;
    ///
    /// assert_eq!(Os::parse("Mac OS X"), Os::Darwin);
    /// assert_eq!(Os::parse("Windows 11"), Os::Windows);
    /// assert_eq!(Os::parse("plan9"), Os::Unsupported);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let normalised = value.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "linux" => Self::Linux,
            "darwin" | "macos" | "osx" => Self::Darwin,
            "freebsd" => Self::FreeBsd,
            other if other.starts_with("mac os") => Self::Darwin,
            other if other.starts_with("windows") => Self::Windows,
            _ => Self::Unsupported,
        }
    }

    /// Shared library extensions for this OS, in the order they are tried.
    #[must_use]
    pub const fn library_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Darwin => &[".dylib", ".jnilib"],
            Self::Linux | Self::FreeBsd => &[".so"],
            Self::Windows => &[".dll"],
            Self::Unsupported => &[],
        }
    }

    /// Directory name used for this OS inside an archive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::FreeBsd => "freebsd",
            Self::Windows => "windows",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures with a known archive directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86 (`x86_64`, `amd64`, `x64`).
    X86_64,
    /// 32-bit x86 (`x86`, `i386` to `i686`).
    X86,
    /// 64-bit ARM (`aarch64`, `arm64`).
    Aarch64,
    /// 32-bit ARM (`arm`, `armv7`, `arm32`).
    Arm,
    /// Any architecture without a directory name.
    Unsupported,
}

impl Arch {
    /// Parse an architecture identifier, tolerating case and common aliases.
    ///
    /// # Examples
    ///
    /// ```
    /// use nativeload::platform::Arch;
    ///
    /// assert_eq!(Arch::parse("AMD64"), Arch::X86_64);
    /// assert_eq!(Arch::parse("arm64"), Arch::Aarch64);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let normalised = value.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "x86_64" | "amd64" | "x64" => Self::X86_64,
            "x86" | "i386" | "i486" | "i586" | "i686" => Self::X86,
            "aarch64" | "arm64" => Self::Aarch64,
            "arm" | "arm32" | "armv7" | "armv7l" => Self::Arm,
            _ => Self::Unsupported,
        }
    }

    /// Directory name used for this architecture inside an archive.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::X86 => "x86",
            Self::Aarch64 => "aarch64",
            Self::Arm => "arm",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operating system and architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    /// Create a platform from already-parsed components.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Build a platform from raw OS and architecture identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use nativeload::platform::{Arch, Os, Platform};
    ///
    /// let platform = Platform::detect_from("Linux", "amd64");
    /// assert_eq!(platform, Platform::new(Os::Linux, Arch::X86_64));
    /// ```
    #[must_use]
    pub fn detect_from(os: &str, arch: &str) -> Self {
        Self::new(Os::parse(os), Arch::parse(arch))
    }

    /// Detect the platform of the running process.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Return the detected platform, computing it at most once per process.
    #[must_use]
    pub fn current() -> Self {
        static CURRENT: OnceLock<Platform> = OnceLock::new();
        *CURRENT.get_or_init(Self::detect)
    }

    /// Return the operating system component.
    #[must_use]
    pub const fn os(&self) -> Os {
        self.os
    }

    /// Return the architecture component.
    #[must_use]
    pub const fn arch(&self) -> Arch {
        self.arch
    }

    /// Whether both components map to a known variant.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self.os, Os::Unsupported) && !matches!(self.arch, Arch::Unsupported)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::linux("linux", Os::Linux)]
    #[case::linux_upper("Linux", Os::Linux)]
    #[case::macos("macos", Os::Darwin)]
    #[case::mac_os_x("Mac OS X", Os::Darwin)]
    #[case::darwin("darwin", Os::Darwin)]
    #[case::freebsd("FreeBSD", Os::FreeBsd)]
    #[case::windows("windows", Os::Windows)]
    #[case::windows_versioned("Windows 10", Os::Windows)]
    #[case::padded("  linux ", Os::Linux)]
    #[case::solaris("solaris", Os::Unsupported)]
    #[case::empty("", Os::Unsupported)]
    fn parses_os_identifiers(#[case] raw: &str, #[case] expected: Os) {
        assert_eq!(Os::parse(raw), expected);
    }

    #[rstest]
    #[case::x86_64("x86_64", Arch::X86_64)]
    #[case::amd64("amd64", Arch::X86_64)]
    #[case::amd64_upper("AMD64", Arch::X86_64)]
    #[case::i686("i686", Arch::X86)]
    #[case::x86("x86", Arch::X86)]
    #[case::arm64("arm64", Arch::Aarch64)]
    #[case::aarch64("aarch64", Arch::Aarch64)]
    #[case::armv7("armv7l", Arch::Arm)]
    #[case::riscv("riscv64", Arch::Unsupported)]
    fn parses_arch_identifiers(#[case] raw: &str, #[case] expected: Arch) {
        assert_eq!(Arch::parse(raw), expected);
    }

    #[test]
    fn x86_64_and_amd64_are_the_same_platform() {
        assert_eq!(
            Platform::detect_from("linux", "x86_64"),
            Platform::detect_from("linux", "amd64")
        );
    }

    #[rstest]
    #[case::unknown_os("haiku", "x86_64")]
    #[case::unknown_arch("linux", "sparc")]
    fn unknown_components_are_unsupported(#[case] os: &str, #[case] arch: &str) {
        assert!(!Platform::detect_from(os, arch).is_supported());
    }

    #[test]
    fn current_matches_detect() {
        assert_eq!(Platform::current(), Platform::detect());
        assert_eq!(Platform::current(), Platform::current());
    }

    #[test]
    fn display_uses_directory_names() {
        let platform = Platform::new(Os::Darwin, Arch::Aarch64);
        assert_eq!(platform.to_string(), "darwin/aarch64");
    }
}
