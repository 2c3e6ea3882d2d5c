//! The set of OS packages to install for a platform family.
use crate::platform::PlatformFamily;

/// Packages installed on every platform, under the same name everywhere.
pub const COMMON_PACKAGES: &[&str] = &["make", "curl", "wget", "git", "llvm"];

/// Compiler toolchain and Python build headers, named for `apt`.
pub const LINUX_PACKAGES: &[&str] = &[
    "build-essential",
    "libssl-dev",
    "zlib1g-dev",
    "libbz2-dev",
    "libreadline-dev",
    "libsqlite3-dev",
    "libncursesw5-dev",
    "xz-utils",
    "tk-dev",
    "libxml2-dev",
    "libxmlsec1-dev",
    "libffi-dev",
    "liblzma-dev",
];

/// The same libraries, named for Homebrew.  The compiler itself comes from
/// the Xcode command line tools that Homebrew's installer sets up.
pub const MACOS_PACKAGES: &[&str] = &[
    "openssl", "readline", "sqlite3", "xz", "zlib", "tcl-tk", "libxml2", "libffi", "ncurses",
    "bzip2",
];

/// Platform-specific subset for `family`.
#[must_use]
pub const fn platform_packages(family: PlatformFamily) -> &'static [&'static str] {
    match family {
        PlatformFamily::Linux => LINUX_PACKAGES,
        PlatformFamily::MacOs => MACOS_PACKAGES,
    }
}

/// Ordered list of package names handed to the package manager in one
/// install call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSet {
    names: Vec<String>,
}

impl PackageSet {
    /// Build `common ++ platform(family) ++ extra`.
    ///
    /// Names are trimmed, blanks dropped, and repeats removed keeping the
    /// first occurrence.
    #[must_use]
    pub fn resolve(family: PlatformFamily, extra: &[String]) -> Self {
        let mut names = Vec::new();
        let candidates = COMMON_PACKAGES
            .iter()
            .chain(platform_packages(family))
            .copied()
            .chain(extra.iter().map(String::as_str));
        for name in candidates {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self { names }
    }

    /// Package names in install order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if there is nothing to install.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
