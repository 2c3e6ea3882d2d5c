//! Operating system and distribution detection.
use std::fmt;
use std::path::Path;

use crate::error::BootstrapError;
use crate::exec::Executor;

/// Linux distributions the package list is known to work on.
pub const SUPPORTED_DISTRIBUTIONS: &[&str] =
    &["ubuntu", "debian", "pop", "elementary", "zorin", "mint"];

/// Coarse OS classification that drives command and package-name selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    /// Debian-family Linux using `apt`.
    Linux,
    /// macOS using Homebrew.
    MacOs,
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

impl PlatformFamily {
    /// Map a kernel identifier (`uname -s`) to a platform family.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::UnsupportedPlatform`] for anything other
    /// than `Linux` or `Darwin`.
    pub fn from_kernel(kernel: &str) -> Result<Self, BootstrapError> {
        match kernel.trim() {
            "Linux" => Ok(Self::Linux),
            "Darwin" => Ok(Self::MacOs),
            other => Err(BootstrapError::UnsupportedPlatform {
                kernel: other.to_string(),
            }),
        }
    }
}

/// Platform information for the current system.
///
/// Created once before any task runs and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// OS family.
    pub family: PlatformFamily,
    /// Lower-cased distribution identifier (`ubuntu`, `macos`, ...).
    pub distribution_id: String,
    /// Human-readable OS name.
    pub pretty_name: String,
    /// Whether the distribution is on the allow-list.
    pub supported: bool,
}

impl PlatformInfo {
    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(family: PlatformFamily, distribution_id: &str, pretty_name: &str) -> Self {
        let supported = match family {
            PlatformFamily::Linux => SUPPORTED_DISTRIBUTIONS.contains(&distribution_id),
            PlatformFamily::MacOs => true,
        };
        Self {
            family,
            distribution_id: distribution_id.to_string(),
            pretty_name: pretty_name.to_string(),
            supported,
        }
    }

    /// Returns `true` on the Linux family.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.family == PlatformFamily::Linux
    }

    /// Returns `true` on the macOS family.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.family == PlatformFamily::MacOs
    }

    /// Classify a Linux host from the contents of its OS-release descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::MissingOsDescriptor`] if the descriptor has
    /// no `ID` key.
    pub fn from_os_release(content: &str, path: &Path) -> Result<Self, BootstrapError> {
        let release = OsRelease::parse(content);
        let id = release.id.ok_or_else(|| BootstrapError::MissingOsDescriptor {
            path: path.display().to_string(),
            reason: "no ID field".to_string(),
        })?;
        let pretty = release
            .pretty_name
            .or(release.name)
            .unwrap_or_else(|| id.clone());
        Ok(Self::new(PlatformFamily::Linux, &id, &pretty))
    }

    /// Detect the running platform.
    ///
    /// Queries the kernel name with `uname -s`; on Linux, reads the
    /// OS-release descriptor at `os_release`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::UnsupportedPlatform`] for unknown kernels
    /// and [`BootstrapError::MissingOsDescriptor`] when a Linux host has no
    /// readable descriptor.  Fails if `uname` itself cannot be run.
    pub fn detect(executor: &dyn Executor, os_release: &Path) -> anyhow::Result<Self> {
        let kernel = executor.run("uname", &["-s"])?.stdout;
        match PlatformFamily::from_kernel(&kernel)? {
            PlatformFamily::Linux => {
                let content = std::fs::read_to_string(os_release).map_err(|e| {
                    BootstrapError::MissingOsDescriptor {
                        path: os_release.display().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Self::from_os_release(&content, os_release)?)
            }
            PlatformFamily::MacOs => {
                let pretty = executor
                    .run_unchecked("sw_vers", &["-productVersion"])
                    .ok()
                    .filter(|r| r.success && !r.stdout.trim().is_empty())
                    .map_or_else(
                        || "macOS".to_string(),
                        |r| format!("macOS {}", r.stdout.trim()),
                    );
                Ok(Self::new(PlatformFamily::MacOs, "macos", &pretty))
            }
        }
    }
}

/// The subset of `os-release(5)` fields used for classification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct OsRelease {
    id: Option<String>,
    name: Option<String>,
    pretty_name: Option<String>,
}

impl OsRelease {
    fn parse(content: &str) -> Self {
        let mut release = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "ID" => release.id = Some(value.to_lowercase()),
                "NAME" => release.name = Some(value.to_string()),
                "PRETTY_NAME" => release.pretty_name = Some(value.to_string()),
                _ => {}
            }
        }
        release
    }
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
