//! Run settings: built-in defaults, optionally overridden by a TOML file.
pub mod packages;
pub mod toml_loader;

use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Release of nvm installed when the settings file does not pin one.
pub const DEFAULT_NVM_VERSION: &str = "v0.40.1";

/// Official Homebrew bootstrap installer.
pub const DEFAULT_HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Settings for a bootstrap run.
///
/// Every key is optional in the settings file; absent keys keep their
/// defaults.  Unknown keys are rejected so typos surface immediately.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// nvm release tag to install.
    pub nvm_version: String,
    /// Full URL of the nvm installer, overriding the one derived from
    /// `nvm_version`.
    pub nvm_install_url: Option<String>,
    /// URL of the Homebrew bootstrap installer.
    pub homebrew_install_url: String,
    /// OS-release descriptor inspected on Linux.
    pub os_release_path: PathBuf,
    /// Overall timeout for each download in seconds; `0` disables it.
    pub download_timeout_secs: u64,
    /// Additional packages appended to the resolved package set.
    pub extra_packages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nvm_version: DEFAULT_NVM_VERSION.to_string(),
            nvm_install_url: None,
            homebrew_install_url: DEFAULT_HOMEBREW_INSTALL_URL.to_string(),
            os_release_path: PathBuf::from("/etc/os-release"),
            download_timeout_secs: 300,
            extra_packages: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit `path` must exist.  Without one, the default location
    /// (see [`default_path`]) is used when present, otherwise defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path does not exist, or if the file
    /// cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    bail!("settings file not found: {}", p.display());
                }
                toml_loader::load_config(p)
            }
            None => default_path().map_or_else(|| Ok(Self::default()), |p| {
                toml_loader::load_config(&p)
            }),
        }
    }

    /// URL of the nvm installer script.
    #[must_use]
    pub fn nvm_installer_url(&self) -> String {
        self.nvm_install_url.clone().unwrap_or_else(|| {
            format!(
                "https://raw.githubusercontent.com/nvm-sh/nvm/{}/install.sh",
                self.nvm_version
            )
        })
    }

    /// Download timeout, or `None` to wait indefinitely.
    #[must_use]
    pub const fn download_timeout(&self) -> Option<Duration> {
        if self.download_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.download_timeout_secs))
        }
    }
}

/// `$XDG_CONFIG_HOME/devprep/config.toml`, falling back to
/// `~/.config/devprep/config.toml`.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("devprep").join("config.toml"))
}
