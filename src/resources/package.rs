//! Package-manager invocation: one index refresh, then one batch install.
use std::fmt;

use anyhow::Result;

use super::{Applicable, ResourceChange};
use crate::config::packages::PackageSet;
use crate::error::BootstrapError;
use crate::exec::Executor;
use crate::platform::PlatformFamily;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian/Ubuntu packages (`apt-get`).
    Apt,
    /// macOS packages (Homebrew).
    Homebrew,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl PackageManager {
    /// Package manager used on `family`.
    #[must_use]
    pub const fn for_family(family: PlatformFamily) -> Self {
        match family {
            PlatformFamily::Linux => Self::Apt,
            PlatformFamily::MacOs => Self::Homebrew,
        }
    }

    /// Executable name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Homebrew => "brew",
        }
    }

    /// Whether commands must run as root.  Homebrew refuses to.
    #[must_use]
    pub const fn requires_root(self) -> bool {
        matches!(self, Self::Apt)
    }

    /// Index refresh command.
    #[must_use]
    pub fn refresh_command(self, elevate: bool) -> CommandLine {
        CommandLine::new(self, elevate, vec!["update".to_string()])
    }

    /// Batch install command for every package in `set`.
    #[must_use]
    pub fn install_command(self, set: &PackageSet, elevate: bool) -> CommandLine {
        let mut args = vec!["install".to_string()];
        if self == Self::Apt {
            args.push("-y".to_string());
        }
        args.extend(set.names().iter().cloned());
        CommandLine::new(self, elevate, args)
    }

    /// Extra environment for install commands.
    ///
    /// `brew install` would otherwise refresh the index a second time.
    #[must_use]
    pub const fn install_env(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Apt => &[],
            Self::Homebrew => &[("HOMEBREW_NO_AUTO_UPDATE", "1")],
        }
    }
}

/// A fully-resolved command line, optionally prefixed with `sudo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program to spawn (`sudo` when elevated).
    pub program: String,
    /// Arguments passed to `program`.
    pub args: Vec<String>,
}

impl CommandLine {
    fn new(manager: PackageManager, elevate: bool, args: Vec<String>) -> Self {
        if elevate && manager.requires_root() {
            let mut full = vec![manager.program().to_string()];
            full.extend(args);
            Self {
                program: "sudo".to_string(),
                args: full,
            }
        } else {
            Self {
                program: manager.program().to_string(),
                args,
            }
        }
    }

    /// Arguments as borrowed strings, ready for [`Executor`] calls.
    #[must_use]
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The whole package set, installed with one refresh and one install call.
///
/// Output streams straight to the terminal.  There is no per-package state
/// check: the package manager itself skips what is already installed.
#[derive(Debug)]
pub struct PackageSetResource<'a> {
    manager: PackageManager,
    set: &'a PackageSet,
    elevate: bool,
    executor: &'a dyn Executor,
}

impl<'a> PackageSetResource<'a> {
    /// Create a new package set resource.
    #[must_use]
    pub const fn new(
        manager: PackageManager,
        set: &'a PackageSet,
        elevate: bool,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            manager,
            set,
            elevate,
            executor,
        }
    }

    /// Commands [`apply`](Applicable::apply) runs, in order.
    #[must_use]
    pub fn commands(&self) -> [CommandLine; 2] {
        [
            self.manager.refresh_command(self.elevate),
            self.manager.install_command(self.set, self.elevate),
        ]
    }
}

impl Applicable for PackageSetResource<'_> {
    fn description(&self) -> String {
        format!("{} packages ({})", self.set.len(), self.manager)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.set.is_empty() {
            return Err(BootstrapError::InstallFailed {
                manager: self.manager.to_string(),
                reason: "package set is empty".to_string(),
            }
            .into());
        }

        let [refresh, install] = self.commands();

        let result = self
            .executor
            .run_interactive(&refresh.program, &refresh.arg_refs(), &[])
            .map_err(|e| BootstrapError::RefreshFailed {
                manager: self.manager.to_string(),
                reason: format!("`{refresh}` could not be started: {e:#}"),
            })?;
        if !result.success {
            return Err(BootstrapError::RefreshFailed {
                manager: self.manager.to_string(),
                reason: format!("`{refresh}` ended with {}", result.exit_description()),
            }
            .into());
        }

        let result = self
            .executor
            .run_interactive(&install.program, &install.arg_refs(), self.manager.install_env())
            .map_err(|e| BootstrapError::InstallFailed {
                manager: self.manager.to_string(),
                reason: format!("`{}` could not be started: {e:#}", install.program),
            })?;
        if !result.success {
            return Err(BootstrapError::InstallFailed {
                manager: self.manager.to_string(),
                reason: format!("`{}` ended with {}", install.program, result.exit_description()),
            }
            .into());
        }

        Ok(ResourceChange::Applied)
    }
}
