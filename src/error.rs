//! Fatal error taxonomy for a bootstrap run.
//!
//! Every stage of the pipeline either succeeds or halts the whole run with
//! one of the [`BootstrapError`] variants below.  Stages return
//! [`anyhow::Result`] so they can attach context with `.context(...)`; the
//! typed error stays recoverable at the CLI boundary through
//! [`BootstrapError::find`].

use thiserror::Error;

/// Exit code used for every fatal stage and for interruption.
pub const FATAL_EXIT_CODE: i32 = 1;

/// A fatal condition that aborts the bootstrap run.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The kernel is neither Linux nor Darwin.
    #[error("unsupported operating system: {kernel}")]
    UnsupportedPlatform {
        /// Kernel identifier as reported by `uname -s`.
        kernel: String,
    },

    /// A Linux host without a usable OS-release descriptor.
    #[error("cannot classify Linux distribution: {path}: {reason}")]
    MissingOsDescriptor {
        /// Path of the descriptor that was inspected.
        path: String,
        /// Why the descriptor could not be used.
        reason: String,
    },

    /// Elevated privileges could not be obtained.
    #[error("administrator privileges are required: {reason}")]
    PrivilegeDenied {
        /// Human-readable reason for the denial.
        reason: String,
    },

    /// The package manager is still not on PATH after installing it.
    #[error("package manager '{manager}' not found on PATH")]
    PackageManagerMissing {
        /// Name of the package manager binary.
        manager: String,
    },

    /// The package manager's bootstrap installer failed.
    #[error("installing package manager '{manager}' failed: {reason}")]
    PackageManagerInstallFailed {
        /// Name of the package manager being installed.
        manager: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The package index refresh exited non-zero.
    #[error("{manager} update failed: {reason}")]
    RefreshFailed {
        /// Package manager that was refreshed.
        manager: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The batch package install exited non-zero.
    #[error("{manager} install failed: {reason}")]
    InstallFailed {
        /// Package manager that ran the install.
        manager: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The auxiliary version-manager installer failed.
    #[error("installing {tool} failed: {reason}")]
    AuxiliaryInstallFailed {
        /// Name of the auxiliary tool (e.g. `nvm`).
        tool: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The run was interrupted from outside (Ctrl-C).
    #[error("interrupted")]
    Interrupted,
}

impl BootstrapError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        FATAL_EXIT_CODE
    }

    /// Locate a [`BootstrapError`] anywhere in an [`anyhow::Error`] chain.
    #[must_use]
    pub fn find(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}
