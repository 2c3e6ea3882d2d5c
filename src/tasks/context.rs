//! Shared execution context passed to every task.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::config::Settings;
use crate::exec::Executor;
use crate::logging::Log;
use crate::net::Downloader;
use crate::platform::PlatformInfo;
use crate::resources::profile_block::ShellKind;

/// Shared context for task execution.
///
/// Built once, after platform detection, and never mutated.  The only
/// state that accumulates during a run is the executor's environment
/// overrides (see [`Executor::set_env`]).
pub struct Context {
    /// Detected platform information.
    pub platform: Arc<PlatformInfo>,
    /// Settings loaded from the optional TOML file.
    pub settings: Arc<Settings>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Fetches installer scripts.
    pub downloader: Arc<dyn Downloader>,
    /// User's home directory path.
    pub home: PathBuf,
    /// Raw value of `$SHELL`, if set.
    pub shell: Option<String>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("platform", &self.platform)
            .field("settings", &self.settings)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("downloader", &self.downloader)
            .field("home", &self.home)
            .field("shell", &self.shell)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Inputs of a run that exist before the platform is known.
pub struct Session {
    /// Settings loaded from the optional TOML file.
    pub settings: Arc<Settings>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Command executor.
    pub executor: Arc<dyn Executor>,
    /// Fetches installer scripts.
    pub downloader: Arc<dyn Downloader>,
    /// User's home directory path.
    pub home: PathBuf,
    /// Raw value of `$SHELL`, if set.
    pub shell: Option<String>,
    /// Whether to perform a dry run.
    pub dry_run: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("home", &self.home)
            .field("shell", &self.shell)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session, reading `$HOME` and `$SHELL` from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME environment variable is not set.
    pub fn from_env(
        settings: Arc<Settings>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        downloader: Arc<dyn Downloader>,
        dry_run: bool,
    ) -> Result<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))?;
        let shell = std::env::var("SHELL").ok().filter(|s| !s.is_empty());

        Ok(Self {
            settings,
            log,
            executor,
            downloader,
            home: PathBuf::from(home),
            shell,
            dry_run,
        })
    }
}

impl Context {
    /// Combine a session with the detected platform.
    #[must_use]
    pub fn new(platform: PlatformInfo, session: Session) -> Self {
        Self {
            platform: Arc::new(platform),
            settings: session.settings,
            log: session.log,
            executor: session.executor,
            downloader: session.downloader,
            home: session.home,
            shell: session.shell,
            dry_run: session.dry_run,
        }
    }

    /// Shell family derived from `$SHELL`.
    #[must_use]
    pub fn shell_kind(&self) -> ShellKind {
        ShellKind::from_shell_var(self.shell.as_deref())
    }

    /// Profile file the nvm block is written to.
    #[must_use]
    pub fn profile_path(&self) -> PathBuf {
        self.shell_kind().profile_path(&self.home)
    }

    /// Directory nvm is installed into.
    #[must_use]
    pub fn nvm_dir(&self) -> PathBuf {
        self.home.join(".nvm")
    }
}
