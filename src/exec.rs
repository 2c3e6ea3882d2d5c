//! External command execution.
//!
//! Tasks never spawn processes directly; they go through the [`Executor`]
//! trait so the whole pipeline can be driven by a recording mock in tests.
//! [`SystemExecutor`] additionally carries environment overrides that later
//! stages add (for example Homebrew's `shellenv` or `NVM_DIR`), which apply
//! to every command it spawns and to its PATH lookups.
use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output (empty for interactive runs).
    pub stdout: String,
    /// Captured standard error (empty for interactive runs).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl ExecResult {
    /// Short description of how the process ended, for error messages.
    #[must_use]
    pub fn exit_description(&self) -> String {
        self.code
            .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit {c}"))
    }
}

/// Abstraction over process execution, injectable for testing.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command, capturing output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, capturing output, without failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command attached to the user's terminal (stdin, stdout and
    /// stderr inherited), with extra environment variables.
    ///
    /// Used for long-running installers and password prompts.  The returned
    /// [`ExecResult`] carries no output; callers inspect `success`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult>;

    /// Check if a program is resolvable on PATH.
    fn which(&self, program: &str) -> bool;

    /// Set an environment variable for every subsequent command and lookup.
    fn set_env(&self, key: &str, value: &str);
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemExecutor {
    overrides: Mutex<BTreeMap<String, String>>,
}

impl SystemExecutor {
    /// Create an executor with no environment overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn overrides(&self) -> BTreeMap<String, String> {
        self.overrides
            .lock()
            .map_or_else(|e| e.into_inner().clone(), |g| g.clone())
    }

    /// The PATH value commands and lookups see.
    fn search_path(&self) -> Option<OsString> {
        self.overrides()
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"))
    }

    /// Resolve `program` against the effective PATH, falling back to the bare
    /// name so the OS reports a sensible spawn error.
    fn resolve(&self, program: &str) -> PathBuf {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(program, self.search_path(), cwd)
            .unwrap_or_else(|_| PathBuf::from(program))
    }

    fn command(&self, program: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(self.resolve(program));
        cmd.args(args);
        for (k, v) in self.overrides() {
            cmd.env(k, v);
        }
        cmd
    }
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            bail!(
                "{program} failed ({}): {}",
                result.exit_description(),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = self
            .command(program, args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let mut cmd = self.command(program, args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        let status = cmd
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: status.success(),
            code: status.code(),
        })
    }

    fn which(&self, program: &str) -> bool {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(program, self.search_path(), cwd).is_ok()
    }

    fn set_env(&self, key: &str, value: &str) {
        let mut guard = self
            .overrides
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
    }
}
