// Shared helpers for integration tests.
//
// Provides an in-memory host (command executor, downloader and logger) and a
// temporary home directory so each integration test can drive a full
// bootstrap run without touching the real system or the network.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use devprep::commands::bootstrap;
use devprep::config::Settings;
use devprep::exec::{ExecResult, Executor};
use devprep::logging::{Log, TaskStatus};
use devprep::net::Downloader;
use devprep::tasks::Session;

/// Tools a successful package install puts on PATH.
pub const INSTALLED_TOOLS: &[&str] = &["gcc", "make", "curl", "wget", "git"];

/// Body served for every installer download.
pub const INSTALLER_BODY: &str = "#!/usr/bin/env bash\necho installing\n";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated host.
///
/// Every command is recorded as `"program arg1 arg2 ..."` and succeeds with
/// empty output unless listed as failing.  A few commands have side
/// effects that mirror the real tools:
///
/// - `uname -s` answers with the configured kernel;
/// - running an installer with `NVM_DIR` set creates `$NVM_DIR/nvm.sh`;
/// - running an installer without it puts `brew` on PATH;
/// - `brew shellenv` answers from the first candidate location;
/// - a successful `install` puts [`INSTALLED_TOOLS`] on PATH.
#[derive(Debug)]
pub struct FakeExecutor {
    kernel: String,
    failing: Vec<String>,
    unspawnable: Vec<String>,
    tools: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    env: Mutex<Vec<(String, String)>>,
}

impl FakeExecutor {
    /// A host reporting `kernel` with `tools` on PATH.
    pub fn new(kernel: &str, tools: &[&str]) -> Self {
        Self {
            kernel: kernel.to_string(),
            failing: Vec::new(),
            unspawnable: Vec::new(),
            tools: Mutex::new(tools.iter().map(|t| (*t).to_string()).collect()),
            calls: Mutex::new(Vec::new()),
            env: Mutex::new(Vec::new()),
        }
    }

    /// A Linux host with `apt-get` and `sudo` available.
    pub fn linux() -> Self {
        Self::new("Linux", &["apt-get", "sudo"])
    }

    /// A macOS host without Homebrew.
    pub fn macos() -> Self {
        Self::new("Darwin", &[])
    }

    /// Calls starting with `prefix` exit with status 1.
    pub fn failing(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    /// Interactive calls starting with `prefix` fail to spawn.
    pub fn unspawnable(mut self, prefix: &str) -> Self {
        self.unspawnable.push(prefix.to_string());
        self
    }

    /// Commands issued so far.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Environment overrides applied through `set_env`.
    pub fn env(&self) -> Vec<(String, String)> {
        lock(&self.env).clone()
    }

    fn dispatch(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        lock(&self.calls).push(line.clone());

        let success = !self.failing.iter().any(|p| line.starts_with(p.as_str()));
        let mut stdout = String::new();
        if success {
            stdout = self.side_effects(program, args, env);
        }

        ExecResult {
            stdout,
            stderr: String::new(),
            success,
            code: Some(i32::from(!success)),
        }
    }

    fn side_effects(&self, program: &str, args: &[&str], env: &[(&str, &str)]) -> String {
        match (program, args.first().copied()) {
            ("uname", _) => format!("{}\n", self.kernel),
            ("bash", Some(_)) => {
                match env.iter().find(|(k, _)| *k == "NVM_DIR") {
                    Some((_, dir)) => {
                        std::fs::write(Path::new(dir).join("nvm.sh"), "# nvm\n")
                            .expect("write nvm.sh");
                    }
                    None => {
                        lock(&self.tools).insert("brew".to_string());
                    }
                }
                String::new()
            }
            ("/opt/homebrew/bin/brew", Some("shellenv")) => {
                "export HOMEBREW_PREFIX=\"/opt/homebrew\";\n".to_string()
            }
            _ => {
                if args.contains(&"install") {
                    lock(&self.tools).extend(INSTALLED_TOOLS.iter().map(|t| (*t).to_string()));
                }
                String::new()
            }
        }
    }
}

impl Executor for FakeExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.dispatch(program, args, &[]);
        if result.success {
            Ok(result)
        } else {
            anyhow::bail!("{program} failed ({})", result.exit_description())
        }
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.dispatch(program, args, &[]))
    }

    fn run_interactive(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        if self.unspawnable.iter().any(|p| line.starts_with(p.as_str())) {
            anyhow::bail!("failed to execute: {program}: No such file or directory");
        }
        Ok(self.dispatch(program, args, env))
    }

    fn which(&self, program: &str) -> bool {
        lock(&self.tools).contains(program)
    }

    fn set_env(&self, key: &str, value: &str) {
        lock(&self.env).push((key.to_string(), value.to_string()));
    }
}

/// Downloader that serves [`INSTALLER_BODY`] for every URL and records the
/// requests.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    urls: Mutex<Vec<String>>,
}

impl FakeDownloader {
    /// URLs requested so far, in order.
    pub fn urls(&self) -> Vec<String> {
        lock(&self.urls).clone()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
        lock(&self.urls).push(url.to_string());
        std::fs::write(dest, INSTALLER_BODY)?;
        Ok(u64::try_from(INSTALLER_BODY.len())?)
    }
}

/// [`Log`] implementation that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<(&'static str, String)>>,
    tasks: Mutex<Vec<(String, TaskStatus)>>,
}

impl RecordingLog {
    fn push(&self, kind: &'static str, msg: &str) {
        lock(&self.lines).push((kind, msg.to_string()));
    }

    fn of_kind(&self, kind: &str) -> Vec<String> {
        lock(&self.lines)
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Warning messages.
    pub fn warnings(&self) -> Vec<String> {
        self.of_kind("warn")
    }

    /// Error messages.
    pub fn errors(&self) -> Vec<String> {
        self.of_kind("error")
    }

    /// Names of the tasks that were recorded, with their status.
    pub fn tasks(&self) -> Vec<(String, TaskStatus)> {
        lock(&self.tasks).clone()
    }

    /// Status recorded for the task called `name`.
    pub fn status_of(&self, name: &str) -> Option<TaskStatus> {
        lock(&self.tasks)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, _message: Option<&str>) {
        lock(&self.tasks).push((name.to_string(), status));
    }
}

/// OS-release descriptor of a supported Ubuntu host.
pub const UBUNTU_OS_RELEASE: &str = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nPRETTY_NAME=\"Ubuntu 24.04 LTS\"\n";

/// A complete simulated machine: temporary home, OS-release file and fake
/// collaborators.
#[derive(Debug)]
pub struct Harness {
    root: tempfile::TempDir,
    /// Shell reported through `$SHELL`.
    pub shell: Option<String>,
    /// Settings used for the run; `os_release_path` points into the
    /// temporary directory.
    pub settings: Settings,
    /// Simulated host.
    pub executor: Arc<FakeExecutor>,
    /// Simulated network.
    pub downloader: Arc<FakeDownloader>,
    /// Captured output.
    pub log: Arc<RecordingLog>,
}

impl Harness {
    /// A machine driven by `executor`, with `os_release` as its descriptor.
    pub fn new(executor: FakeExecutor, os_release: Option<&str>) -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(root.path().join("home")).expect("create home");
        let os_release_path = root.path().join("os-release");
        if let Some(content) = os_release {
            std::fs::write(&os_release_path, content).expect("write os-release");
        }
        Self {
            root,
            shell: Some("/bin/bash".to_string()),
            settings: Settings {
                os_release_path,
                ..Settings::default()
            },
            executor: Arc::new(executor),
            downloader: Arc::new(FakeDownloader::default()),
            log: Arc::new(RecordingLog::default()),
        }
    }

    /// A supported Ubuntu machine with `apt-get` and `sudo`.
    pub fn ubuntu() -> Self {
        Self::new(FakeExecutor::linux(), Some(UBUNTU_OS_RELEASE))
    }

    /// A Mac without Homebrew.
    pub fn macos() -> Self {
        Self::new(FakeExecutor::macos(), None)
    }

    /// The simulated `$HOME`.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Profile written for a bash user.
    pub fn bashrc(&self) -> PathBuf {
        self.home().join(".bashrc")
    }

    /// Session wired to this machine's collaborators.
    pub fn session(&self) -> Session {
        Session {
            settings: Arc::new(self.settings.clone()),
            log: Arc::clone(&self.log) as Arc<dyn Log>,
            executor: Arc::clone(&self.executor) as Arc<dyn Executor>,
            downloader: Arc::clone(&self.downloader) as Arc<dyn Downloader>,
            home: self.home(),
            shell: self.shell.clone(),
            dry_run: false,
        }
    }

    /// Run a full bootstrap.
    pub fn run(&self) -> anyhow::Result<()> {
        bootstrap::bootstrap(self.session())
    }
}
