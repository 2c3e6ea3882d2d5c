//! The bootstrap command: runs every task in order.

use std::sync::Arc;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Settings;
use crate::error::BootstrapError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::net::{Downloader, HttpDownloader};
use crate::platform::PlatformInfo;
use crate::tasks::{self, Context, Session};

/// Name of the command, used for the log file.
pub const COMMAND: &str = "bootstrap";

/// Run the bootstrap command against the real system.
///
/// The task summary is printed whether or not the run succeeds.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, `$HOME` is unset,
/// platform detection fails, or any task fails.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    let result = prepare(cli, log).and_then(bootstrap);
    log.print_summary();
    result
}

fn prepare(cli: &Cli, log: &Arc<Logger>) -> Result<Session> {
    let log = Arc::clone(log) as Arc<dyn Log>;

    let settings = Settings::load(cli.config.as_deref())
        .inspect_err(|e| log.error(&format!("{e:#}")))?;
    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor::new());
    let downloader: Arc<dyn Downloader> =
        Arc::new(HttpDownloader::new(settings.download_timeout()));

    Session::from_env(
        Arc::new(settings),
        Arc::clone(&log),
        executor,
        downloader,
        cli.dry_run,
    )
    .inspect_err(|e| log.error(&format!("{e:#}")))
}

/// Report an external interruption and return the exit code to use.
///
/// Called from the Ctrl-C handler, which then exits immediately.
pub fn interrupted(log: &dyn Log) -> i32 {
    let err = BootstrapError::Interrupted;
    log.error(&err.to_string());
    err.exit_code()
}

/// Detect the platform and run every bootstrap task in order.
///
/// # Errors
///
/// Returns the detection error, or the error of the first failing task.
pub fn bootstrap(session: Session) -> Result<()> {
    let log = Arc::clone(&session.log);

    let version = option_env!("DEVPREP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("devprep {version}"));
    if session.dry_run {
        log.info("dry run: no changes will be made");
    }

    log.stage("Detecting platform");
    let platform = PlatformInfo::detect(&*session.executor, &session.settings.os_release_path)
        .inspect_err(|e| log.error(&format!("{e:#}")))?;
    log.info(&format!("platform: {}", platform.pretty_name));
    if !platform.supported {
        log.warn(&format!(
            "{} ({}) is not a tested distribution; continuing anyway",
            platform.pretty_name, platform.distribution_id
        ));
    }

    let ctx = Context::new(platform, session);
    log.debug(&format!(
        "home: {}, shell: {}",
        ctx.home.display(),
        ctx.shell.as_deref().unwrap_or("(unset)")
    ));

    tasks::run_all(&tasks::all_bootstrap_tasks(), &ctx)
}
