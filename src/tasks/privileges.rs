//! Check that the run has the privileges it needs.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::error::BootstrapError;
use crate::exec::Executor;

/// Whether the effective user is root.
///
/// Any failure to run `id -u` counts as "not root".
#[must_use]
pub fn running_as_root(executor: &dyn Executor) -> bool {
    executor
        .run_unchecked("id", &["-u"])
        .is_ok_and(|r| r.success && r.stdout.trim() == "0")
}

/// Confirm that `sudo` will work before any package command needs it.
#[derive(Debug)]
pub struct CheckPrivileges;

impl Task for CheckPrivileges {
    fn name(&self) -> &'static str {
        "Check privileges"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_linux()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if running_as_root(&*ctx.executor) {
            ctx.log.info("running as root; sudo not needed");
            return Ok(TaskResult::Ok);
        }

        if !ctx.executor.which("sudo") {
            return Err(BootstrapError::PrivilegeDenied {
                reason: "not running as root and sudo is not installed".to_string(),
            }
            .into());
        }

        let cached = ctx.executor.run_unchecked("sudo", &["-n", "true"])?;
        if cached.success {
            ctx.log.info("sudo credentials are cached");
            return Ok(TaskResult::Ok);
        }

        if ctx.dry_run {
            ctx.log.dry_run("would prompt for the sudo password");
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info("administrator privileges are needed to install packages");
        let result = ctx.executor.run_interactive("sudo", &["-v"], &[])?;
        if !result.success {
            return Err(BootstrapError::PrivilegeDenied {
                reason: format!("sudo -v ended with {}", result.exit_description()),
            }
            .into());
        }
        ctx.log.debug("sudo credentials validated");
        Ok(TaskResult::Ok)
    }
}
