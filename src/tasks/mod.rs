//! Named tasks, run in a fixed order, that make up a bootstrap run.
pub mod context;
pub mod homebrew;
pub mod nvm;
pub mod packages;
pub mod privileges;
mod processing;
pub mod report;
pub mod shell_profile;
pub mod verify;

pub use context::{Context, Session};
pub use processing::{TaskResult, process_resource};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task should run on the current platform.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails; the run stops there.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Every task of a bootstrap run, in execution order.
#[must_use]
pub fn all_bootstrap_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(privileges::CheckPrivileges),
        Box::new(homebrew::EnsureHomebrew),
        Box::new(packages::InstallPackages),
        Box::new(nvm::InstallNvm),
        Box::new(shell_profile::ConfigureShellProfile),
        Box::new(verify::VerifyTools),
        Box::new(report::PrintNextSteps),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Returns the task's error after recording it as failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            Ok(())
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            Ok(())
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
            Ok(())
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}

/// Execute `tasks` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the error of the first task that fails.
pub fn run_all(tasks: &[Box<dyn Task>], ctx: &Context) -> Result<()> {
    for task in tasks {
        execute(task.as_ref(), ctx)?;
    }
    Ok(())
}
