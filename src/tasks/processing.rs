//! Check-then-apply processing of a single resource inside a task.
use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use devprep::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("unterminated block".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task left things as they were and explains why.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Bring one resource to its desired state.
///
/// `verb` names the action in log lines (`"write"`, `"install"`, ...).
/// Invalid states and skipped applies are reported as warnings and surface
/// as [`TaskResult::Skipped`]; errors from `apply` propagate.
///
/// # Errors
///
/// Returns an error if the state cannot be read or the change cannot be
/// applied.
pub fn process_resource<R: Resource>(ctx: &Context, resource: &R, verb: &str) -> Result<TaskResult> {
    let desc = resource.description();
    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log.info(&format!("already up to date: {desc}"));
            Ok(TaskResult::Ok)
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            Ok(TaskResult::Skipped(reason))
        }
        state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = state {
                    ctx.log.debug(&format!("current {desc}:\n{current}"));
                    format!("would {verb} {desc} (replacing outdated block)")
                } else {
                    format!("would {verb}: {desc}")
                };
                ctx.log.dry_run(&msg);
                return Ok(TaskResult::DryRun);
            }
            match resource.apply()? {
                ResourceChange::Applied => {
                    ctx.log.info(&format!("{verb}: {desc}"));
                    Ok(TaskResult::Ok)
                }
                ResourceChange::AlreadyCorrect => Ok(TaskResult::Ok),
                ResourceChange::Skipped { reason } => {
                    ctx.log.warn(&format!("did not {verb} {desc}: {reason}"));
                    Ok(TaskResult::Skipped(reason))
                }
            }
        }
    }
}
