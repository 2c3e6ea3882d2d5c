//! Verify the installed tools.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::exec::Executor;

/// Executables that should resolve once the run has finished.
pub const VERIFIED_TOOLS: &[&str] = &["gcc", "make", "curl", "wget", "git"];

/// Availability of one verified tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Executable name.
    pub tool: &'static str,
    /// Whether it resolved on PATH.
    pub found: bool,
}

/// Look up every tool in [`VERIFIED_TOOLS`], using the executor's PATH.
#[must_use]
pub fn check_tools(executor: &dyn Executor) -> Vec<ToolStatus> {
    VERIFIED_TOOLS
        .iter()
        .map(|&tool| ToolStatus {
            tool,
            found: executor.which(tool),
        })
        .collect()
}

/// Report which key tools are available.  Misses are warnings only.
#[derive(Debug)]
pub struct VerifyTools;

impl Task for VerifyTools {
    fn name(&self) -> &'static str {
        "Verify tools"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let statuses = check_tools(&*ctx.executor);
        for status in &statuses {
            if status.found {
                ctx.log.info(&format!("found {}", status.tool));
            } else {
                ctx.log.warn(&format!("{} not found on PATH", status.tool));
            }
        }
        let found = statuses.iter().filter(|p| p.found).count();
        ctx.log
            .debug(&format!("{found}/{} tools available", statuses.len()));
        Ok(TaskResult::Ok)
    }
}
