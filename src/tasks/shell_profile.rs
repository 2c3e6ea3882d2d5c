//! Wire nvm into the user's shell profile.

use anyhow::Result;

use super::{Context, Task, TaskResult, process_resource};
use crate::resources::profile_block::{ProfileBlockResource, ShellKind};

/// Write the nvm loader block into the user's shell profile.
#[derive(Debug)]
pub struct ConfigureShellProfile;

impl Task for ConfigureShellProfile {
    fn name(&self) -> &'static str {
        "Configure shell profile"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let kind = ctx.shell_kind();
        if kind == ShellKind::Other {
            ctx.log.warn(&format!(
                "unrecognized shell '{}'; using {}",
                ctx.shell.as_deref().unwrap_or("<unset>"),
                ctx.profile_path().display()
            ));
        } else {
            ctx.log.debug(&format!("detected {kind} shell"));
        }

        let resource = ProfileBlockResource::new(ctx.profile_path(), kind.nvm_snippet());
        process_resource(ctx, &resource, "write")
    }
}
