//! Install the system build dependencies.

use anyhow::Result;

use super::privileges::running_as_root;
use super::{Context, Task, TaskResult};
use crate::config::packages::PackageSet;
use crate::error::BootstrapError;
use crate::resources::Applicable as _;
use crate::resources::package::{PackageManager, PackageSetResource};

/// Refresh the package index and install the resolved package set.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let manager = PackageManager::for_family(ctx.platform.family);
        let set = PackageSet::resolve(ctx.platform.family, &ctx.settings.extra_packages);

        if !ctx.executor.which(manager.program()) && !ctx.dry_run {
            return Err(BootstrapError::PackageManagerMissing {
                manager: manager.to_string(),
            }
            .into());
        }

        let elevate = manager.requires_root() && !running_as_root(&*ctx.executor);
        let resource = PackageSetResource::new(manager, &set, elevate, &*ctx.executor);

        if ctx.dry_run {
            for command in resource.commands() {
                ctx.log.dry_run(&format!("would run: {command}"));
            }
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info(&format!("installing {}", resource.description()));
        ctx.log.debug(&format!("packages: {}", set.names().join(" ")));
        resource.apply()?;
        ctx.log.info(&format!("{} packages installed", set.len()));
        Ok(TaskResult::Ok)
    }
}
