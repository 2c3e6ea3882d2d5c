//! Install nvm.

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::error::BootstrapError;
use crate::net::fetch_script;

fn install_failed(reason: String) -> BootstrapError {
    BootstrapError::AuxiliaryInstallFailed {
        tool: "nvm".to_string(),
        reason,
    }
}

/// Download and run the nvm installer, then load its environment.
///
/// The installer runs with `PROFILE=/dev/null` so it never edits shell
/// profiles itself; the profile block is written by
/// [`ConfigureShellProfile`](super::shell_profile::ConfigureShellProfile).
#[derive(Debug)]
pub struct InstallNvm;

impl Task for InstallNvm {
    fn name(&self) -> &'static str {
        "Install nvm"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let url = ctx.settings.nvm_installer_url();
        let nvm_dir = ctx.nvm_dir();

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would download {url} and run it with NVM_DIR={}",
                nvm_dir.display()
            ));
            return Ok(TaskResult::DryRun);
        }

        ctx.log.info(&format!(
            "downloading nvm {} installer from {url}",
            ctx.settings.nvm_version
        ));
        let script =
            fetch_script(&*ctx.downloader, &url).map_err(|e| install_failed(format!("{e:#}")))?;
        ctx.log.debug(&format!(
            "nvm installer: {} bytes, sha256 {}",
            script.size, script.sha256
        ));

        // The installer refuses to run when NVM_DIR names a missing directory.
        std::fs::create_dir_all(&nvm_dir)
            .with_context(|| format!("create {}", nvm_dir.display()))?;

        let nvm_dir_str = nvm_dir.to_string_lossy().into_owned();
        let path = script.path().to_string_lossy().into_owned();
        let result = ctx.executor.run_interactive(
            "bash",
            &[&path],
            &[("PROFILE", "/dev/null"), ("NVM_DIR", &nvm_dir_str)],
        )?;
        if !result.success {
            return Err(install_failed(format!(
                "installer ended with {}",
                result.exit_description()
            ))
            .into());
        }

        ctx.executor.set_env("NVM_DIR", &nvm_dir_str);
        let nvm_sh = nvm_dir.join("nvm.sh");
        if !nvm_sh.is_file() {
            return Err(install_failed(format!(
                "{} was not created by the installer",
                nvm_sh.display()
            ))
            .into());
        }

        ctx.log.info(&format!("nvm installed in {}", nvm_dir.display()));
        Ok(TaskResult::Ok)
    }
}
