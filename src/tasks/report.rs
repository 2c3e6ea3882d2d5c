//! Print next steps at the end of a run.

use std::path::Path;

use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Follow-up steps for the user, in order.
#[must_use]
pub fn next_steps(profile: &Path) -> Vec<String> {
    let profile = profile.display();
    vec![
        "Install pyenv: curl -fsSL https://pyenv.run | bash".to_string(),
        format!("Configure pyenv: add its init lines to {profile}"),
        "Install a Python version: pyenv install 3.12 && pyenv global 3.12".to_string(),
        format!("Reload your shell: exec \"$SHELL\" (or source {profile})"),
        "Install Node.js: nvm install --lts".to_string(),
    ]
}

/// Print what the user should do next.
#[derive(Debug)]
pub struct PrintNextSteps;

impl Task for PrintNextSteps {
    fn name(&self) -> &'static str {
        "Next steps"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        for (n, step) in next_steps(&ctx.profile_path()).iter().enumerate() {
            ctx.log.info(&format!("{}. {step}", n + 1));
        }
        Ok(TaskResult::Ok)
    }
}
