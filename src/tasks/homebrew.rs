//! Ensure Homebrew is installed on macOS.

use std::io::IsTerminal as _;

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::error::BootstrapError;
use crate::exec::Executor;
use crate::net::fetch_script;

/// Where the Homebrew installer puts `brew` on Apple silicon and Intel Macs.
pub const BREW_CANDIDATES: &[&str] = &["/opt/homebrew/bin/brew", "/usr/local/bin/brew"];

/// Install Homebrew when `brew` is not on PATH.
#[derive(Debug)]
pub struct EnsureHomebrew;

impl Task for EnsureHomebrew {
    fn name(&self) -> &'static str {
        "Ensure Homebrew"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_macos()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.executor.which("brew") {
            ctx.log.info("Homebrew is already installed");
            return Ok(TaskResult::Ok);
        }

        let url = &ctx.settings.homebrew_install_url;
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would download {url} and run it with bash"));
            return Ok(TaskResult::DryRun);
        }

        let install_failed = |reason: String| BootstrapError::PackageManagerInstallFailed {
            manager: "brew".to_string(),
            reason,
        };

        ctx.log.info(&format!("downloading Homebrew installer from {url}"));
        let script = fetch_script(&*ctx.downloader, url)
            .map_err(|e| install_failed(format!("{e:#}")))?;
        ctx.log.debug(&format!(
            "Homebrew installer: {} bytes, sha256 {}",
            script.size, script.sha256
        ));

        let mut env = Vec::new();
        if !std::io::stdin().is_terminal() {
            env.push(("NONINTERACTIVE", "1"));
        }
        let path = script.path().to_string_lossy().into_owned();
        let result = ctx.executor.run_interactive("bash", &[&path], &env)?;
        if !result.success {
            return Err(install_failed(format!(
                "installer ended with {}",
                result.exit_description()
            ))
            .into());
        }

        match load_shellenv(&*ctx.executor) {
            Some(brew) => ctx.log.debug(&format!("loaded environment from {brew}")),
            None => ctx.log.warn("could not locate brew to load its environment"),
        }

        if !ctx.executor.which("brew") {
            return Err(BootstrapError::PackageManagerMissing {
                manager: "brew".to_string(),
            }
            .into());
        }
        ctx.log.info("Homebrew installed");
        Ok(TaskResult::Ok)
    }
}

/// Run `brew shellenv` from the first candidate location that answers and
/// apply its exports to the executor.  Returns the `brew` that was used.
fn load_shellenv(executor: &dyn Executor) -> Option<&'static str> {
    for brew in BREW_CANDIDATES {
        let Ok(result) = executor.run_unchecked(brew, &["shellenv", "bash"]) else {
            continue;
        };
        if !result.success {
            continue;
        }
        for (key, value) in parse_shellenv(&result.stdout, |name| std::env::var(name).ok()) {
            executor.set_env(&key, &value);
        }
        return Some(*brew);
    }
    None
}

/// Extract `KEY=value` assignments from POSIX `brew shellenv` output.
///
/// Lines that are not plain assignments (`fpath[...]`, conditional
/// `MANPATH` updates) are ignored.  `${NAME+word}`, `${NAME-word}` and
/// `${NAME:-word}` are expanded with `lookup`.
pub fn parse_shellenv(
    output: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    for line in output.lines() {
        for statement in line.split(';') {
            let statement = statement.trim();
            let assignment = statement.strip_prefix("export ").unwrap_or(statement);
            let Some((key, raw)) = assignment.split_once('=') else {
                continue;
            };
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                continue;
            }
            let raw = raw.trim();
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            vars.push((key.to_string(), expand(unquoted, &lookup)));
        }
    }
    vars
}

fn expand(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(rest.get(..start).unwrap_or_default());
        let after = rest.get(start + 2..).unwrap_or_default();
        let Some(close) = after.find('}') else {
            out.push_str(rest.get(start..).unwrap_or_default());
            return out;
        };
        let inner = after.get(..close).unwrap_or_default();
        out.push_str(&expand_parameter(inner, lookup));
        rest = after.get(close + 1..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}

fn expand_parameter(inner: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let name_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let (name, op) = inner.split_at(name_len);
    let value = lookup(name);
    let current = value.as_deref();
    let substitute = |word: &str| word.replace(&format!("${name}"), current.unwrap_or(""));
    if let Some(word) = op.strip_prefix(":-") {
        match current {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => substitute(word),
        }
    } else if let Some(word) = op.strip_prefix('+') {
        if current.is_some() {
            substitute(word)
        } else {
            String::new()
        }
    } else if let Some(word) = op.strip_prefix('-') {
        current.map_or_else(|| substitute(word), str::to_string)
    } else {
        current.unwrap_or_default().to_string()
    }
}
