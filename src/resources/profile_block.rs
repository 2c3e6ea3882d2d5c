//! Marker-delimited configuration block inside a shell profile file.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::helpers::fs::{append, ensure_parent_dir, replace_atomically};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// First line of the managed block.
pub const BEGIN_MARKER: &str = "# >>> devprep nvm >>>";
/// Last line of the managed block.
pub const END_MARKER: &str = "# <<< devprep nvm <<<";

/// Interactive shell family, derived from the base name of `$SHELL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// GNU bash.
    Bash,
    /// Z shell.
    Zsh,
    /// fish.
    Fish,
    /// Anything else, including an unset `$SHELL`.
    Other,
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bash => write!(f, "bash"),
            Self::Zsh => write!(f, "zsh"),
            Self::Fish => write!(f, "fish"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl ShellKind {
    /// Classify a `$SHELL` value such as `/usr/bin/zsh`.
    #[must_use]
    pub fn from_shell_var(shell: Option<&str>) -> Self {
        let name = shell
            .map(Path::new)
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        match name {
            "bash" => Self::Bash,
            "zsh" => Self::Zsh,
            "fish" => Self::Fish,
            _ => Self::Other,
        }
    }

    /// Profile file read by this shell, relative to `home`.
    #[must_use]
    pub fn profile_path(self, home: &Path) -> PathBuf {
        match self {
            Self::Bash => home.join(".bashrc"),
            Self::Zsh => home.join(".zshrc"),
            Self::Fish => home.join(".config").join("fish").join("config.fish"),
            Self::Other => home.join(".profile"),
        }
    }

    /// Lines that load nvm in this shell, without markers.
    #[must_use]
    pub const fn nvm_snippet(self) -> &'static str {
        match self {
            Self::Bash => concat!(
                "export NVM_DIR=\"$HOME/.nvm\"\n",
                "[ -s \"$NVM_DIR/nvm.sh\" ] && \\. \"$NVM_DIR/nvm.sh\"\n",
                "[ -s \"$NVM_DIR/bash_completion\" ] && \\. \"$NVM_DIR/bash_completion\"",
            ),
            Self::Zsh | Self::Other => concat!(
                "export NVM_DIR=\"$HOME/.nvm\"\n",
                "[ -s \"$NVM_DIR/nvm.sh\" ] && \\. \"$NVM_DIR/nvm.sh\"",
            ),
            // nvm itself is POSIX-only; fish users load it through a wrapper
            // such as bass, which needs NVM_DIR exported.
            Self::Fish => "set -gx NVM_DIR \"$HOME/.nvm\"",
        }
    }
}

/// Where the managed block sits in a file.
#[derive(Debug, PartialEq, Eq)]
enum Location {
    Absent,
    /// Byte range covering both marker lines and their line endings.
    Found { start: usize, end: usize },
    /// Begin marker on this 1-based line with no end marker after it.
    Unterminated { line: usize },
}

fn locate(content: &[u8]) -> Location {
    let mut offset = 0;
    let mut begin: Option<(usize, usize)> = None;
    for (idx, line) in content.split_inclusive(|b| *b == b'\n').enumerate() {
        let trimmed = line.trim_ascii();
        match begin {
            None if trimmed == BEGIN_MARKER.as_bytes() => begin = Some((offset, idx + 1)),
            Some((start, _)) if trimmed == END_MARKER.as_bytes() => {
                return Location::Found {
                    start,
                    end: offset + line.len(),
                };
            }
            _ => {}
        }
        offset += line.len();
    }
    begin.map_or(Location::Absent, |(_, line)| Location::Unterminated { line })
}

/// A marker-delimited block in a profile file.
///
/// The block is appended when absent, left alone when identical, and
/// replaced in place when its body differs.  A begin marker without an end
/// marker is never touched.
///
/// Profiles are handled as raw bytes, so content outside the block keeps
/// whatever encoding it had.
#[derive(Debug, Clone)]
pub struct ProfileBlockResource {
    /// Profile file to patch.
    pub path: PathBuf,
    body: String,
}

impl ProfileBlockResource {
    /// Create a block resource for `path` whose body is `body`.
    #[must_use]
    pub fn new(path: PathBuf, body: &str) -> Self {
        Self {
            path,
            body: body.trim_end_matches('\n').to_string(),
        }
    }

    /// The full block, markers included, ending in a newline.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{BEGIN_MARKER}\n{}\n{END_MARKER}\n", self.body)
    }

    fn read(&self) -> Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }

    /// Whether `existing`, a located block, already equals the rendered one.
    fn matches(&self, existing: &[u8]) -> bool {
        existing.trim_ascii_end() == self.render().trim_end().as_bytes()
    }
}

impl Applicable for ProfileBlockResource {
    fn description(&self) -> String {
        format!("nvm block in {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let content = self.read()?;
        let Some(content) = content else {
            ensure_parent_dir(&self.path)?;
            append(&self.path, &self.render())?;
            return Ok(ResourceChange::Applied);
        };

        match locate(&content) {
            Location::Absent => {
                let separator = if content.is_empty() {
                    ""
                } else if content.ends_with(b"\n") {
                    "\n"
                } else {
                    "\n\n"
                };
                append(&self.path, &format!("{separator}{}", self.render()))?;
                Ok(ResourceChange::Applied)
            }
            Location::Found { start, end } => {
                let existing = content.get(start..end).unwrap_or_default();
                if self.matches(existing) {
                    return Ok(ResourceChange::AlreadyCorrect);
                }
                let mut updated = Vec::with_capacity(content.len());
                updated.extend_from_slice(content.get(..start).unwrap_or_default());
                updated.extend_from_slice(self.render().as_bytes());
                updated.extend_from_slice(content.get(end..).unwrap_or_default());
                replace_atomically(&self.path, &updated)?;
                Ok(ResourceChange::Applied)
            }
            Location::Unterminated { line } => Ok(ResourceChange::Skipped {
                reason: unterminated_reason(&self.path, line),
            }),
        }
    }
}

impl Resource for ProfileBlockResource {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(content) = self.read()? else {
            return Ok(ResourceState::Missing);
        };
        Ok(match locate(&content) {
            Location::Absent => ResourceState::Missing,
            Location::Found { start, end } => {
                let existing = content.get(start..end).unwrap_or_default();
                if self.matches(existing) {
                    ResourceState::Correct
                } else {
                    ResourceState::Incorrect {
                        current: String::from_utf8_lossy(existing).into_owned(),
                    }
                }
            }
            Location::Unterminated { line } => ResourceState::Invalid {
                reason: unterminated_reason(&self.path, line),
            },
        })
    }
}

fn unterminated_reason(path: &Path, line: usize) -> String {
    format!(
        "{}:{line}: '{BEGIN_MARKER}' has no matching '{END_MARKER}'",
        path.display()
    )
}
