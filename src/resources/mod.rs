//! Idempotent resource primitives (check + apply pattern).
pub mod helpers;
pub mod package;
pub mod profile_block;

use anyhow::Result;

/// Something a task can bring to its desired state in one step.
pub trait Applicable {
    /// Human-readable description, used in log lines and dry-run output.
    fn description(&self) -> String;

    /// Bring the resource to its desired state.
    ///
    /// Implementations re-check the current state themselves, so calling
    /// `apply` on a resource that is already correct is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made, e.g. a file cannot be
    /// written or a package command fails.
    fn apply(&self) -> Result<ResourceChange>;
}

/// What [`Resource::current_state`] found.
///
/// # Examples
///
/// ```
/// use devprep::resources::ResourceState;
///
/// let stale = ResourceState::Incorrect { current: "export NVM_DIR=/old".into() };
/// let broken = ResourceState::Invalid { reason: "unterminated block".into() };
///
/// assert_ne!(stale, ResourceState::Missing);
/// assert_ne!(broken, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Not present at all.
    Missing,
    /// Present and already as desired.
    Correct,
    /// Present with different content.
    Incorrect {
        /// What is there now.
        current: String,
    },
    /// Present but in a shape that must not be modified automatically.
    Invalid {
        /// Why it is left alone.
        reason: String,
    },
}

/// Outcome of [`Applicable::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// A change was made.
    Applied,
    /// Nothing needed to change.
    AlreadyCorrect,
    /// The resource was left alone.
    Skipped {
        /// Why it was left alone.
        reason: String,
    },
}

/// A resource whose state can be inspected before it is applied.
///
/// [`process_resource`](crate::tasks::process_resource) reads the state
/// first, so dry runs can report what would change and invalid states are
/// never applied.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined, for example when
    /// the backing file exists but cannot be read.
    fn current_state(&self) -> Result<ResourceState>;
}
