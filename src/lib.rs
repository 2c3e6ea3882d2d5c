//! Development machine bootstrapper.
//!
//! Prepares a Debian/Ubuntu or macOS host for Python and Node work:
//! installs the build dependencies pyenv needs, makes sure Homebrew is
//! present on macOS, installs nvm and wires it into the user's shell
//! profile, then verifies the result.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: settings file and package set resolution
//! - **[`resources`]**: idempotent `check + apply` primitives (package sets, profile blocks)
//! - **[`tasks`]**: named units of work, run in a fixed order
//! - **[`commands`]**: top-level orchestration of a run
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod net;
pub mod platform;
pub mod resources;
pub mod tasks;
