//! larabox: drive a containerized Laravel development environment from the host.
//!
//! The binary parses flags into an ordered list of [`Action`]s and runs them against an
//! immutable [`Config`]. Every external command goes through the [`Runner`] seam, so dry
//! runs and tests observe the exact argument lists without touching docker or git.

mod color;
pub use color::*;

pub mod actions;
pub mod config;
pub mod docker;
pub mod doctor;
pub mod entrypoint;
pub mod envfile;
mod errors;
pub mod git;
pub mod logging;
pub mod ready;
pub mod routes;
pub mod ui;
pub mod util;

pub use actions::{run_actions, Action, Context, Options};
pub use config::{Config, Overrides, ServerPort};
pub use errors::{
    display_for_error, exit_code_for_error, exit_code_for_io_error, LaraboxError, Result,
};
pub use ui::warn_print;
pub use util::{DryRunService, ExecService, Runner};
