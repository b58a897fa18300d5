//! Command-line interface module.

mod args;
pub mod locate;
pub mod watch;

pub use args::{Cli, Commands};
