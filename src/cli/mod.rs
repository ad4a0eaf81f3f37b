//! Command-line interface module.

mod args;
pub mod net;
pub mod serve;

pub use args::{Cli, Commands};
