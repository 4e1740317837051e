//! Subcommand modules for the `aracne` binary.

pub mod build;
pub mod consensus;
pub mod dpi;
pub mod marker;
pub mod threshold;

mod utils;
