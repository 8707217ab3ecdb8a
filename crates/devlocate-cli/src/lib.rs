//! DevLocate CLI library.
//!
//! Subcommand handlers, output renderers and terminal styling for the
//! `devlocate-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
