//! CLI subcommands.

pub mod config;
pub mod kill;
pub mod launch;
pub mod tree;

mod output;
