//! CLI commands

pub mod list;
pub mod new;
pub mod stats;
