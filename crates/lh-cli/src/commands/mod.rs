//! CLI subcommand implementations.

pub mod clear;
pub mod import;
pub mod peaks;
pub mod series;
pub mod show;
pub mod status;
pub mod summary;
pub mod top;
pub mod util;
