//! Listening history CLI library.
//!
//! This crate provides the command-line interface over the analysis engine
//! and its SQLite store.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PeaksArgs, SeriesArgs, TopArgs};
pub use config::Config;
