//! CLI argument definitions for unikit
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod tags;

pub use core::{Cli, Commands};
pub use tags::TagsCommand;
