//! CLI module for the bgremover library
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{is_batch_input, main, Cli, CliModel};
