//! Frontend components
//!
//! Command line and configuration file handling.

pub mod cli;
pub mod config;

pub use cli::{main as cli_main, Cli};
pub use config::Config;
