//! CLI interface for Lino
//!
//! Command-line interface using clap's derive API. The CLI is a thin driver
//! over the conversation engine: it renders one assistant turn per user turn
//! and leaves rich presentation to dedicated front ends.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lino conversational task assistant
///
/// Chats about your project, remembers what you tell it, and manages the
/// team's issue tracker when asked.
#[derive(Parser, Debug)]
#[command(name = "lino")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive chat session
    Chat,

    /// Check configuration, credentials, and backend reachability
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,

    /// Print the effective configuration
    Show,
}
