//! CLI argument definitions for tools-cli.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Version string with the build's git commit and timestamp.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TOOLS_GIT_COMMIT"),
    " ",
    env!("TOOLS_BUILD_TIMESTAMP"),
    ")"
);

/// tools-cli - Adding other web UIs to cockpit.
///
/// Without a command, prints every tool as JSON.
#[derive(Parser, Debug)]
#[command(name = "tools-cli")]
#[command(author, version, long_version = LONG_VERSION, about = "Commandline interface for cockpit tools", long_about = None)]
#[command(disable_version_flag = true)]
#[command(after_help = "<options> may be entered as a single JSON string or as <icon> <ref>:\n    tools-cli add tool1 '{\"ref\": \"http://www.example.com\"}'\n    tools-cli add tool1 tool1.png http://www.example.com\nJSON options:\n    icon: icon as file location or URL\n    ref:  link to webpage of tool")]
pub struct Cli {
    /// Use <PATH> as the tools file instead of /etc/cockpit-tools.xml.
    /// Can also be set via COCKPIT_TOOLS_FILE environment variable.
    #[arg(short = 'f', long = "file", global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add or edit tool <name> with <options>
    ///
    /// Empty option values leave the stored value unchanged.
    Add {
        /// Tool name
        name: String,

        /// JSON object with `icon`/`ref`, or `<icon> <ref>`
        #[arg(required = true, num_args = 1..=2, value_name = "OPTIONS")]
        options: Vec<String>,
    },

    /// Delete tool <name>
    #[command(visible_alias = "delete")]
    Del {
        /// Tool name
        name: String,
    },

    /// Show options for tool <name> as JSON
    #[command(visible_alias = "show")]
    Shw {
        /// Tool name
        name: String,
    },

    /// List tools and options
    #[command(visible_alias = "list")]
    Lst,

    /// Show where the tools file is and how its location was chosen
    Where,
}
