// NOTE: Command Organization
//
// Namespaced subcommands (chat / kb / config) rather than flat commands:
// `kb` groups the three knowledge-base maintenance operations that share
// the control-plane client, and `config` groups file management. The chat
// REPL keeps its own slash-commands (/reset, /trace, /citations, /sync,
// /quit) because those act on live session state, not on the service.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agchat")]
#[command(about = "Chat console for managed agent services", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session with the agent
    Chat,

    /// Knowledge-base maintenance
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum KbCommand {
    /// Trigger a re-indexing job and wait for it to finish
    Sync,

    /// Upload local files to the document store, then sync
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Skip the ingestion sync after uploading
        #[arg(long)]
        no_sync: bool,
    },

    /// Fetch a repository/file URL into the document store, then sync
    Fetch {
        /// Repository, folder or file URL
        url: String,

        /// Skip the ingestion sync after fetching
        #[arg(long)]
        no_sync: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (secrets masked)
    Show,

    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
