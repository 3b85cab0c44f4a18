//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ReviewMDB - review and rating service for books, films, and music
#[derive(Parser)]
#[command(name = "reviewmdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Import CSV exports into the database
    Load {
        /// Directory holding the CSV files
        dir: PathBuf,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}
