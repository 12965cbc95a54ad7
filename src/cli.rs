//! Command-line surface of the `jukelink` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Config file; defaults to config.toml, then config.default.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Queue a search and play until the queue runs dry or Ctrl-C
    Play {
        /// Free text search, e.g. "daft punk around the world"
        query: String,

        /// Let the chat backend expand the query into several songs
        #[arg(long)]
        ai: bool,

        /// Name the queued entries are attributed to
        #[arg(long, default_value = "cli")]
        user: String,
    },

    /// Print every Opus frame of a local WebM file
    Demux {
        path: PathBuf,

        /// Expected EBML document type
        #[arg(long, default_value = "webm")]
        doc_type: String,

        /// Stop after this many frames
        #[arg(long)]
        limit: Option<u64>,
    },
}
