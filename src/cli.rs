//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use ballchasing::api::{PlayerIdentification, Playlist, TeamIdentification, Visibility};
use clap::{Parser, Subcommand};

/// Command-line access to the ballchasing.com replay API.
///
/// The API key is read from BALLCHASING_API_KEY, a `.env` file or a
/// ballchasing.json config file.
#[derive(Parser, Debug)]
#[command(name = "ballchasing")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the API key and show the account tier
    Ping,

    /// Search replays
    Search {
        #[arg(long)]
        uploader: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// May be repeated
        #[arg(long)]
        playlist: Vec<Playlist>,

        /// May be repeated
        #[arg(long)]
        player_name: Vec<String>,

        /// Only replays directly in this group
        #[arg(long)]
        group: Option<String>,

        /// Maximum number of replays
        #[arg(short = 'n', long, default_value_t = 50)]
        count: usize,

        /// Fetch the full record of every replay
        #[arg(long)]
        deep: bool,
    },

    /// Show one replay with stats
    Replay { id: String },

    /// Upload a replay file
    Upload {
        file: PathBuf,

        #[arg(long, default_value = "public")]
        visibility: Visibility,

        /// Add the replay to this group
        #[arg(long)]
        group: Option<String>,
    },

    /// Delete a replay
    DeleteReplay { id: String },

    /// Show one group with stats
    Group { id: String },

    /// List groups
    Groups {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        creator: Option<String>,

        /// Only children of this group
        #[arg(long)]
        parent: Option<String>,

        #[arg(short = 'n', long, default_value_t = 50)]
        count: usize,
    },

    /// Create a group
    CreateGroup {
        name: String,

        #[arg(long, default_value = "by-id")]
        player_identification: PlayerIdentification,

        #[arg(long, default_value = "by-distinct-players")]
        team_identification: TeamIdentification,

        #[arg(long)]
        parent: Option<String>,
    },

    /// Delete a group and its children
    DeleteGroup { id: String },

    /// Download a replay file
    Download {
        id: String,

        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Download every replay of a group tree
    DownloadGroup {
        id: String,

        #[arg(default_value = ".")]
        folder: PathBuf,

        /// Put all replays in one directory instead of mirroring the tree
        #[arg(long)]
        flat: bool,
    },

    /// List map codes and names
    Maps,
}
