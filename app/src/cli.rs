use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "facebot")]
#[command(author, version, about = "Discovers photos, swaps faces and republishes them with credit")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "FACEBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Crawl, ingest and publish until stopped (the default)
    Run(RunArgs),

    /// Return every record to Available
    ResetStore,

    /// Show record counts
    Stats,

    /// Show one stored record
    Show {
        /// Media ID
        id: String,
    },

    /// Replace faces in a local image and write the result
    TestImage {
        /// Input image
        input: PathBuf,

        /// Output path (defaults to <output_dir>/<input stem>.jpeg)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace faces in every image of a directory
    TestDir {
        /// Directory of input images
        dir: PathBuf,
    },

    /// Validate configuration
    Validate {
        /// Also require the face service to answer its health check
        #[arg(long)]
        check: bool,
    },

    /// Write a default config file (to --config or the XDG config dir)
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Overrides for the daemon; each wins over the config file.
#[derive(Debug, Default, clap::Args)]
pub struct RunArgs {
    /// Publish once immediately and exit
    #[arg(long)]
    pub post_now: bool,

    /// Publish every N seconds
    #[arg(long, value_name = "SECS")]
    pub post_interval: Option<u64>,

    /// Publish daily at this local time (HH:MM or HH:MM:SS); repeatable
    #[arg(long = "post-time", value_name = "TIME")]
    pub post_times: Vec<String>,

    /// Upload rendered images
    #[arg(long)]
    pub upload: bool,

    /// Serve the admin endpoints on this port
    #[arg(long)]
    pub http_port: Option<u16>,
}
