// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - download: find matching links on a page and download them in parallel
// - list: only find and print the links (nothing is written to disk)
//
// The flags map one-to-one onto HarvestConfig, see `Cli::config()`.
// =============================================================================

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{HarvestConfig, DEFAULT_OUTPUT_DIR, DEFAULT_SUFFIX};

#[derive(Parser, Debug)]
#[command(
    name = "link-harvest",
    version,
    about = "Scan a web page for file links and download them in parallel",
    long_about = "link-harvest fetches one HTML page (typically a directory listing), picks out \
                  every link whose path ends with a given suffix, and downloads those files \
                  with a fixed number of parallel workers."
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides this
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every matching file linked from a page
    ///
    /// Example: link-harvest download https://example.com/textures/ -o textures -w 10
    Download {
        #[command(flatten)]
        scan: ScanArgs,

        /// Directory to save files into (created if missing)
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Number of parallel downloads
        #[arg(short, long, default_value = "5")]
        workers: NonZeroUsize,

        /// Timeout in seconds for each file download
        #[arg(long = "timeout", default_value_t = 30)]
        timeout_secs: u64,

        /// Output results in JSON format instead of progress lines
        #[arg(long)]
        json: bool,
    },

    /// List matching links on a page without downloading anything
    ///
    /// Example: link-harvest list https://example.com/textures/ --suffix .png
    List {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output the links as a JSON array
        #[arg(long)]
        json: bool,
    },
}

// Arguments shared by both subcommands
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Page to scan for links (e.g., https://example.com/files/)
    pub page_url: String,

    /// Only keep links whose path ends with this (case-insensitive)
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Timeout in seconds for fetching the page
    #[arg(long = "page-timeout", default_value_t = 10)]
    pub page_timeout_secs: u64,
}

impl Commands {
    pub fn scan(&self) -> &ScanArgs {
        match self {
            Commands::Download { scan, .. } | Commands::List { scan, .. } => scan,
        }
    }

    // Builds the runtime config from the flags; download-only settings keep
    // their defaults for `list`
    pub fn config(&self) -> HarvestConfig {
        let scan = self.scan();
        let mut config = HarvestConfig {
            page_timeout: Duration::from_secs(scan.page_timeout_secs),
            suffix: scan.suffix.clone(),
            ..HarvestConfig::default()
        };

        if let Commands::Download {
            workers,
            timeout_secs,
            ..
        } = self
        {
            config.pool_size = *workers;
            config.download_timeout = Duration::from_secs(*timeout_secs);
        }

        config
    }
}
