// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Fetch the page and find the matching links
// 3. Download them with a fixed-size worker pool, printing each result
// 4. Exit with proper code (0 = all downloaded, 1 = some failed, 2 = error)
// =============================================================================

mod cli;
mod client;
mod config;
mod discover;
mod download;
mod error;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::HarvestConfig;
use discover::LinkDiscoverer;
use download::{plan_tasks, BatchReport, DownloadResult, Downloader, Outcome, Summary};
use url::Url;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for --json
// Priority: RUST_LOG env var > -v flags > default (warn)
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every file downloaded (or nothing to download)
//   Ok(1) = at least one link was skipped or failed to download
//   Err = page couldn't be fetched, or output directory couldn't be created
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.command.config();
    let client = client::build_client()?;

    match cli.command {
        Commands::Download {
            scan, output, json, ..
        } => handle_download(client, config, &scan.page_url, &output, json).await,
        Commands::List { scan, json } => handle_list(client, config, &scan.page_url, json).await,
    }
}

async fn handle_download(
    client: reqwest::Client,
    config: HarvestConfig,
    page_url: &str,
    output: &Path,
    json: bool,
) -> Result<i32> {
    if !json {
        println!("🔍 Scanning page: {}", page_url);
    }

    let discoverer = LinkDiscoverer::new(client.clone(), &config);
    let links = discoverer.discover(page_url).await?;

    if links.is_empty() {
        if json {
            print_json(&DownloadOutput {
                report: BatchReport {
                    results: Vec::new(),
                    summary: Summary::from_results(&[], Duration::ZERO),
                },
                skipped: Vec::new(),
            })?;
        } else {
            println!("⚠️  No {} links found", config.suffix);
        }
        return Ok(0);
    }

    if !json {
        for link in &links {
            println!("   found: {}", link);
        }
        println!(
            "📄 Found {} file(s), downloading with {} worker(s)...\n",
            links.len(),
            config.pool_size
        );
    }

    let plan = plan_tasks(links, output);
    let found = plan.links_found();

    if !json {
        for link in &plan.skipped {
            println!("✗ {} skipped: URL has no usable file name", link);
        }
    }

    let downloader = Downloader::new(client, config);
    let report = downloader
        .run(plan.tasks, output, |result| {
            if !json {
                print_progress(result);
            }
        })
        .await?;

    let all_ok = report.summary.failed() == 0 && plan.skipped.is_empty();

    if json {
        print_json(&DownloadOutput {
            report,
            skipped: plan.skipped,
        })?;
    } else {
        let summary = &report.summary;
        println!(
            "\n📊 Download complete! Success: {}/{}",
            summary.succeeded, found
        );
        if !plan.skipped.is_empty() {
            println!("   Skipped (no file name): {}", plan.skipped.len());
        }
        println!("⏱️  Total time: {:.2}s", summary.elapsed.as_secs_f64());
    }

    if all_ok {
        Ok(0)
    } else {
        Ok(1) // Exit code 1 = some links weren't downloaded
    }
}

// --json output for the download subcommand
#[derive(Serialize)]
struct DownloadOutput {
    #[serde(flatten)]
    report: BatchReport,
    /// Links that never became a download task
    skipped: Vec<Url>,
}

// Discovery only: nothing is written to disk
async fn handle_list(
    client: reqwest::Client,
    config: HarvestConfig,
    page_url: &str,
    json: bool,
) -> Result<i32> {
    let discoverer = LinkDiscoverer::new(client, &config);
    let links = discoverer.discover(page_url).await?;

    if json {
        print_json(&links)?;
    } else if links.is_empty() {
        println!("⚠️  No {} links found", config.suffix);
    } else {
        for link in &links {
            println!("{}", link);
        }
        println!("\n📄 {} link(s) found", links.len());
    }

    Ok(0)
}

// One line per finished download, in the order they finish
fn print_progress(result: &DownloadResult) {
    match &result.outcome {
        Outcome::Success(path) => println!("✓ Downloaded: {}", path.display()),
        Outcome::Failure(message) => {
            println!("✗ {} download failed: {}", result.task.source, message)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    println!("{}", json_output);
    Ok(())
}
