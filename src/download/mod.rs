// src/download/mod.rs
// =============================================================================
// This module downloads the discovered files in parallel.
//
// Submodules:
// - task: the task/result types and turning URLs into tasks
// - pool: the fixed-size worker pool (knows nothing about HTTP)
// - fetch: streams one URL into one file
//
// The Downloader glues them together: it makes sure the output directory
// exists, runs every task through the pool, and times the whole batch.
// A failed task never stops the batch; only an output directory we can't
// create does, and then nothing is downloaded at all.
// =============================================================================

mod fetch;
mod pool;
mod task;

use std::path::Path;
use std::time::Instant;

use reqwest::Client;

pub use pool::run_pool;
pub use task::{plan_tasks, BatchReport, DownloadResult, DownloadTask, Outcome, Summary};

use crate::config::HarvestConfig;
use crate::error::WriteError;
use fetch::fetch_to_file;

/// Downloads a batch of files with a bounded number of workers.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    config: HarvestConfig,
}

impl Downloader {
    pub fn new(client: Client, config: HarvestConfig) -> Self {
        Self { client, config }
    }

    /// Runs every task and returns one result per task, in completion order.
    ///
    /// `output_dir` is created (with parents) before any worker starts.
    /// `on_result` is called as each task finishes, so callers can stream
    /// progress.
    ///
    /// # Errors
    ///
    /// Only fails if `output_dir` can't be created. Individual download
    /// failures are reported as [`Outcome::Failure`] in the results.
    pub async fn run<C>(
        &self,
        tasks: Vec<DownloadTask>,
        output_dir: &Path,
        on_result: C,
    ) -> Result<BatchReport, WriteError>
    where
        C: FnMut(&DownloadResult),
    {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| WriteError {
                path: output_dir.to_path_buf(),
                source,
            })?;

        tracing::info!(
            tasks = tasks.len(),
            workers = self.config.pool_size.get(),
            output = %output_dir.display(),
            "starting downloads"
        );

        let started = Instant::now();

        let client = self.client.clone();
        let timeout = self.config.download_timeout;
        let work = move |task: DownloadTask| {
            let client = client.clone(); // Client is an Arc inside, cloning is cheap
            async move { fetch_to_file(&client, &task, timeout).await }
        };

        let results = run_pool(tasks, self.config.pool_size, work, on_result).await;
        let summary = Summary::from_results(&results, started.elapsed());

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "downloads finished"
        );

        Ok(BatchReport { results, summary })
    }
}
