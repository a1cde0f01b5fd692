// src/download/task.rs
// =============================================================================
// The data that flows through the download pool.
//
// - DownloadTask: what to fetch and where to put it (one per link found)
// - DownloadResult: what happened to one task (exactly one per task)
// - Summary / BatchReport: totals for the whole run
//
// Results are collected in *completion* order, not submission order, so each
// result carries its task with it. Never match results to tasks by index.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};
use url::Url;

/// One file to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTask {
    pub source: Url,
    pub destination: PathBuf,
}

/// How a task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// File written to this path
    Success(PathBuf),
    /// Human-readable reason the fetch or write failed
    Failure(String),
}

/// What happened to one task; exactly one per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub task: DownloadTask,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// Totals for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

impl Summary {
    pub fn from_results(results: &[DownloadResult], elapsed: Duration) -> Self {
        Self {
            total: results.len(),
            succeeded: results.iter().filter(|r| r.is_success()).count(),
            elapsed,
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

fn as_secs_f64<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Everything `Downloader::run` hands back.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// In completion order
    pub results: Vec<DownloadResult>,
    pub summary: Summary,
}

/// Download tasks for the discovered links, plus the links that couldn't
/// become a task because their URL doesn't end in a usable file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    pub tasks: Vec<DownloadTask>,
    pub skipped: Vec<Url>,
}

impl TaskPlan {
    // Number of links the plan was built from; the denominator for the
    // "Success: k/n" line
    pub fn links_found(&self) -> usize {
        self.tasks.len() + self.skipped.len()
    }
}

// Turns discovered links into download tasks
//
// Each file is saved under `output_dir` using the last segment of the URL
// path (percent-decoded). Links that don't end in a usable file name go
// into `skipped` so the caller can report them.
pub fn plan_tasks(urls: Vec<Url>, output_dir: &Path) -> TaskPlan {
    let mut plan = TaskPlan::default();

    for source in urls {
        match file_name_for(&source) {
            Some(name) => plan.tasks.push(DownloadTask {
                destination: output_dir.join(name),
                source,
            }),
            None => {
                tracing::warn!(url = %source, "link has no usable file name, skipping");
                plan.skipped.push(source);
            }
        }
    }

    plan
}

// Returns the basename of the URL path, or None if it can't name a file
//
// Examples:
//   https://example.com/tex/a.webp      -> Some("a.webp")
//   https://example.com/tex/my%20a.webp -> Some("my a.webp")
//   https://example.com/tex/            -> None
//   https://example.com/%2E%2E          -> None
pub fn file_name_for(url: &Url) -> Option<String> {
    let raw = url.path_segments()?.last()?;
    let name = urlencoding::decode(raw).ok()?.into_owned();

    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(name)
}
