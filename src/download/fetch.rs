// src/download/fetch.rs
// =============================================================================
// Downloads one file to disk without holding the whole body in memory.
//
// Steps:
// 1. GET the URL (the timeout covers connect through the last body chunk)
// 2. Bail out on non-2xx *before* touching the filesystem
// 3. Copy the body chunk by chunk into a temp file next to the destination
// 4. Rename the temp file onto the destination once it's fully flushed
//
// The destination is only ever replaced in one rename, so two tasks that
// share a file name can't interleave their writes: the last one to finish
// wins, and a failed task never truncates or deletes what another task
// wrote. A failed task's temp file is removed when its TempPath drops.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Response};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::task::DownloadTask;
use crate::error::{DownloadError, FetchError, WriteError};

pub async fn fetch_to_file(
    client: &Client,
    task: &DownloadTask,
    timeout: Duration,
) -> Result<PathBuf, DownloadError> {
    let url = task.source.as_str();

    let response = client
        .get(task.source.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let path = &task.destination;
    let (file, temp_path) = create_part_file(path)?;

    let bytes = write_body(response, file, url, &temp_path).await?;

    temp_path.persist(path).map_err(|e| WriteError {
        path: path.clone(),
        source: e.error,
    })?;

    tracing::debug!(url, path = %path.display(), bytes, "file written");
    Ok(path.clone())
}

// Creates ".<name>.XXXXXX.part" in the destination's directory, so the final
// rename never crosses filesystems
fn create_part_file(destination: &Path) -> Result<(File, TempPath), WriteError> {
    let dir = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let prefix = format!(".{name}.");
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".part");
    // tempfile defaults to 0600, downloads should look like any other file
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    let (file, temp_path) = builder
        .tempfile_in(dir)
        .map_err(|source| WriteError {
            path: destination.to_path_buf(),
            source,
        })?
        .into_parts();

    Ok((File::from_std(file), temp_path))
}

// Streams the response body into `file`, returning the number of bytes written
async fn write_body(
    mut response: Response,
    file: File,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let write_err = |source: std::io::Error| WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(file);
    let mut written = 0u64;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?
    {
        writer.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }

    // BufWriter only reaches the disk on flush
    writer.flush().await.map_err(write_err)?;
    Ok(written)
}
