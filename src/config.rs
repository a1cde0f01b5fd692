// src/config.rs
// =============================================================================
// Runtime settings shared by the link discoverer and the downloader.
//
// Everything that used to be a magic number (timeouts, worker count, the
// file suffix we look for) lives in one struct. The CLI fills it in, tests
// build it by hand, and both components receive it at construction.
// =============================================================================

use std::num::NonZeroUsize;
use std::time::Duration;

/// Timeout for fetching the page that lists the files.
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for each individual file download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of downloads allowed in flight at once.
pub const DEFAULT_POOL_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => panic!("default pool size must be non-zero"),
};

/// Link suffix we download when the user doesn't pick one.
pub const DEFAULT_SUFFIX: &str = ".webp";

/// Directory files land in when `--output` is not given.
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_webp_files";

// Settings for one harvesting run
//
// A NonZeroUsize pool size means "zero workers" can't even be expressed,
// so the downloader never has to guard against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Timeout for the listing page fetch
    pub page_timeout: Duration,
    /// Timeout for each file fetch (connect through last body chunk)
    pub download_timeout: Duration,
    /// Maximum number of concurrent downloads
    pub pool_size: NonZeroUsize,
    /// Case-insensitive suffix a link's path must end with
    pub suffix: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            pool_size: DEFAULT_POOL_SIZE,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}
