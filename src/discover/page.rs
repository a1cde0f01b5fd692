// src/discover/page.rs
// =============================================================================
// Fetches the listing page and hands its HTML to the link extractor.
//
// This is the only step that can abort a whole run: if the page can't be
// fetched (network error, timeout, non-2xx) there is nothing to download,
// so the error goes straight back to the caller.
// =============================================================================

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::html::extract_links;
use crate::config::HarvestConfig;
use crate::error::FetchError;

/// Finds file links on a single page.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    client: Client,
    timeout: Duration,
    suffix: String,
}

impl LinkDiscoverer {
    pub fn new(client: Client, config: &HarvestConfig) -> Self {
        Self {
            client,
            timeout: config.page_timeout,
            suffix: config.suffix.clone(),
        }
    }

    /// Fetches `page_url` and returns every matching link as an absolute URL,
    /// in document order.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the URL is invalid, the request fails or
    /// times out, or the server answers with a non-success status.
    #[tracing::instrument(skip(self), fields(suffix = %self.suffix))]
    pub async fn discover(&self, page_url: &str) -> Result<Vec<Url>, FetchError> {
        let base = Url::parse(page_url).map_err(|source| FetchError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;

        let html = self.fetch_page(&base).await?;
        let links = extract_links(&html, &base, &self.suffix);

        tracing::info!(found = links.len(), "scanned page");
        Ok(links)
    }

    // Fetches a web page and returns its HTML content
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))
    }
}
