// src/client.rs
// =============================================================================
// Builds the one reqwest Client shared by discovery and all download workers.
//
// reqwest::Client keeps a connection pool internally and is cheap to clone,
// so every worker gets a clone instead of its own client. Timeouts are set
// per request (page vs. file), not here.
// =============================================================================

use reqwest::Client;

use crate::error::FetchError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn build_client() -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5)) // Follow up to 5 redirects
        .build()
        .map_err(FetchError::Client)
}
