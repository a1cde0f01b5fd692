// src/discover/mod.rs
// =============================================================================
// This module finds the files to download.
//
// Submodules:
// - page: fetches the listing page (the one network call before downloads)
// - html: extracts and filters links from the fetched HTML
// =============================================================================

mod html;
mod page;

pub use page::LinkDiscoverer;
