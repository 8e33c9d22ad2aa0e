// src/fetch/mod.rs
// =============================================================================
// This module owns all network access.
//
// Submodules:
// - client: the retrying HTTP fetcher (User-Agent, cookie, backoff)
// - page: page analysis (status, title, length, body)
// =============================================================================

mod client;
mod page;

pub use client::{FetchConfig, Fetcher};
pub use page::PageInfo;
