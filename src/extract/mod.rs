// src/extract/mod.rs
// =============================================================================
// This module contains all URL extraction logic.
//
// Submodules:
// - pattern: the precompiled regex that finds quoted URL-like literals
// - html: inline scripts, script sources and anchor links of a page
// - filter: normalisation, static-resource and domain filtering, subdomains
// - extractor: the per-page pipeline tying the pieces together
// =============================================================================

mod extractor;
mod filter;
mod html;
mod pattern;

pub use extractor::{ExtractionResult, Extractor};
pub use filter::{subdomains, MatchMode};
pub use pattern::find_candidates;
