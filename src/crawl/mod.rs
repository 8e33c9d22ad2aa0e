// src/crawl/mod.rs
// =============================================================================
// This module runs extraction over many URLs concurrently.
//
// Features:
// - Bounded worker pool (default 10 URLs in flight)
// - Per-task time limit, failed tasks never abort their siblings
// - Deduplicated URL set + page records in submission order
// - Graceful ^C: stop submitting, let running tasks finish
//
// There is no frontier here: the harvester goes at most one hop past the
// seed (deep mode), and that hop is driven from main.rs.
// =============================================================================

mod interrupt;
mod pool;

pub use interrupt::Interrupt;
pub use pool::{extract_many, PoolConfig};
