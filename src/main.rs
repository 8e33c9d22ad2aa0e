// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout only carries results)
// 3. Pick a mode: script text file, URL list file, deep crawl or single URL
// 4. Collect URLs, derive subdomains, print and save the report
// 5. Exit with proper code (0 = success, 1 = no target or unexpected error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - worker pool and ^C handling
mod error; // src/error.rs - typed errors
mod extract; // src/extract/ - pattern matching and URL filtering
mod fetch; // src/fetch/ - HTTP fetching and page analysis
mod output; // src/output.rs - console and file output

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Mode};
use crawl::{extract_many, Interrupt, PoolConfig};
use extract::{find_candidates, subdomains, Extractor, MatchMode};
use fetch::{FetchConfig, Fetcher, PageInfo};
use output::Report;

#[tokio::main]
async fn main() {
    let cli = cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("Unexpected error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise info, or debug with -v
fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "url_harvester=debug"
    } else {
        "url_harvester=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// What a mode produced, before subdomains are derived
struct Harvest {
    urls: Vec<String>,
    pages: Vec<PageInfo>,
    // URL whose main domain scopes the subdomain list; empty = no subdomains
    base_url: String,
}

async fn run(cli: Cli) -> Result<i32> {
    let Some(mode) = cli.mode() else {
        error!("Please specify either -u URL or -f FILE");
        return Ok(1);
    };

    let fetcher = Fetcher::new(FetchConfig {
        cookie: cli.cookie.clone(),
        ..FetchConfig::default()
    })?;
    let match_mode = if cli.loose_domain_match {
        MatchMode::Substring
    } else {
        MatchMode::LabelSuffix
    };
    let extractor = Arc::new(Extractor::new(fetcher, match_mode));
    let pool = PoolConfig::with_threads(cli.threads);

    let interrupt = Interrupt::new();
    interrupt.listen_for_ctrl_c();

    let harvest = match mode {
        Mode::ScriptText(path) => harvest_script_text(path).await?,
        Mode::UrlList(path) => {
            let urls = read_lines(path).await?;
            let base_url = urls.first().cloned().unwrap_or_default();
            let batch = extract_many(&extractor, urls, true, &pool, &interrupt).await;
            Harvest {
                urls: batch.urls.into_iter().collect(),
                pages: batch.page_info,
                base_url,
            }
        }
        Mode::Deep(url) => {
            info!("Starting deep extraction...");
            let links = extractor.links(url).await;
            info!(count = links.len(), "links to process");
            let batch = extract_many(&extractor, links, true, &pool, &interrupt).await;
            Harvest {
                urls: batch.urls.into_iter().collect(),
                pages: batch.page_info,
                base_url: url.to_string(),
            }
        }
        Mode::Single(url) => {
            let result = extractor.extract(url, true).await;
            Harvest {
                urls: result.urls,
                pages: vec![result.page_info],
                base_url: url.to_string(),
            }
        }
    };

    let subdomains = if harvest.base_url.is_empty() {
        Vec::new()
    } else {
        subdomains(
            harvest.urls.iter().map(String::as_str),
            &harvest.base_url,
            extractor.match_mode(),
        )
    };

    let report = Report::new(harvest.urls, subdomains, harvest.pages);
    output::print_report(&report, cli.json)?;
    output::save_results(&report, &cli.output_targets());

    if interrupt.is_triggered() {
        info!("Process interrupted by user");
    }

    Ok(0)
}

// Non-empty, trimmed lines of a file
async fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

// -j mode: every line is already-fetched script text, nothing is fetched
async fn harvest_script_text(path: &Path) -> Result<Harvest> {
    let blocks = read_lines(path).await?;
    let urls: Vec<String> = blocks
        .iter()
        .flat_map(|block| find_candidates(block))
        .map(String::from)
        .collect();
    let base_url = urls.first().cloned().unwrap_or_default();

    info!(blocks = blocks.len(), found = urls.len(), "scanned script text");
    Ok(Harvest {
        urls,
        pages: Vec::new(),
        base_url,
    })
}
