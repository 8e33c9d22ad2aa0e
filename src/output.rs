// src/output.rs
// =============================================================================
// Everything the user sees at the end of a run.
//
// - print_report: sorted URLs, then subdomains, then page info lines
//   (or one JSON document with --json)
// - save_results: the same lists written to the -ou/-os/-ow files
//
// A failing file write is logged and the remaining files are still written.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::fetch::PageInfo;

/// The final, printable result of a run.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Sorted, unique.
    pub urls: Vec<String>,
    /// Sorted, unique.
    pub subdomains: Vec<String>,
    pub pages: Vec<PageInfo>,
}

impl Report {
    pub fn new<I>(urls: I, subdomains: Vec<String>, pages: Vec<PageInfo>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let urls: BTreeSet<String> = urls.into_iter().collect();
        Self {
            urls: urls.into_iter().collect(),
            subdomains,
            pages,
        }
    }
}

/// Where to save results; each file is optional.
#[derive(Debug, Default, Clone)]
pub struct OutputTargets {
    pub urls: Option<PathBuf>,
    pub subdomains: Option<PathBuf>,
    pub web_info: Option<PathBuf>,
}

pub fn format_page_line(info: &PageInfo) -> String {
    format!(
        "URL: {} | Status: {} | Title: {} | Length: {}",
        info.url, info.status_code, info.title, info.content_length
    )
}

pub fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_text(report);
    }
    Ok(())
}

fn print_text(report: &Report) {
    println!("\n🔗 Found {} URL(s):", report.urls.len());
    for url in &report.urls {
        println!("{}", url);
    }

    println!("\n🌐 Found {} subdomain(s):", report.subdomains.len());
    for subdomain in &report.subdomains {
        println!("{}", subdomain);
    }

    // Pages that never answered are only listed in the -ow file
    let answered: Vec<&PageInfo> = report.pages.iter().filter(|p| p.responded()).collect();
    if !answered.is_empty() {
        println!("\n📄 Page info:");
        for info in answered {
            println!("{}", format_page_line(info));
        }
    }
}

/// Write every requested output file that has something to write.
pub fn save_results(report: &Report, targets: &OutputTargets) {
    if let Some(path) = &targets.urls {
        save_lines(path, &report.urls, "URLs", false);
    }

    if let Some(path) = &targets.subdomains {
        save_lines(path, &report.subdomains, "subdomains", false);
    }

    if let Some(path) = &targets.web_info {
        let lines: Vec<String> = report.pages.iter().map(format_page_line).collect();
        save_lines(path, &lines, "page info records", true);
    }
}

// URL and subdomain files are newline-joined; page info records each end
// with a newline
fn save_lines(path: &Path, lines: &[String], what: &str, terminated: bool) {
    if lines.is_empty() {
        return;
    }

    match write_lines(path, lines, terminated) {
        Ok(()) => info!(path = %path.display(), count = lines.len(), "saved {}", what),
        Err(e) => {
            let reason = format!("{e:#}");
            error!(path = %path.display(), error = %reason, "failed to save {}", what);
        }
    }
}

fn write_lines(path: &Path, lines: &[String], terminated: bool) -> Result<()> {
    let mut content = lines.join("\n");
    if terminated {
        content.push('\n');
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
