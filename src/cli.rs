// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The output flags are traditionally written -ou, -os and -ow. clap only
// supports single-character short flags, so those three spellings are
// rewritten to their long forms before clap sees the arguments.
// =============================================================================

use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::output::OutputTargets;

// Two-letter short flags and the long flag each one stands for
const SHORT_OUTPUT_FLAGS: [(&str, &str); 3] = [
    ("-ou", "--output-urls"),
    ("-os", "--output-subdomains"),
    ("-ow", "--output-web-info"),
];

#[derive(Parser, Debug)]
#[command(
    name = "url-harvester",
    version,
    about = "Harvest endpoint URLs and subdomains from web pages and their scripts",
    long_about = "url-harvester fetches pages (and the scripts they load), scans them for quoted \
                  URL-like strings and reports the endpoints and subdomains that belong to the \
                  target's domain.",
    after_help = "Example: url-harvester -u https://example.com -ou urls.txt -os subdomains.txt"
)]
pub struct Cli {
    /// Target website URL
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Cookie header value sent with every request
    #[arg(short = 'c', long)]
    pub cookie: Option<String>,

    /// File with one URL per line (or script text per line with --js)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Write the found URLs to this file (also -ou)
    #[arg(long, value_name = "PATH")]
    pub output_urls: Option<PathBuf>,

    /// Write the found subdomains to this file (also -os)
    #[arg(long, value_name = "PATH")]
    pub output_subdomains: Option<PathBuf>,

    /// Write page information lines to this file (also -ow)
    #[arg(long, value_name = "PATH")]
    pub output_web_info: Option<PathBuf>,

    /// Treat the lines of --file as script text instead of URLs
    #[arg(short = 'j', long)]
    pub js: bool,

    /// Follow the links of --url one hop before extracting
    #[arg(short = 'd', long)]
    pub deep: bool,

    /// Number of URLs processed at the same time
    #[arg(short = 't', long, default_value_t = 10)]
    pub threads: usize,

    /// Print debug logs
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Accept any host that merely contains the target's main domain
    /// (e.g. evilexample.com for example.com)
    #[arg(long)]
    pub loose_domain_match: bool,
}

/// What the run should do, decided from the flags.
#[derive(Debug, PartialEq)]
pub enum Mode<'a> {
    /// --file --js: every line is script text
    ScriptText(&'a Path),
    /// --file: every line is a URL
    UrlList(&'a Path),
    /// --url --deep: the seed's links, one hop
    Deep(&'a str),
    /// --url
    Single(&'a str),
}

impl Cli {
    /// None when neither --url nor --file was given.
    pub fn mode(&self) -> Option<Mode<'_>> {
        if let Some(file) = &self.file {
            return Some(if self.js {
                Mode::ScriptText(file)
            } else {
                Mode::UrlList(file)
            });
        }

        let url = self.url.as_deref()?;
        Some(if self.deep { Mode::Deep(url) } else { Mode::Single(url) })
    }

    pub fn output_targets(&self) -> OutputTargets {
        OutputTargets {
            urls: self.output_urls.clone(),
            subdomains: self.output_subdomains.clone(),
            web_info: self.output_web_info.clone(),
        }
    }
}

/// Parse the process arguments, accepting -ou/-os/-ow.
pub fn parse() -> Cli {
    Cli::parse_from(expand_short_output_flags(std::env::args_os()))
}

pub fn expand_short_output_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let long = arg.to_str().and_then(|flag| {
                SHORT_OUTPUT_FLAGS
                    .iter()
                    .find(|(short, _)| *short == flag)
                    .map(|(_, long)| *long)
            });
            match long {
                Some(long) => OsString::from(long),
                None => arg,
            }
        })
        .collect()
}
