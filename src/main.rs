use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use tracing::{info, warn};

use cimbl_check::archive::FsOpener;
use cimbl_check::checker::{check, CheckOptions, HttpProbeClient};
use cimbl_check::config::Config;
use cimbl_check::indicator::PathFilter;
use cimbl_check::ingest::ingest;
use cimbl_check::init::setup_logging;
use cimbl_check::report;

#[derive(Debug, Parser)]
#[command(version, about = "Checks CIMBL indicator feeds and builds blocking requests.")]
struct Args {
    /// Configuration file.
    #[arg(long, default_value = "cimbl-check.toml")]
    config: PathBuf,

    /// Parallel probe workers (defaults to the CPU count).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Display URLs that were skipped (https, .onion).
    #[arg(short = 'S', long)]
    show_skipped: bool,

    /// Do not handle filenames.
    #[arg(short = 'P', long)]
    no_paths: bool,

    /// Do not check URLs.
    #[arg(short = 'U', long)]
    no_urls: bool,

    /// Verbose mode.
    #[arg(short, long)]
    verbose: bool,

    /// Debug mode.
    #[arg(short = 'D', long)]
    debug: bool,

    /// Sources: URLs, CIMBL reports or .txt host lists.
    sources: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Logging
    setup_logging(args.verbose, args.debug);

    // 2. Config
    let config = if args.config.exists() {
        Config::load(&args.config).await?
    } else {
        info!("no config file, using defaults");
        Config::default()
    };

    if (args.no_paths && args.no_urls) || args.sources.is_empty() {
        info!("nothing to do");
        return Ok(());
    }

    // 3. Ingest every source; a bad one is logged and skipped.
    let report_re = Regex::new(&config.report_pattern).context("report_pattern")?;
    let (set, errors) = ingest(&args.sources, &FsOpener, &report_re);
    info!(
        "{} indicators queued from {} sources ({} bad)",
        set.len(),
        args.sources.len(),
        errors.len()
    );

    // 4. Probe
    let client = Arc::new(HttpProbeClient::new(&config)?);
    let opts = CheckOptions {
        jobs: args.jobs.unwrap_or(config.jobs),
        no_paths: args.no_paths,
        no_urls: args.no_urls,
        path_filter: PathFilter::new(&config.blocked_extensions)?,
    };
    let checked = check(set, client, opts).await;

    // 5. Report
    if !checked.auth_required.is_empty() {
        warn!(
            "proxy demanded authentication for {} URLs; check the proxy credentials",
            checked.auth_required.len()
        );
    }

    if checked.results.is_empty() {
        info!("nothing to report");
    } else {
        print!("{}", report::render(&config.mail, &checked.results));
    }

    if args.show_skipped && !checked.skipped.is_empty() {
        println!("\nSkipped URLs:\n{}", checked.skipped.join("\n"));
    }

    Ok(())
}
