//! The worker pool. Indicators are drained from a bounded queue by a fixed
//! number of workers; everything worth keeping flows over a single channel
//! into one aggregator task, the sole writer of the accumulated result.
//! Serializing the writes through one consumer removes the need for a lock
//! around the shared sets.

pub mod probe;

pub use self::probe::{classify, HttpProbeClient, ProbeClient, ProbeOutcome, USER_AGENT};

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::debug;

use crate::indicator::{Indicator, PathFilter};
use crate::ingest::IngestedSet;
use crate::results::Checked;
use crate::sanitize::{sanitize, Sanitized};

pub struct CheckOptions {
    pub jobs: usize,
    pub no_paths: bool,
    pub no_urls: bool,
    pub path_filter: PathFilter,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get(),
            no_paths: false,
            no_urls: false,
            path_filter: PathFilter::default(),
        }
    }
}

/// What a worker hands to the aggregator.
enum Verdict {
    Path(String),
    Url(String),
    Skipped(String),
    Auth(String),
}

/// Probes every indicator in `set` with `opts.jobs` parallel workers and
/// returns the deduplicated outcome, stamped with the set's provenance.
/// The result is identical for any worker count.
pub async fn check(set: IngestedSet, client: Arc<dyn ProbeClient>, opts: CheckOptions) -> Checked {
    let jobs = opts.jobs.max(1);
    let (indicators, files) = set.into_parts();

    let (work_tx, work_rx) = async_channel::bounded(indicators.len().max(1));
    let (verdict_tx, mut verdict_rx) = mpsc::channel(indicators.len().max(1));

    let filter = opts.path_filter.clone();
    let aggregator = tokio::spawn(async move {
        let mut checked = Checked::default();
        while let Some(verdict) = verdict_rx.recv().await {
            match verdict {
                Verdict::Path(name) => {
                    if filter.is_ignored(&name) {
                        debug!("filename {} ignored", name);
                    } else {
                        checked.results.add_path(name);
                    }
                }
                Verdict::Url(url) => checked.results.add_url(url),
                Verdict::Skipped(raw) => checked.skipped.push(raw),
                Verdict::Auth(url) => checked.auth_required.push(url),
            }
        }
        for file in files {
            checked.results.add_file(file);
        }
        // Workers race, sets do not care, the side lists do.
        checked.skipped.sort();
        checked.auth_required.sort();
        checked
    });

    // The queue holds the whole set, so filling it never blocks.
    for indicator in indicators {
        let _ = work_tx.send(indicator).await;
    }
    work_tx.close();

    debug!("setup {} workers", jobs);
    let mut workers = Vec::with_capacity(jobs);
    for n in 0..jobs {
        let work_rx = work_rx.clone();
        let verdict_tx = verdict_tx.clone();
        let client = client.clone();
        let (no_paths, no_urls) = (opts.no_paths, opts.no_urls);
        workers.push(tokio::spawn(async move {
            while let Ok(indicator) = work_rx.recv().await {
                if let Some(verdict) =
                    process(indicator, client.as_ref(), no_paths, no_urls).await
                {
                    let _ = verdict_tx.send(verdict).await;
                }
            }
            debug!("worker {} done", n);
        }));
    }
    drop(verdict_tx);
    drop(work_rx);

    join_all(workers).await;
    aggregator.await.expect("aggregator task panicked")
}

async fn process(
    indicator: Indicator,
    client: &dyn ProbeClient,
    no_paths: bool,
    no_urls: bool,
) -> Option<Verdict> {
    match indicator {
        Indicator::Filename { name } => {
            if no_paths {
                return None;
            }
            Some(Verdict::Path(name))
        }
        Indicator::Url { raw } => {
            if no_urls {
                return None;
            }
            match sanitize(&raw) {
                Sanitized::SkipHttps | Sanitized::SkipOnion => Some(Verdict::Skipped(raw)),
                Sanitized::ParseError => {
                    debug!("unusable indicator {}", raw);
                    None
                }
                Sanitized::Ok(url) => match probe(client, &url).await {
                    ProbeOutcome::Block => Some(Verdict::Url(url)),
                    ProbeOutcome::AuthRequired => Some(Verdict::Auth(url)),
                    ProbeOutcome::AlreadyBlocked => {
                        debug!("{} already handled upstream", url);
                        None
                    }
                    ProbeOutcome::Skip | ProbeOutcome::Error => None,
                },
            }
        }
    }
}

/// One HEAD, no retry. A transport failure only costs this indicator.
async fn probe(client: &dyn ProbeClient, url: &str) -> ProbeOutcome {
    match client.head(url).await {
        Ok(status) => classify(status),
        Err(e) => {
            debug!("probe {} failed: {:#}", url, e);
            ProbeOutcome::Error
        }
    }
}
