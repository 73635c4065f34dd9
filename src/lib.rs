//! Indicator resolution pipeline for CIMBL threat-intel feeds.
//!
//! Sources (inline URLs, CSV reports in zip/PGP containers, plain IP lists)
//! are turned into an ordered indicator set, probed once each over HTTP by
//! a bounded worker pool, and collected into a deduplicated result that is
//! independent of worker count.

pub mod archive;
pub mod checker;
pub mod config;
pub mod indicator;
pub mod ingest;
pub mod init;
pub mod report;
pub mod results;
pub mod sanitize;

/// The application name, as carried in the probe User-Agent.
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// The application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
