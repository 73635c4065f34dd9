//! Builds the indicator work list from heterogeneous sources: inline URLs,
//! CIMBL CSV reports (possibly wrapped in zip/PGP containers) and plain IP
//! lists. A bad source is logged and skipped; ingestion never aborts the
//! run.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::archive::ReportOpener;
use crate::indicator::Indicator;

/// The ordered indicator collection plus the report basenames it was built
/// from. Append-only here; moved by value into the checker afterwards.
#[derive(Debug, Default)]
pub struct IngestedSet {
    indicators: Vec<Indicator>,
    files: Vec<String>,
}

impl IngestedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, indicator: Indicator) {
        self.indicators.push(indicator);
    }

    pub fn add_file(&mut self, file: impl Into<String>) {
        self.files.push(file.into());
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn into_parts(self) -> (Vec<Indicator>, Vec<String>) {
        (self.indicators, self.files)
    }
}

/// A source that could not be ingested. The rest of the run proceeds.
#[derive(Debug)]
pub struct IngestError {
    pub source: String,
    pub cause: anyhow::Error,
}

/// Dispatches each source by shape: inline URL, report matching the
/// configured filename pattern, or plain `.txt` host list.
pub fn ingest(
    sources: &[String],
    opener: &dyn ReportOpener,
    report_re: &Regex,
) -> (IngestedSet, Vec<IngestError>) {
    let mut set = IngestedSet::new();
    let mut errors = Vec::new();

    for source in sources {
        let outcome = if source.starts_with("http:") || source.starts_with("https:") {
            set.push(Indicator::Url {
                raw: source.clone(),
            });
            Ok(())
        } else if report_re.is_match(source) {
            add_report(&mut set, opener, source)
        } else if source.ends_with(".txt") {
            add_ip_list(&mut set, source)
        } else {
            Err(anyhow!("not a URL, report or ip list"))
        };

        if let Err(cause) = outcome {
            warn!("skipping {}: {:#}", source, cause);
            errors.push(IngestError {
                source: source.clone(),
                cause,
            });
        }
    }

    (set, errors)
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    to_ids: String,
}

fn add_report(set: &mut IngestedSet, opener: &dyn ReportOpener, source: &str) -> Result<()> {
    let path = Path::new(source);
    let data = opener.open(path)?;
    let indicators = parse_report(&data)?;
    info!("{}: {} indicators", source, indicators.len());

    set.indicators.extend(indicators);
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());
    set.add_file(base);
    Ok(())
}

/// Keeps `filename` and `url` rows. Types can be composite (`filename|sha1`),
/// as can filename values (`evil.doc|<hash>`); the first segment wins.
fn parse_report(data: &[u8]) -> Result<Vec<Indicator>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut out = Vec::new();

    for row in reader.deserialize::<ReportRow>() {
        let row = row.context("reading csv row")?;
        match row.kind.split('|').next().unwrap_or("") {
            "filename" => {
                let name = row.value.split('|').next().unwrap_or("");
                if !name.is_empty() {
                    out.push(Indicator::Filename {
                        name: name.to_string(),
                    });
                }
            }
            "url" => {
                // to_ids gates automated blocking; the report author marked
                // everything else informational-only.
                if row.to_ids.trim() == "1" {
                    out.push(Indicator::Url { raw: row.value });
                } else {
                    debug!("informational url {}, not queued", row.value);
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

/// One bare host or address per line, probed as `http://<line>/`.
fn add_ip_list(set: &mut IngestedSet, source: &str) -> Result<()> {
    let text =
        std::fs::read_to_string(source).with_context(|| format!("reading {}", source))?;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        set.push(Indicator::Url {
            raw: format!("http://{line}/"),
        });
    }
    Ok(())
}
