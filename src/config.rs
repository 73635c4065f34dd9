use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Pattern recognizing report filenames among the CLI sources.
    #[serde(default = "default_report_pattern")]
    pub report_pattern: String,

    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Filename extensions never worth a blocking request; empty means the
    /// built-in executable/script set.
    #[serde(default)]
    pub blocked_extensions: Vec<String>,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProxyConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Addressing for the rendered blocking request. Delivery itself is up to
/// the operator; the text is printed on stdout.
#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub cc: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub server: String,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_pattern: default_report_pattern(),
            jobs: default_jobs(),
            probe_timeout_secs: default_probe_timeout(),
            blocked_extensions: Vec::new(),
            proxy: ProxyConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            cc: String::new(),
            subject: default_subject(),
            server: String::new(),
        }
    }
}

// Defaults
pub(crate) fn default_report_pattern() -> String {
    r"(?i)CIMBL-\d+-(CERTS|EU)\.(csv|zip)(\.asc|\.gpg)?$".to_string()
}
fn default_jobs() -> usize {
    num_cpus::get()
}
fn default_probe_timeout() -> u64 {
    10
}
fn default_subject() -> String {
    "Blocking request".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.report_pattern.contains("CIMBL"));
        assert!(config.jobs >= 1);
        assert_eq!(config.probe_timeout_secs, 10);
        assert!(config.blocked_extensions.is_empty());
        assert!(config.proxy.url.is_none());
        assert_eq!(config.mail.subject, "Blocking request");
    }

    #[test]
    fn test_empty_toml_equals_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.jobs, Config::default().jobs);
        assert_eq!(config.report_pattern, Config::default().report_pattern);
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cimbl-check.toml");
        tokio::fs::write(
            &path,
            r#"
jobs = 4
probe_timeout_secs = 3

[proxy]
url = "http://proxy.internal:3128"
user = "squid"
password = "hunter2"

[mail]
to = "servicedesk@example.org"
"#,
        )
        .await
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.jobs, 4);
        assert_eq!(config.probe_timeout_secs, 3);
        assert_eq!(
            config.proxy.url.as_deref(),
            Some("http://proxy.internal:3128")
        );
        assert_eq!(config.mail.to, "servicedesk@example.org");
        // Untouched fields keep their defaults.
        assert_eq!(config.mail.subject, "Blocking request");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/cimbl-check.toml").await.is_err());
    }
}
