use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Proxy, StatusCode};

use crate::config::Config;

/// Identifying User-Agent carried by every probe.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Classification of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Reachable through the proxy; request a block.
    Block,
    /// Already unreachable upstream (403/503).
    AlreadyBlocked,
    /// The proxy wants credentials (407). Operational, not a verdict.
    AuthRequired,
    /// Intentionally not probed (https, .onion).
    Skip,
    /// Transport failure; the indicator is dropped.
    Error,
}

/// Redirects are not followed, so any 3xx lands in the default bucket
/// alongside 200: the resource answered, block it.
pub fn classify(status: StatusCode) -> ProbeOutcome {
    match status.as_u16() {
        403 | 503 => ProbeOutcome::AlreadyBlocked,
        407 => ProbeOutcome::AuthRequired,
        _ => ProbeOutcome::Block,
    }
}

/// The one network operation the pipeline needs: a HEAD request returning
/// the raw status. Mocked in tests.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn head(&self, url: &str) -> Result<StatusCode>;
}

/// reqwest-backed probe client. Proxy wiring comes from configuration (or
/// from the usual proxy environment variables, which reqwest honors on its
/// own).
pub struct HttpProbeClient {
    client: reqwest::Client,
}

impl HttpProbeClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .redirect(reqwest::redirect::Policy::none());

        if let Some(url) = &config.proxy.url {
            let mut proxy = Proxy::all(url).context("proxy url")?;
            if let (Some(user), Some(password)) = (&config.proxy.user, &config.proxy.password) {
                proxy = proxy.basic_auth(user, password);
            }
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build().context("building http client")?,
        })
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn head(&self, url: &str) -> Result<StatusCode> {
        let resp = self.client.head(url).send().await?;
        Ok(resp.status())
    }
}
