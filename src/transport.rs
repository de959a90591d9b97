//! Page retrieval
//!
//! `parsePage` fields fetch their document through the [`Transport`] trait.
//! The default implementation is a blocking ureq agent.

use std::time::Duration;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};

/// Fetched page: HTTP status and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    /// Fetch `url`. Non-success statuses are returned as a `Page`, not an error.
    fn fetch(&self, url: &str) -> Result<Page>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(timeout_secs)))
                .user_agent(user_agent)
                .http_status_as_error(false)
                .build(),
        );

        Self { agent }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(&config.user_agent, config.timeout_secs)
    }
}

impl Transport for UreqTransport {
    fn fetch(&self, url: &str) -> Result<Page> {
        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| ExtractError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        let body = resp
            .into_body()
            .read_to_string()
            .map_err(|e| ExtractError::Transport {
                url: url.to_string(),
                message: format!("failed to read body: {}", e),
            })?;

        Ok(Page { status, body })
    }
}
