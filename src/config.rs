//! Extractor configuration

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::naming;

/// Browser user agent sent with page fetches unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/44.0.2403.89 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Prepended to every value collected by `FieldCollection` fields
    pub domain_prefix: Option<String>,
    /// Domain -> identifier overrides for `identifier_for`
    pub aliases: HashMap<String, String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            domain_prefix: None,
            aliases: HashMap::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Identifier for `domain`, honouring the alias table.
    pub fn identifier_for(&self, domain: &str) -> String {
        naming::domain_to_identifier(domain, &self.aliases)
    }
}
