//! Configuration for navix.
//!
//! Domain rules and the dispatch timeout live in an optional TOML file at
//! `.navix/config.toml` under the project root (next to the index). A
//! missing file means defaults; a malformed file is logged and ignored
//! rather than failing the query — configuration is a convenience layer,
//! not part of the index contract.
//!
//! ```toml
//! timeout_secs = 30
//! default_domain = "core"
//!
//! [[domains]]
//! pattern = "lib/csv/"
//! domain = "csv-processing"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::domain::{DomainRule, DomainRules, DEFAULT_DOMAIN};

/// Default wall-clock budget for one dispatched query.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Relative path of the config file under the project root.
pub const CONFIG_FILE: &str = ".navix/config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Seconds before a dispatched query is abandoned as timed out.
    pub timeout_secs: u64,
    /// Fallback domain label for unmatched paths.
    pub default_domain: String,
    /// Ordered classification rules; first match wins.
    pub domains: Vec<DomainRule>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_domain: DEFAULT_DOMAIN.to_string(),
            domains: Vec::new(),
        }
    }
}

impl NavConfig {
    /// Load from `<project_root>/.navix/config.toml`, falling back to
    /// defaults when the file is absent or unreadable.
    pub fn load(project_root: &Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        let Ok(text) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// The domain rule set this config describes. An empty `[[domains]]`
    /// list means the built-in generic rules.
    pub fn domain_rules(&self) -> DomainRules {
        if self.domains.is_empty() {
            DomainRules::defaults()
        } else {
            DomainRules::new(self.domains.clone(), self.default_domain.clone())
        }
    }
}
