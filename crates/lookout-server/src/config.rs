//! Daemon configuration.
//!
//! Values resolve in order: defaults → TOML file → env vars → CLI flags.
//! This module owns the first two layers and validation; `main` applies
//! the rest.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use lookout_spectator::SpectatorConfig;
use serde::{Deserialize, Serialize};

/// Everything the daemon needs to start polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookoutConfig {
    /// Initial seed addresses (`host:port`). Replaced by the local-region
    /// nodes after the first good pass.
    pub seeds: Vec<String>,
    /// Region whose nodes vote on failures.
    pub local_region: String,
    /// Milliseconds between reconciliation passes.
    pub interval_ms: u64,
    /// Milliseconds any single node query may take.
    pub call_timeout_ms: u64,
    /// Password sent with `AUTH` on every connection. Empty disables auth.
    pub auth_pass: String,
}

impl Default for LookoutConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            local_region: String::new(),
            interval_ms: 1000,
            call_timeout_ms: 2000,
            auth_pass: String::new(),
        }
    }
}

impl LookoutConfig {
    /// Reads and parses a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file '{}': {e}", path.display()))?;
        toml::from_str(&text)
            .map_err(|e| format!("invalid config file '{}': {e}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Checks the fully resolved config before anything connects.
    pub fn validate(&self) -> Result<(), String> {
        if self.seeds.is_empty() {
            return Err("at least one seed is required (--seeds)".into());
        }
        if let Some(bad) = self.seeds.iter().find(|s| !s.contains(':')) {
            return Err(format!("seed '{bad}' is not a host:port address"));
        }
        let mut seen = HashSet::with_capacity(self.seeds.len());
        if let Some(dup) = self.seeds.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(format!("seed '{dup}' is listed more than once"));
        }
        if self.local_region.trim().is_empty() {
            return Err("local_region must not be empty (--local-region)".into());
        }
        if self.interval_ms == 0 {
            return Err("interval_ms must be at least 1".into());
        }
        if self.call_timeout_ms == 0 {
            return Err("call_timeout_ms must be at least 1".into());
        }
        Ok(())
    }

    pub fn auth_pass(&self) -> Option<&str> {
        (!self.auth_pass.is_empty()).then_some(self.auth_pass.as_str())
    }

    pub fn spectator_config(&self) -> SpectatorConfig {
        SpectatorConfig {
            local_region: self.local_region.clone(),
            interval: Duration::from_millis(self.interval_ms),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }
}
