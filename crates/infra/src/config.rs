//! Engine configuration.
//!
//! Defaults are usable as-is; environment variables override them:
//!
//! - `LOGIFLOW_MAX_CONFLICT_RETRIES`: retry bound for optimistic-concurrency conflicts
//! - `LOGIFLOW_LOG`: default tracing filter when `RUST_LOG` is unset

use anyhow::Context;
use serde::{Deserialize, Serialize};

use logiflow_inventory::DEFAULT_MAX_CONFLICT_RETRIES;

pub const ENV_MAX_CONFLICT_RETRIES: &str = "LOGIFLOW_MAX_CONFLICT_RETRIES";
pub const ENV_LOG: &str = "LOGIFLOW_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_conflict_retries: u32,
    pub default_log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            default_log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_CONFLICT_RETRIES) {
            config.max_conflict_retries = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid {ENV_MAX_CONFLICT_RETRIES}: {raw:?}"))?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            let filter = filter.trim();
            if !filter.is_empty() {
                config.default_log_filter = filter.to_string();
            }
        }
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid engine configuration")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.default_log_filter, "info");
    }

    #[test]
    fn env_overrides_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_MAX_CONFLICT_RETRIES, " 7 "),
            (ENV_LOG, "logiflow_inventory=debug"),
        ]))
        .unwrap();
        assert_eq!(config.max_conflict_retries, 7);
        assert_eq!(config.default_log_filter, "logiflow_inventory=debug");
    }

    #[test]
    fn rejects_non_numeric_retry_bound() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_MAX_CONFLICT_RETRIES, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_CONFLICT_RETRIES));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "max_conflict_retries": 0 }"#).unwrap();
        assert_eq!(config.max_conflict_retries, 0);
        assert_eq!(config.default_log_filter, "info");
    }
}
