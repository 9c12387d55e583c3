//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (vendor API keys) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub vendor: VendorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    /// How long a formatted response stays served from cache.
    pub cache_ttl_secs: u64,
    /// Total stake split across the two outcomes of each opportunity.
    #[serde(default = "default_total_stake")]
    pub total_stake: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VendorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Env var holding one or more comma-separated API keys.
    pub api_keys_env: String,
    /// Bookmakers to request quotes from, in preference order.
    pub bookmakers: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_total_stake() -> f64 {
    crate::pipeline::arbitrage::DEFAULT_TOTAL_STAKE
}

fn default_base_url() -> String {
    "https://api.the-odds-api.com/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
