//! Configuration for statistical facet counting
//!
//! Loaded from TOML. Every section and field has a default, so an empty
//! file (or no file) yields a usable configuration.

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `facets.sample_size`
pub const SAMPLE_SIZE_ENV: &str = "STATFACET_SAMPLE_SIZE";
/// Environment variable overriding `facets.random_seed`
pub const RANDOM_SEED_ENV: &str = "STATFACET_RANDOM_SEED";

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub facets: SecureFacetConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// How facet counts are made access-control aware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacetMode {
    /// Exact counts over every matching document the caller may read
    Secure,
    /// Counts extrapolated from a permission-checked random sample
    #[default]
    Statistical,
    /// Raw engine counts, no access control
    Insecure,
}

impl FacetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetMode::Secure => "secure",
            FacetMode::Statistical => "statistical",
            FacetMode::Insecure => "insecure",
        }
    }
}

impl std::str::FromStr for FacetMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "secure" => Ok(FacetMode::Secure),
            "statistical" => Ok(FacetMode::Statistical),
            "insecure" => Ok(FacetMode::Insecure),
            other => Err(crate::Error::Config(format!("unknown facet mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecureFacetConfig {
    #[serde(default)]
    pub mode: FacetMode,
    /// Number of matching documents permission-checked per estimation
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Seed for the sampling RNG. Fix it for reproducible counts.
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Hits requested per page from the search backend
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_sample_size() -> usize {
    1000
}

/// Kept within TOML's signed 64-bit integer range so saved configs reload
fn default_random_seed() -> u64 {
    rand::thread_rng().gen_range(0..=i64::MAX as u64)
}

fn default_batch_size() -> usize {
    1000
}

impl Default for SecureFacetConfig {
    fn default() -> Self {
        Self {
            mode: FacetMode::default(),
            sample_size: default_sample_size(),
            random_seed: default_random_seed(),
            batch_size: default_batch_size(),
        }
    }
}

impl SecureFacetConfig {
    pub fn new(sample_size: usize, random_seed: u64) -> Self {
        Self {
            sample_size,
            random_seed,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: FacetMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.sample_size == 0 {
            return Err(crate::Error::Config(
                "facets.sample_size must be greater than zero".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(crate::Error::Config(
                "facets.batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log output format: "pretty" or "json"
    /// Override with LOG_FORMAT env var
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info,statfacet=debug".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(crate::Error::from)
            .context("Failed to parse config")?;
        config.facets.validate()?;
        Ok(config)
    }

    /// Load config from file path, or fall back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Self::from_toml_str(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply STATFACET_SAMPLE_SIZE / STATFACET_RANDOM_SEED from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, e.g. a map in tests
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(SAMPLE_SIZE_ENV) {
            self.facets.sample_size = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", SAMPLE_SIZE_ENV, raw))?;
        }
        if let Some(raw) = lookup(RANDOM_SEED_ENV) {
            self.facets.random_seed = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", RANDOM_SEED_ENV, raw))?;
        }
        self.facets.validate()?;
        Ok(())
    }
}
