// src/config.rs

//! Process-wide scan settings, read once at startup.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! Lookup order: an explicit `--config` path, then `config.toml` in the
//! project config directory, then the built-in defaults.

use crate::core::scanner::target_scanner::{DEFAULT_PORTS, DEFAULT_SCHEMES, TargetExpander};
use crate::core::scanner::DEFAULT_WORKERS;
use crate::logging::get_config_dir;
use color_eyre::eyre::{Result, WrapErr, bail};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Concurrent fetch workers.
    pub workers: usize,
    /// Connect and whole-request timeout for each GET.
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Recursive resolver used for CNAME lookups.
    pub dns_upstream: SocketAddr,
    pub dns_timeout_ms: u64,
    /// Schemes and ports each bare hostname is expanded into.
    pub schemes: Vec<String>,
    pub ports: Vec<u16>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            http_timeout_secs: 3,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            dns_upstream: SocketAddr::from(([8, 8, 8, 8], 53)),
            dns_timeout_ms: 2000,
            schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
            ports: DEFAULT_PORTS.to_vec(),
        }
    }
}

impl ScanConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the project config file is
    /// used when present and the defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = default_config_path();
                if !candidate.is_file() {
                    debug!(path = %candidate.display(), "No config file, using defaults.");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let raw = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration.");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: ScanConfig = toml::from_str(raw).wrap_err("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("`workers` must be at least 1");
        }
        if self.http_timeout_secs == 0 {
            bail!("`http_timeout_secs` must be at least 1");
        }
        if self.schemes.is_empty() || self.ports.is_empty() {
            bail!("`schemes` and `ports` must not be empty");
        }
        if let Some(bad) = self.schemes.iter().find(|s| !matches!(s.as_str(), "http" | "https")) {
            bail!("unsupported scheme `{bad}`, expected http or https");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_timeout_ms)
    }

    pub fn expander(&self) -> TargetExpander {
        TargetExpander::new(self.schemes.clone(), self.ports.clone())
    }
}

/// `config.toml` inside the project config directory.
pub fn default_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}
