use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::BaseConvention;
use crate::errors::{AppResult, CollatzError};
use crate::scanner::UpperBound;

pub mod defaults;

use defaults::*;

/// How an optional step of a run is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Always,
    Never,
    /// Prompt on the terminal
    Ask,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Always => "always",
            Decision::Never => "never",
            Decision::Ask => "ask",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = CollatzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "yes" | "y" => Ok(Decision::Always),
            "never" | "no" | "n" => Ok(Decision::Never),
            "ask" => Ok(Decision::Ask),
            other => Err(CollatzError::invalid_argument(format!(
                "unknown decision '{}', expected always, never or ask",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Length assigned to 1: `transitions` (0) or `terms` (1)
    #[serde(default = "default_base_convention")]
    pub base_convention: BaseConvention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_upper_bound")]
    pub upper_bound: UpperBound,
    /// Values between progress log lines; 0 disables them
    #[serde(default = "default_progress_update_interval")]
    pub progress_update_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    #[serde(default = "default_load_on_start")]
    pub load_on_start: bool,
    #[serde(default = "default_save_cache")]
    pub save: Decision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_write_report")]
    pub write: Decision,
    /// Write the full trajectory of the arg-max into the report
    #[serde(default = "default_include_trajectory")]
    pub include_trajectory: bool,
    #[serde(default = "default_include_range_listing")]
    pub include_range_listing: Decision,
    /// Print the arg-max trajectory on the terminal
    #[serde(default = "default_show_trajectory")]
    pub show_trajectory: Decision,
    /// Values kept at each end of a truncated trajectory display
    #[serde(default = "default_trajectory_edge")]
    pub trajectory_edge: usize,
}

fn default_base_convention() -> BaseConvention {
    DEFAULT_BASE_CONVENTION
}

fn default_upper_bound() -> UpperBound {
    DEFAULT_UPPER_BOUND
}

fn default_progress_update_interval() -> u64 {
    DEFAULT_PROGRESS_UPDATE_INTERVAL
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

fn default_load_on_start() -> bool {
    DEFAULT_LOAD_ON_START
}

fn default_save_cache() -> Decision {
    DEFAULT_SAVE_CACHE
}

fn default_report_directory() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_DIRECTORY)
}

fn default_write_report() -> Decision {
    DEFAULT_WRITE_REPORT
}

fn default_include_trajectory() -> bool {
    DEFAULT_INCLUDE_TRAJECTORY
}

fn default_include_range_listing() -> Decision {
    DEFAULT_INCLUDE_RANGE_LISTING
}

fn default_show_trajectory() -> Decision {
    DEFAULT_SHOW_TRAJECTORY
}

fn default_trajectory_edge() -> usize {
    DEFAULT_TRAJECTORY_EDGE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_convention: default_base_convention(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            upper_bound: default_upper_bound(),
            progress_update_interval: default_progress_update_interval(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            load_on_start: default_load_on_start(),
            save: default_save_cache(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_directory(),
            write: default_write_report(),
            include_trajectory: default_include_trajectory(),
            include_range_listing: default_include_range_listing(),
            show_trajectory: default_show_trajectory(),
            trajectory_edge: default_trajectory_edge(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            scan: ScanConfig::default(),
            cache: CacheConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Layer defaults, the TOML file and `COLLATZ_*` environment variables.
    ///
    /// A missing file is created with the default values.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        if !config_file.exists() {
            let contents = toml::to_string_pretty(&Self::default()).map_err(|e| {
                CollatzError::configuration(format!("failed to serialize defaults: {}", e))
            })?;
            if let Some(parent) = config_file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
        }

        Self::figment(config_file).extract().map_err(|e| {
            CollatzError::configuration(format!(
                "invalid configuration in {}: {}",
                config_file.display(),
                e
            ))
        })
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
