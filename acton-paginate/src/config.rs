//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ACTON_PAGINATE_`, nested keys split on `__`,
//!    e.g. `ACTON_PAGINATE_PAGINATION__PER_PAGE=25`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/acton-paginate/config.toml
//! 4. System directory: /etc/acton-paginate/config.toml
//! 5. Default values
//!
//! ```toml
//! [service]
//! name = "catalog-api"
//! log_level = "debug"
//!
//! [pagination]
//! per_page = 25
//! ignore_total_pages = false
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::options::{DEFAULT_IGNORE_TOTAL_PAGES, DEFAULT_PER_PAGE};

const ENV_PREFIX: &str = "ACTON_PAGINATE_";
const CONFIG_DIR: &str = "acton-paginate";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Defaults applied to every listing
    #[serde(default)]
    pub pagination: PaginationDefaults,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Default paging options
///
/// `per_page = 0` is rejected while loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationDefaults {
    /// Items per page when the caller does not say
    #[serde(default = "default_per_page")]
    pub per_page: NonZeroU64,

    /// Counting strategy when the caller does not say
    #[serde(default = "default_ignore_total_pages")]
    pub ignore_total_pages: bool,

    /// Lean mode when the caller does not say
    #[serde(default)]
    pub lean: bool,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            ignore_total_pages: default_ignore_total_pages(),
            lean: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_per_page() -> NonZeroU64 {
    DEFAULT_PER_PAGE
}

fn default_ignore_total_pages() -> bool {
    DEFAULT_IGNORE_TOTAL_PAGES
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Config files are merged lowest priority first, then environment
    /// variables override everything.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path; environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// All candidate config file paths, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR);
        if let Ok(path) = xdg_dirs.place_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(PathBuf::from("/etc").join(CONFIG_DIR).join("config.toml"));

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "acton-paginate".to_string(),
                log_level: default_log_level(),
            },
            pagination: PaginationDefaults::default(),
        }
    }
}
