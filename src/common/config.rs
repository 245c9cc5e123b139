use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Remote API
    pub const API_URL: &'static str = "https://en.wikichip.org/w/api.php";
    pub const CATEGORY_TITLE: &'static str = "Category:all microprocessor models";
    pub const CATEGORY_PAGE_LIMIT: u32 = 50;
    pub const USER_AGENT: &'static str = concat!("tdp-scrape/", env!("CARGO_PKG_VERSION"));

    // Network Configuration
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
    pub const POOL_IDLE_TIMEOUT_SECS: u64 = 60;
    pub const TCP_KEEPALIVE_SECS: u64 = 30;

    // Fetch pacing
    pub const BATCH_SIZE: usize = 50;
    pub const MAX_RETRIES: u32 = 3;
    pub const RETRY_DELAY_SECS: u64 = 5;
    pub const PAGE_DELAY_SECS: u64 = 1;
    pub const DELAY_MIN_SECS: f64 = 1.0;
    pub const DELAY_MAX_SECS: f64 = 3.0;

    // Analysis
    pub const DIFF_THRESHOLD: f64 = 0.5;

    // Default file locations
    pub const TITLES_PATH: &'static str = "data/page_titles.json";
    pub const CPU_TDP_CSV_PATH: &'static str = "data/CPU_TDP_wikichip.csv";
    pub const EXTERNAL_CSV_PATH: &'static str = "data/external_processors.csv";
    pub const ANALYSIS_OUTPUT_DIR: &'static str = "data/analysis_results";
}

/// Environment-specific configuration
pub struct EnvConfig;

impl EnvConfig {
    pub const API_URL_VAR: &'static str = "TDP_SCRAPE_API_URL";
    pub const BATCH_SIZE_VAR: &'static str = "TDP_SCRAPE_BATCH_SIZE";
    pub const MAX_RETRIES_VAR: &'static str = "TDP_SCRAPE_MAX_RETRIES";
    pub const DELAY_MIN_VAR: &'static str = "TDP_SCRAPE_DELAY_MIN";
    pub const DELAY_MAX_VAR: &'static str = "TDP_SCRAPE_DELAY_MAX";

    pub fn api_url() -> Option<String> {
        std::env::var(Self::API_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    pub fn batch_size() -> Result<Option<usize>> {
        Self::parsed(Self::BATCH_SIZE_VAR)
    }

    pub fn max_retries() -> Result<Option<u32>> {
        Self::parsed(Self::MAX_RETRIES_VAR)
    }

    pub fn delay_min() -> Result<Option<f64>> {
        Self::parsed(Self::DELAY_MIN_VAR)
    }

    pub fn delay_max() -> Result<Option<f64>> {
        Self::parsed(Self::DELAY_MAX_VAR)
    }

    fn parsed<T: FromStr>(var: &str) -> Result<Option<T>> {
        match std::env::var(var) {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| Error::InvalidConfig(format!("{var}={raw} is not a valid value"))),
            _ => Ok(None),
        }
    }
}

/// Settings that drive one fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_url: String,
    pub category: String,
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub page_delay: Duration,
    /// Inclusive range of the randomized pause after each batch, in seconds.
    pub delay_range: (f64, f64),
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_url: AppConfig::API_URL.to_string(),
            category: AppConfig::CATEGORY_TITLE.to_string(),
            batch_size: AppConfig::BATCH_SIZE,
            max_retries: AppConfig::MAX_RETRIES,
            retry_delay: Duration::from_secs(AppConfig::RETRY_DELAY_SECS),
            page_delay: Duration::from_secs(AppConfig::PAGE_DELAY_SECS),
            delay_range: (AppConfig::DELAY_MIN_SECS, AppConfig::DELAY_MAX_SECS),
        }
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct FetchOverrides {
    pub api_url: Option<String>,
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub delay_min: Option<f64>,
    pub delay_max: Option<f64>,
}

impl FetchConfig {
    /// Resolve the configuration: command line, then environment, then defaults.
    pub fn resolve(overrides: &FetchOverrides) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            api_url: overrides
                .api_url
                .clone()
                .or_else(EnvConfig::api_url)
                .unwrap_or(defaults.api_url),
            batch_size: pick(overrides.batch_size, EnvConfig::batch_size()?, defaults.batch_size),
            max_retries: pick(
                overrides.max_retries,
                EnvConfig::max_retries()?,
                defaults.max_retries,
            ),
            delay_range: (
                pick(overrides.delay_min, EnvConfig::delay_min()?, defaults.delay_range.0),
                pick(overrides.delay_max, EnvConfig::delay_max()?, defaults.delay_range.1),
            ),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(Error::InvalidConfig(
                "max retries must be at least 1".to_string(),
            ));
        }
        let (min, max) = self.delay_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(Error::InvalidConfig(format!(
                "invalid delay range {min}..{max}"
            )));
        }
        Ok(())
    }

    /// A configuration with every pause set to zero, used when replaying
    /// canned responses.
    pub fn without_delays(mut self) -> Self {
        self.retry_delay = Duration::ZERO;
        self.page_delay = Duration::ZERO;
        self.delay_range = (0.0, 0.0);
        self
    }
}

fn pick<T>(cli: Option<T>, env: Option<T>, default: T) -> T {
    cli.or(env).unwrap_or(default)
}
