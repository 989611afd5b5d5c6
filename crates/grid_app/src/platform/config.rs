use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_info;
use grid_engine::{DatasetSelectors, EngineConfig, FilterLabels, PollSettings, RouterAttachment};
use serde::Deserialize;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://127.0.0.1:4444";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// On-disk settings. Every field is optional; durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub webdriver_url: Option<String>,
    pub session_id: Option<String>,
    pub navigation_poll: PollSettings,
    pub table_poll: PollSettings,
    pub post_navigation_settle_ms: u64,
    pub post_period_settle_ms: u64,
    pub period_click_settle_ms: u64,
    pub dropdown_settle_ms: u64,
    pub dataset_settle_ms: u64,
    pub table_row_threshold: usize,
    pub route_prefix: String,
    pub default_referral: String,
    pub router_attachments: Vec<RouterAttachment>,
    pub filter_labels: FilterLabels,
    pub dataset_selectors: DatasetSelectors,
    pub copy_to_clipboard: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        let millis = |d: Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Self {
            webdriver_url: None,
            session_id: None,
            navigation_poll: engine.navigation_poll,
            table_poll: engine.table_poll,
            post_navigation_settle_ms: millis(engine.post_navigation_settle),
            post_period_settle_ms: millis(engine.post_period_settle),
            period_click_settle_ms: millis(engine.period_click_settle),
            dropdown_settle_ms: millis(engine.dropdown_settle),
            dataset_settle_ms: millis(engine.dataset_settle),
            table_row_threshold: engine.table_row_threshold,
            route_prefix: engine.route_prefix,
            default_referral: engine.default_referral,
            router_attachments: engine.router_attachments,
            filter_labels: engine.filter_labels,
            dataset_selectors: engine.dataset_selectors,
            copy_to_clipboard: engine.copy_to_clipboard,
        }
    }
}

impl AppConfig {
    /// Reads `path` when given; no path means built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        engine_info!("loaded config from {:?}", path);
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    pub fn engine_config(&self) -> EngineConfig {
        let ms = Duration::from_millis;
        EngineConfig {
            navigation_poll: self.navigation_poll,
            table_poll: self.table_poll,
            post_navigation_settle: ms(self.post_navigation_settle_ms),
            post_period_settle: ms(self.post_period_settle_ms),
            period_click_settle: ms(self.period_click_settle_ms),
            dropdown_settle: ms(self.dropdown_settle_ms),
            dataset_settle: ms(self.dataset_settle_ms),
            table_row_threshold: self.table_row_threshold,
            route_prefix: self.route_prefix.clone(),
            default_referral: self.default_referral.clone(),
            router_attachments: self.router_attachments.clone(),
            filter_labels: self.filter_labels.clone(),
            dataset_selectors: self.dataset_selectors.clone(),
            copy_to_clipboard: self.copy_to_clipboard,
            ..EngineConfig::default()
        }
    }
}
