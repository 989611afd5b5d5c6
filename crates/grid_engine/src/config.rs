use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use grid_core::DEFAULT_REFERRAL_CODE;

use crate::filters::{DatasetSelectors, FilterLabels};
use crate::page::RouterAttachment;
use crate::poll::PollSettings;

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Every tunable of a run. Defaults match the host site's observed timings.
#[derive(Clone)]
pub struct EngineConfig {
    pub navigation_poll: PollSettings,
    pub table_poll: PollSettings,
    pub post_navigation_settle: Duration,
    pub post_period_settle: Duration,
    pub period_click_settle: Duration,
    pub dropdown_settle: Duration,
    pub dataset_settle: Duration,
    /// A table counts as rendered once it has more rows than this.
    pub table_row_threshold: usize,
    pub route_prefix: String,
    pub default_referral: String,
    pub router_attachments: Vec<RouterAttachment>,
    pub filter_labels: FilterLabels,
    pub dataset_selectors: DatasetSelectors,
    pub copy_to_clipboard: bool,
    /// Extraction timestamp written into the report header.
    pub clock: Clock,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            navigation_poll: PollSettings::navigation(),
            table_poll: PollSettings::table(),
            post_navigation_settle: Duration::from_millis(1_200),
            post_period_settle: Duration::from_millis(400),
            period_click_settle: Duration::from_millis(1_800),
            dropdown_settle: Duration::from_millis(400),
            dataset_settle: Duration::from_millis(2_000),
            table_row_threshold: 2,
            route_prefix: "/stock/".to_string(),
            default_referral: DEFAULT_REFERRAL_CODE.to_string(),
            router_attachments: RouterAttachment::defaults(),
            filter_labels: FilterLabels::default(),
            dataset_selectors: DatasetSelectors::default(),
            copy_to_clipboard: true,
            clock: Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("navigation_poll", &self.navigation_poll)
            .field("table_poll", &self.table_poll)
            .field("post_navigation_settle", &self.post_navigation_settle)
            .field("post_period_settle", &self.post_period_settle)
            .field("period_click_settle", &self.period_click_settle)
            .field("dropdown_settle", &self.dropdown_settle)
            .field("dataset_settle", &self.dataset_settle)
            .field("table_row_threshold", &self.table_row_threshold)
            .field("route_prefix", &self.route_prefix)
            .field("default_referral", &self.default_referral)
            .field("router_attachments", &self.router_attachments)
            .field("filter_labels", &self.filter_labels)
            .field("dataset_selectors", &self.dataset_selectors)
            .field("copy_to_clipboard", &self.copy_to_clipboard)
            .finish_non_exhaustive()
    }
}
