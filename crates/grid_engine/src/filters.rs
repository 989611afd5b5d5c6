use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use grid_core::Period;
use scraper::Html;
use serde::Deserialize;

use crate::codec::{normalize_cell, rendered_text, selector};
use crate::config::EngineConfig;
use crate::page::{ElementTarget, Page};

/// Visible labels and state classes of the reporting-period toggle.
///
/// Labels are compared case-insensitively against the control's whole text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterLabels {
    pub control_selector: String,
    pub annual: Vec<String>,
    pub quarterly: Vec<String>,
    pub active_classes: Vec<String>,
}

impl Default for FilterLabels {
    fn default() -> Self {
        Self {
            control_selector: "button".to_string(),
            annual: vec!["annual".to_string(), "anual".to_string()],
            quarterly: vec!["quarterly".to_string(), "trimestral".to_string()],
            active_classes: vec!["primaryAction".to_string(), "v-btn--active".to_string()],
        }
    }
}

impl FilterLabels {
    fn labels_for(&self, period: Period) -> &[String] {
        match period {
            Period::Annual => &self.annual,
            Period::Quarterly => &self.quarterly,
        }
    }
}

/// Selectors of the dataset source dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetSelectors {
    pub container: String,
    pub current_selection: String,
    pub opener: String,
    pub option: String,
}

impl Default for DatasetSelectors {
    fn default() -> Self {
        Self {
            container: ".select-set".to_string(),
            current_selection: ".v-select__selection".to_string(),
            opener: ".v-input__slot".to_string(),
            option: ".v-list-item__title".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ControlHit {
    index: usize,
    label: String,
    active: bool,
}

#[derive(Debug, Default)]
struct PeriodScan {
    sample: Vec<String>,
    hit: Option<ControlHit>,
}

fn scan_period_controls(html: &str, labels: &FilterLabels, period: Period) -> PeriodScan {
    let Some(control_sel) = selector(&labels.control_selector) else {
        engine_warn!("invalid control selector {:?}", labels.control_selector);
        return PeriodScan::default();
    };
    let wanted = labels.labels_for(period);
    let document = Html::parse_document(html);
    let mut scan = PeriodScan::default();
    for (index, control) in document.select(&control_sel).enumerate() {
        let text = normalize_cell(&rendered_text(control)).to_lowercase();
        if text.is_empty() {
            continue;
        }
        if scan.sample.len() < 40 {
            scan.sample.push(text.clone());
        }
        if scan.hit.is_none() && wanted.iter().any(|label| label.to_lowercase() == text) {
            let active = control
                .value()
                .classes()
                .any(|class| labels.active_classes.iter().any(|c| c == class));
            scan.hit = Some(ControlHit {
                index,
                label: text,
                active,
            });
        }
    }
    scan
}

async fn settle(delay: Duration) {
    tokio::time::sleep(delay).await;
}

/// Switches the view to `period`. Returns `false` if no matching control is
/// present, which is normal for views without a period toggle.
///
/// The settle delay after a click only gives the re-render a head start;
/// callers still have to wait for the table.
pub async fn set_reporting_period(page: &dyn Page, period: Period, config: &EngineConfig) -> bool {
    let labels = &config.filter_labels;
    let html = match page.snapshot().await {
        Ok(html) => html,
        Err(err) => {
            engine_warn!("period scan snapshot failed: {}", err);
            return false;
        }
    };
    let scan = scan_period_controls(&html, labels, period);
    engine_debug!("period scan wanted={} controls={:?}", period, scan.sample);

    let Some(hit) = scan.hit else {
        engine_warn!("period control not found for {}", period);
        return false;
    };
    engine_info!("period control found label={} active={}", hit.label, hit.active);
    if hit.active {
        return true;
    }

    let target = ElementTarget::new(labels.control_selector.clone(), hit.index);
    if let Err(err) = page.click(&target).await {
        engine_warn!("period control click failed: {}", err);
        return false;
    }
    engine_info!("period control clicked label={}", hit.label);
    settle(config.period_click_settle).await;
    true
}

#[derive(Debug, Default)]
struct DatasetScan {
    container_found: bool,
    current: String,
    opener_found: bool,
}

fn scan_dataset_control(html: &str, selectors: &DatasetSelectors) -> DatasetScan {
    let (Some(container_sel), Some(current_sel), Some(opener_sel)) = (
        selector(&selectors.container),
        selector(&selectors.current_selection),
        selector(&selectors.opener),
    ) else {
        engine_warn!("invalid dataset selectors {:?}", selectors);
        return DatasetScan::default();
    };
    let document = Html::parse_document(html);
    let Some(container) = document.select(&container_sel).next() else {
        return DatasetScan::default();
    };
    DatasetScan {
        container_found: true,
        current: container
            .select(&current_sel)
            .next()
            .map(|el| normalize_cell(&rendered_text(el)))
            .unwrap_or_default(),
        opener_found: container.select(&opener_sel).next().is_some(),
    }
}

/// Index of the option whose text equals `name`, plus all visible option texts.
fn scan_dataset_options(html: &str, option_selector: &str, name: &str) -> (Option<usize>, Vec<String>) {
    let Some(option_sel) = selector(option_selector) else {
        return (None, Vec::new());
    };
    let document = Html::parse_document(html);
    let texts: Vec<String> = document
        .select(&option_sel)
        .map(|el| normalize_cell(&rendered_text(el)))
        .collect();
    let index = texts.iter().position(|text| text == name);
    (index, texts.into_iter().filter(|t| !t.is_empty()).collect())
}

/// Selects the dataset source `name` from the view's dropdown. Returns `false`
/// when the dropdown or the option is missing.
pub async fn select_dataset(page: &dyn Page, name: &str, config: &EngineConfig) -> bool {
    let selectors = &config.dataset_selectors;
    let html = match page.snapshot().await {
        Ok(html) => html,
        Err(err) => {
            engine_warn!("dataset scan snapshot failed: {}", err);
            return false;
        }
    };
    let scan = scan_dataset_control(&html, selectors);
    if !scan.container_found {
        engine_warn!("dataset control {} not found", selectors.container);
        return false;
    }
    engine_info!("dataset current={:?} wanted={:?}", scan.current, name);
    if scan.current == name {
        return true;
    }
    if !scan.opener_found {
        engine_warn!("dataset opener {} not found", selectors.opener);
        return false;
    }

    let opener = ElementTarget::new(format!("{} {}", selectors.container, selectors.opener), 0);
    if let Err(err) = page.click(&opener).await {
        engine_warn!("dataset opener click failed: {}", err);
        return false;
    }
    settle(config.dropdown_settle).await;

    let html = match page.snapshot().await {
        Ok(html) => html,
        Err(err) => {
            engine_warn!("dataset options snapshot failed: {}", err);
            return false;
        }
    };
    let (index, options) = scan_dataset_options(&html, &selectors.option, name);
    engine_debug!("dataset options={:?}", options);
    let Some(index) = index else {
        engine_warn!("dataset {:?} not in list", name);
        return false;
    };

    if let Err(err) = page.click(&ElementTarget::new(selectors.option.clone(), index)).await {
        engine_warn!("dataset option click failed: {}", err);
        return false;
    }
    engine_info!("dataset {:?} selected", name);
    settle(config.dataset_settle).await;
    true
}
