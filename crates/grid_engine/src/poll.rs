use std::future::Future;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use scraper::Html;
use serde::Deserialize;
use tokio::time::Instant;

use crate::codec::selector;
use crate::page::Page;

/// Timeout and interval for one bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollSettings {
    #[serde(with = "millis")]
    pub timeout: Duration,
    #[serde(with = "millis")]
    pub interval: Duration,
}

impl PollSettings {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Profile for confirming an address change.
    pub const fn navigation() -> Self {
        Self::new(Duration::from_millis(12_000), Duration::from_millis(150))
    }

    /// Profile for confirming a data table has rendered.
    pub const fn table() -> Self {
        Self::new(Duration::from_millis(25_000), Duration::from_millis(250))
    }
}

/// Evaluates `probe` until it yields a value or `settings.timeout` has elapsed.
///
/// The probe always runs at least once. Dropping the returned future cancels
/// any pending sleep.
pub async fn poll_until<T, F, Fut>(settings: PollSettings, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    loop {
        if let Some(found) = probe().await {
            return Some(found);
        }
        if started.elapsed() >= settings.timeout {
            return None;
        }
        tokio::time::sleep(settings.interval).await;
    }
}

/// Table count and the row count of the largest table in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableScan {
    pub tables: usize,
    pub best_rows: usize,
}

impl TableScan {
    /// Ready only when the largest table has more than `threshold` rows,
    /// which rejects empty tables and loading skeletons.
    pub fn is_ready(&self, threshold: usize) -> bool {
        self.best_rows > threshold
    }
}

pub fn scan_tables(html: &str) -> TableScan {
    let (Some(table_sel), Some(row_sel)) = (selector("table"), selector("tr")) else {
        return TableScan::default();
    };
    let document = Html::parse_document(html);
    document
        .select(&table_sel)
        .fold(TableScan::default(), |scan, table| TableScan {
            tables: scan.tables + 1,
            best_rows: scan.best_rows.max(table.select(&row_sel).count()),
        })
}

/// Waits until some table on the page has more than `threshold` rows.
pub async fn wait_for_table(
    page: &dyn Page,
    settings: PollSettings,
    threshold: usize,
) -> Option<TableScan> {
    let started = Instant::now();
    let mut attempt = 0u32;
    let found = poll_until(settings, || {
        attempt += 1;
        let tick = attempt;
        async move {
            let html = match page.snapshot().await {
                Ok(html) => html,
                Err(err) => {
                    engine_debug!("table wait snapshot failed: {}", err);
                    return None;
                }
            };
            let scan = scan_tables(&html);
            if tick % 4 == 0 {
                engine_debug!(
                    "table wait tick ms={} tables={} best_rows={}",
                    started.elapsed().as_millis(),
                    scan.tables,
                    scan.best_rows
                );
            }
            scan.is_ready(threshold).then_some(scan)
        }
    })
    .await;

    match found {
        Some(scan) => engine_info!(
            "table ready ms={} tables={} best_rows={}",
            started.elapsed().as_millis(),
            scan.tables,
            scan.best_rows
        ),
        None => engine_warn!("table wait timed out after {:?}", settings.timeout),
    }
    found
}

pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
