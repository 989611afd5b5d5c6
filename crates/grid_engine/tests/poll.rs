mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{page_with, table, FakePage};
use grid_engine::{poll_until, scan_tables, wait_for_table, PollSettings, TableScan};

fn quick(timeout_ms: u64) -> PollSettings {
    PollSettings::new(Duration::from_millis(timeout_ms), Duration::from_millis(2))
}

#[tokio::test]
async fn poll_returns_first_found_value() {
    let calls = AtomicUsize::new(0);
    let found = poll_until(quick(1_000), || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move { (n >= 3).then_some(n) }
    })
    .await;
    assert_eq!(found, Some(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn poll_gives_up_after_timeout() {
    let calls = AtomicUsize::new(0);
    let found: Option<()> = poll_until(quick(20), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { None }
    })
    .await;
    assert_eq!(found, None);
    assert!(calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn poll_probes_at_least_once_with_zero_timeout() {
    let found = poll_until(quick(0), || async { Some("now") }).await;
    assert_eq!(found, Some("now"));
}

#[test]
fn scan_picks_largest_table() {
    let html = page_with(&format!(
        "{}{}",
        table(&[&["a"]]),
        table(&[&["h"], &["1"], &["2"], &["3"]])
    ));
    assert_eq!(
        scan_tables(&html),
        TableScan {
            tables: 2,
            best_rows: 4
        }
    );
}

#[test]
fn skeleton_tables_are_not_ready() {
    let two_rows = scan_tables(&page_with(&table(&[&["h"], &["1"]])));
    assert!(!two_rows.is_ready(2));

    let three_rows = scan_tables(&page_with(&table(&[&["h"], &["1"], &["2"]])));
    assert!(three_rows.is_ready(2));

    assert!(!scan_tables("<html></html>").is_ready(2));
}

#[tokio::test]
async fn table_wait_sees_late_render() {
    let page = FakePage::with(|s| {
        s.scripted.push_back(page_with("<p>loading</p>"));
        s.scripted.push_back(page_with(&table(&[&["h"], &["1"]])));
        s.scripted
            .push_back(page_with(&table(&[&["h"], &["1"], &["2"]])));
    });
    let scan = wait_for_table(&page, quick(1_000), 2).await;
    assert_eq!(scan.map(|s| s.best_rows), Some(3));
    assert_eq!(page.state().snapshots_taken, 3);
}

#[tokio::test]
async fn table_wait_times_out_on_empty_view() {
    let page = FakePage::new();
    assert_eq!(wait_for_table(&page, quick(20), 2).await, None);
}
