//! Paged fetch tests - cursor walks, partial results, the pager and year scans

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use stellarx::error::{Result, StellarxError};
use stellarx::paging::{fetch_all, fetch_all_partial, walk, PageSource, Pager, Visit, WalkEnd};
use stellarx::types::Page;
use stellarx::year_stats::{scan, window_for_year, Progress};
use tokio_util::sync::CancellationToken;

/// In-memory collection. Every record on page `k` carries paging token
/// `k + 1`, so the cursor Horizon would send back is the next page index.
struct Pages {
    pages: Vec<Vec<Value>>,
    fail_at: Option<usize>,
    calls: AtomicUsize,
}

impl Pages {
    fn new(pages: Vec<Vec<Value>>) -> Self {
        Pages { pages, fail_at: None, calls: AtomicUsize::new(0) }
    }

    fn failing_at(mut self, page: usize) -> Self {
        self.fail_at = Some(page);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for Pages {
    type Item = Value;

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let idx: usize = match cursor {
            Some(c) => c.parse().map_err(|_| StellarxError::Decode(format!("cursor {c}")))?,
            None => 0,
        };
        if self.fail_at == Some(idx) {
            return Err(StellarxError::Http { status: 503, detail: None });
        }
        let records: Vec<Value> = self
            .pages
            .get(idx)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|mut r| {
                r["paging_token"] = json!((idx + 1).to_string());
                r
            })
            .collect();
        Ok(Page::new(records, None))
    }
}

fn numbered(range: std::ops::Range<u32>) -> Vec<Value> {
    range.map(|n| json!({ "n": n })).collect()
}

fn ns(records: &[Value]) -> Vec<u64> {
    records.iter().filter_map(|r| r["n"].as_u64()).collect()
}

#[tokio::test]
async fn walks_every_page_until_empty() {
    let src = Pages::new(vec![numbered(0..3), numbered(3..5), numbered(5..6)]);
    let cancel = CancellationToken::new();
    let all = fetch_all(&src, &cancel, None, |_: &Value| Visit::Take).await.unwrap();
    assert_eq!(ns(&all), vec![0, 1, 2, 3, 4, 5]);
    // three pages of data plus the empty one
    assert_eq!(src.calls(), 4);
}

#[tokio::test]
async fn visitor_skips_and_stops() {
    let src = Pages::new(vec![numbered(0..4), numbered(4..8), numbered(8..12)]);
    let cancel = CancellationToken::new();
    let mut visit = |r: &Value| match r["n"].as_u64() {
        Some(n) if n >= 6 => Visit::Stop,
        Some(n) if n % 2 == 0 => Visit::Take,
        _ => Visit::Skip,
    };
    let (w, err) = walk(&src, &cancel, None, &mut visit).await;
    assert!(err.is_none());
    assert_eq!(ns(&w.records), vec![0, 2, 4]);
    assert_eq!(w.pages, 2);
    assert_eq!(w.end, WalkEnd::Stopped);
}

#[tokio::test]
async fn page_cap_limits_requests() {
    let src = Pages::new(vec![numbered(0..2), numbered(2..4), numbered(4..6)]);
    let cancel = CancellationToken::new();
    let mut visit = |_: &Value| Visit::Take;
    let (w, err) = walk(&src, &cancel, Some(2), &mut visit).await;
    assert!(err.is_none());
    assert_eq!(w.end, WalkEnd::PageCap);
    assert_eq!(ns(&w.records), vec![0, 1, 2, 3]);
    assert_eq!(src.calls(), 2);
}

#[tokio::test]
async fn failure_keeps_earlier_pages() {
    let src = Pages::new(vec![numbered(0..2), numbered(2..4), numbered(4..6)]).failing_at(2);
    let cancel = CancellationToken::new();

    let (partial, err) = fetch_all_partial(&src, &cancel, None, |_: &Value| Visit::Take).await;
    assert_eq!(ns(&partial), vec![0, 1, 2, 3]);
    assert!(matches!(err, Some(StellarxError::Http { status: 503, .. })));

    let strict = fetch_all(&src, &cancel, None, |_: &Value| Visit::Take).await;
    assert!(strict.is_err());
}

#[tokio::test]
async fn cancelled_walk_fetches_nothing() {
    let src = Pages::new(vec![numbered(0..2)]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let res = fetch_all(&src, &cancel, None, |_: &Value| Visit::Take).await;
    assert!(matches!(res, Err(StellarxError::Cancelled)));
    assert_eq!(src.calls(), 0);
}

#[tokio::test]
async fn pager_loads_one_page_at_a_time() {
    let mut pager = Pager::new(Pages::new(vec![numbered(0..3), numbered(3..4)]));
    let cancel = CancellationToken::new();
    assert!(!pager.is_loaded());
    assert!(pager.has_more());

    assert_eq!(pager.load_more(&cancel).await.unwrap(), 3);
    assert!(pager.is_loaded());
    assert!(pager.has_more());

    assert_eq!(pager.load_more(&cancel).await.unwrap(), 1);
    assert_eq!(ns(pager.items()), vec![0, 1, 2, 3]);

    assert_eq!(pager.load_more(&cancel).await.unwrap(), 0);
    assert!(!pager.has_more());
    assert_eq!(pager.items().len(), 4);
}

#[tokio::test]
async fn pager_error_keeps_loaded_items() {
    let mut pager = Pager::new(Pages::new(vec![numbered(0..2), numbered(2..4)]).failing_at(1));
    let cancel = CancellationToken::new();
    assert_eq!(pager.load_more(&cancel).await.unwrap(), 2);
    assert!(pager.load_more(&cancel).await.is_err());
    assert_eq!(ns(pager.items()), vec![0, 1]);
    assert!(pager.has_more());
}

fn op(kind: &str, at: &str) -> Value {
    json!({ "type": kind, "created_at": at })
}

#[tokio::test]
async fn year_scan_counts_window_and_stops_before_it() {
    let src = Pages::new(vec![
        vec![
            op("payment", "2024-01-02T00:00:00Z"),
            op("payment", "2023-12-31T23:59:59Z"),
            op("manage_sell_offer", "2023-06-01T12:00:00Z"),
            op("path_payment_strict_send", "2023-05-01T00:00:00Z"),
        ],
        vec![
            op("change_trust", "2023-01-01T00:00:00Z"),
            op("create_account", "2023-01-01T00:00:00Z"),
            op("payment", "2022-12-31T23:59:59Z"),
            op("payment", "2022-06-01T00:00:00Z"),
        ],
        vec![op("payment", "2021-01-01T00:00:00Z")],
    ]);
    let window = window_for_year(2023).unwrap();
    let cancel = CancellationToken::new();
    let mut seen: Vec<Progress> = Vec::new();

    let stats = scan(&src, window, &cancel, |p| seen.push(p)).await.unwrap();

    assert_eq!(stats.total, 6);
    assert_eq!(stats.payments, 1);
    assert_eq!(stats.orders, 1);
    assert_eq!(stats.swaps, 1);
    assert_eq!(stats.trustlines, 1);
    // the third page is never requested
    assert_eq!(src.calls(), 2);
    assert_eq!(seen.iter().map(|p| p.pages).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(seen[0].stats.total, 4);
}

#[tokio::test]
async fn year_scan_reports_cancellation() {
    let src = Pages::new(vec![vec![op("payment", "2023-03-01T00:00:00Z")]]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let res = scan(&src, window_for_year(2023).unwrap(), &cancel, |_| {}).await;
    assert!(matches!(res, Err(StellarxError::Cancelled)));
}
