//! Calendar-year activity summary for an account.
//!
//! Operations are walked newest first. Anything older than the window start
//! ends the scan; anything newer than the window end still counts toward the
//! total but not toward a bucket.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, StellarxError};
use crate::horizon::{params, HorizonClient};
use crate::operation::type_tag;
use crate::paging::{walk, HorizonCollection, PageSource, Visit, Visitor};

/// Half-open `[start, end)` time range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }
}

/// Jan 1 of `year` to Jan 1 of the next, UTC.
pub fn window_for_year(year: i32) -> Option<Window> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Window {
        start: Utc.from_utc_datetime(&start),
        end: Utc.from_utc_datetime(&end),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Orders,
    Swaps,
    Payments,
    Trustlines,
}

pub fn classify(type_tag: &str) -> Option<Bucket> {
    match type_tag {
        "manage_buy_offer" | "manage_sell_offer" | "create_passive_sell_offer" => {
            Some(Bucket::Orders)
        }
        "path_payment_strict_send" | "path_payment_strict_receive" => Some(Bucket::Swaps),
        "payment" => Some(Bucket::Payments),
        "change_trust" => Some(Bucket::Trustlines),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct YearStats {
    pub total: u64,
    pub orders: u64,
    pub swaps: u64,
    pub payments: u64,
    pub trustlines: u64,
}

impl YearStats {
    fn bump(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Orders => self.orders += 1,
            Bucket::Swaps => self.swaps += 1,
            Bucket::Payments => self.payments += 1,
            Bucket::Trustlines => self.trustlines += 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub pages: usize,
    pub stats: YearStats,
}

/// Counts one operation at a time; stops at the first one before the window.
pub struct YearScan<P> {
    window: Window,
    stats: YearStats,
    progress: P,
}

impl<P: FnMut(Progress)> YearScan<P> {
    pub fn new(window: Window, progress: P) -> Self {
        YearScan {
            window,
            stats: YearStats::default(),
            progress,
        }
    }

    pub fn stats(&self) -> YearStats {
        self.stats
    }
}

fn created_at(op: &Value) -> Option<DateTime<Utc>> {
    let raw = op.get("created_at")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

impl<P: FnMut(Progress)> Visitor<Value> for YearScan<P> {
    fn visit(&mut self, op: &Value) -> Visit {
        let Some(t) = created_at(op) else {
            return Visit::Skip;
        };
        if t < self.window.start {
            return Visit::Stop;
        }
        self.stats.total += 1;
        if t < self.window.end {
            if let Some(b) = classify(&type_tag(op)) {
                self.stats.bump(b);
            }
        }
        Visit::Skip
    }

    fn page_done(&mut self, pages: usize) {
        (self.progress)(Progress {
            pages,
            stats: self.stats,
        });
    }
}

/// Operations of `account`, newest first, successful only.
pub fn account_operations(client: &HorizonClient, account: &str) -> HorizonCollection<Value> {
    HorizonCollection::new(
        client,
        format!("/accounts/{account}/operations"),
        params(&[("limit", "200"), ("order", "desc"), ("include_failed", "false")]),
    )
}

/// Scan `source` against `window`. Cancellation surfaces as
/// `StellarxError::Cancelled`.
pub async fn scan<S, P>(
    source: &S,
    window: Window,
    cancel: &CancellationToken,
    progress: P,
) -> Result<YearStats>
where
    S: PageSource<Item = Value> + ?Sized,
    P: FnMut(Progress),
{
    let mut counter = YearScan::new(window, progress);
    let (w, err) = walk(source, cancel, None, &mut counter).await;
    if let Some(e) = err {
        return Err(e);
    }
    log::info!(
        "[year_stats] scanned {} pages, total={}",
        w.pages,
        counter.stats().total
    );
    Ok(counter.stats())
}

/// Reject years Horizon cannot have data for.
pub fn validate_year(year: i32, now: DateTime<Utc>) -> Result<Window> {
    use chrono::Datelike;
    if !(2015..=now.year()).contains(&year) {
        return Err(StellarxError::Validation(format!(
            "year must be between 2015 and {}",
            now.year()
        )));
    }
    window_for_year(year).ok_or_else(|| StellarxError::Validation(format!("bad year {year}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Page;
    use async_trait::async_trait;
    use serde_json::json;

    struct Ops(Vec<Vec<Value>>);

    #[async_trait]
    impl PageSource for Ops {
        type Item = Value;

        async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Value>> {
            let idx: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let recs = self.0.get(idx).cloned().unwrap_or_default();
            let next = format!("https://h/ops?cursor={}", idx + 1);
            Ok(Page::new(recs, Some(next)))
        }
    }

    fn op(kind: &str, at: &str) -> Value {
        json!({"type": kind, "created_at": at})
    }

    #[test]
    fn year_window_is_half_open() {
        let w = window_for_year(2023).unwrap();
        assert_eq!(w.start.to_rfc3339(), "2023-01-01T00:00:00+00:00");
        assert_eq!(w.end.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
    }

    #[test]
    fn buckets() {
        assert_eq!(classify("manage_sell_offer"), Some(Bucket::Orders));
        assert_eq!(classify("create_passive_sell_offer"), Some(Bucket::Orders));
        assert_eq!(classify("path_payment_strict_send"), Some(Bucket::Swaps));
        assert_eq!(classify("payment"), Some(Bucket::Payments));
        assert_eq!(classify("change_trust"), Some(Bucket::Trustlines));
        assert_eq!(classify("create_account"), None);
    }

    #[tokio::test]
    async fn scan_counts_and_stops_before_window() {
        let src = Ops(vec![
            vec![
                op("payment", "2024-02-01T00:00:00Z"),
                op("payment", "2023-12-31T23:59:59Z"),
                op("manage_buy_offer", "2023-06-01T00:00:00Z"),
            ],
            vec![
                op("change_trust", "2023-01-01T00:00:00Z"),
                op("payment", "2022-12-31T23:59:59Z"),
                op("payment", "2022-06-01T00:00:00Z"),
            ],
            vec![op("payment", "2021-01-01T00:00:00Z")],
        ]);
        let cancel = CancellationToken::new();
        let mut seen = Vec::new();
        let stats = scan(&src, window_for_year(2023).unwrap(), &cancel, |p| seen.push(p.pages))
            .await
            .unwrap();
        assert_eq!(
            stats,
            YearStats {
                total: 4,
                orders: 1,
                swaps: 0,
                payments: 1,
                trustlines: 1
            }
        );
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn year_validation() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert!(validate_year(2023, now).is_ok());
        assert!(validate_year(2014, now).is_err());
        assert!(validate_year(2025, now).is_err());
    }
}
