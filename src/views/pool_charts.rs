//! Seven-day trade window of a liquidity pool, shown as tables.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{Section, View, ViewContext, ViewModel};
use crate::horizon::params;
use crate::paging::{fetch_all, HorizonCollection, Visit};
use crate::render::{DisplayLine, Segment};
use crate::types::TradeRecord;
use crate::util_text::{format_decimal, parse_f64, shorten};

pub const WINDOW_DAYS: i64 = 7;

#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub time: String,
    pub price: f64,
    pub volume: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// `BASE/COUNTER` of the first trade.
    pub pair: String,
    /// Oldest first.
    pub points: Vec<Point>,
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub volume: f64,
}

fn close_time(tr: &TradeRecord) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&tr.ledger_close_time)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Build the ascending series from newest-first trades. Trades without a
/// usable price are skipped.
pub fn series(newest_first: &[TradeRecord]) -> Option<Series> {
    let points: Vec<Point> = newest_first
        .iter()
        .rev()
        .filter_map(|tr| {
            Some(Point {
                time: tr.ledger_close_time.clone(),
                price: tr.price_f64()?,
                volume: parse_f64(&tr.base_amount).unwrap_or(0.0),
            })
        })
        .collect();
    let first = points.first()?.price;
    let last = points.last()?.price;
    let min = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let volume = points.iter().map(|p| p.volume).sum();
    let sample = newest_first.last()?;
    let code = |a: Option<crate::asset::Asset>| a.map(|a| a.code().to_string()).unwrap_or_default();
    Some(Series {
        pair: format!("{}/{}", code(sample.base_asset()), code(sample.counter_asset())),
        points,
        first,
        last,
        min,
        max,
        volume,
    })
}

pub(crate) fn series_sections(s: &Series) -> Vec<Section> {
    let fmt = |v: f64| format_decimal(v, 7);
    let change = if s.first > 0.0 {
        format!("{:+.2}%", (s.last - s.first) / s.first * 100.0)
    } else {
        "—".to_string()
    };
    let summary = vec![
        DisplayLine::text("Pair", s.pair.clone()),
        DisplayLine::text("Trades", s.points.len().to_string()),
        DisplayLine::text("First", fmt(s.first)),
        DisplayLine::text("Last", format!("{} ({change})", fmt(s.last))),
        DisplayLine::text("Min", fmt(s.min)),
        DisplayLine::text("Max", fmt(s.max)),
        DisplayLine::text("Volume", fmt(s.volume)),
    ];
    let rows = s
        .points
        .iter()
        .map(|p| DisplayLine::text(p.time.clone(), format!("{} · {}", fmt(p.price), fmt(p.volume))))
        .collect();
    vec![Section::new("Summary", summary), Section::new("Price · volume", rows)]
}

pub struct PoolChartsView {
    id: String,
}

impl PoolChartsView {
    pub fn new(id: &str) -> Self {
        PoolChartsView { id: id.to_string() }
    }
}

#[async_trait]
impl View for PoolChartsView {
    fn title(&self, ctx: &ViewContext) -> String {
        format!("{} · {}", ctx.t("view.charts"), shorten(&self.id))
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        let cutoff = Utc::now() - Duration::days(WINDOW_DAYS);
        let source: HorizonCollection<TradeRecord> = HorizonCollection::new(
            &ctx.horizon,
            format!("/liquidity_pools/{}/trades", self.id),
            params(&[("limit", "200"), ("order", "desc")]),
        );
        let trades = fetch_all(&source, &ctx.cancel, None, |tr: &TradeRecord| {
            match close_time(tr) {
                Some(t) if t < cutoff => Visit::Stop,
                Some(_) => Visit::Take,
                None => Visit::Skip,
            }
        })
        .await;
        let trades = match trades {
            Ok(t) => t,
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        };
        log::info!("[pool_charts] {} trades in window", trades.len());
        let back = Section::new("", vec![DisplayLine::new("", vec![Segment::Pool(self.id.clone())])]);
        match series(&trades) {
            Some(s) => {
                let mut sections = vec![back];
                sections.extend(series_sections(&s));
                ViewModel::ok(self.title(ctx), sections)
            }
            None => ViewModel::ok(self.title(ctx), vec![back])
                .with_notice(format!("No trades in the last {WINDOW_DAYS} days.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trade(time: &str, n: &str, d: &str, base: &str) -> TradeRecord {
        serde_json::from_value(json!({
            "id": time,
            "ledger_close_time": time,
            "base_amount": base,
            "base_asset_type": "native",
            "counter_amount": "1",
            "counter_asset_type": "credit_alphanum4",
            "counter_asset_code": "USDC",
            "counter_asset_issuer": "GISS",
            "price": {"n": n, "d": d}
        }))
        .unwrap()
    }

    #[test]
    fn series_is_ascending_with_summary() {
        let newest_first = vec![
            trade("2024-01-03T00:00:00Z", "3", "10", "5"),
            trade("2024-01-02T00:00:00Z", "1", "10", "2"),
            trade("2024-01-01T00:00:00Z", "2", "10", "1"),
        ];
        let s = series(&newest_first).unwrap();
        assert_eq!(s.pair, "XLM/USDC");
        assert_eq!(s.points[0].time, "2024-01-01T00:00:00Z");
        assert!((s.first - 0.2).abs() < 1e-12);
        assert!((s.last - 0.3).abs() < 1e-12);
        assert!((s.min - 0.1).abs() < 1e-12);
        assert!((s.max - 0.3).abs() < 1e-12);
        assert!((s.volume - 8.0).abs() < 1e-12);
        let sections = series_sections(&s);
        assert_eq!(sections[1].lines.len(), 3);
        assert!(sections[0].lines[3].plain().contains("(+50.00%)"));
    }

    #[test]
    fn empty_window_has_no_series() {
        assert!(series(&[]).is_none());
    }
}
