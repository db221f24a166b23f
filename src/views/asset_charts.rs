//! OHLC buckets for a market, rendered as a table with a short summary.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::{Section, View, ViewContext, ViewModel};
use crate::asset::Asset;
use crate::counter_assets::{discover, pick_counter, CounterAsset};
use crate::error::{Result, StellarxError};
use crate::render::{DisplayLine, Segment};
use crate::router::Route;
use crate::types::{Page, TradeAggregation};
use crate::util_text::{format_decimal, parse_f64, DASH};

pub const BUCKET_LIMIT: u32 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Minute,
    FiveMinutes,
    FifteenMinutes,
    Hour,
    Day,
    Week,
}

impl Resolution {
    pub const ALL: [Resolution; 6] = [
        Resolution::Minute,
        Resolution::FiveMinutes,
        Resolution::FifteenMinutes,
        Resolution::Hour,
        Resolution::Day,
        Resolution::Week,
    ];

    pub fn millis(self) -> u64 {
        match self {
            Resolution::Minute => 60_000,
            Resolution::FiveMinutes => 300_000,
            Resolution::FifteenMinutes => 900_000,
            Resolution::Hour => 3_600_000,
            Resolution::Day => 86_400_000,
            Resolution::Week => 604_800_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::Minute => "1m",
            Resolution::FiveMinutes => "5m",
            Resolution::FifteenMinutes => "15m",
            Resolution::Hour => "1h",
            Resolution::Day => "1d",
            Resolution::Week => "1w",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|r| r.label() == s)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Hour
    }
}

/// Query for one page of buckets, newest first, ending before `end_time`.
pub fn aggregation_params(
    base: &Asset,
    counter: &Asset,
    resolution: Resolution,
    end_time: Option<i64>,
) -> Vec<(String, String)> {
    let mut q = base.query_params("base_");
    q.extend(counter.query_params("counter_"));
    q.push(("resolution".into(), resolution.millis().to_string()));
    q.push(("limit".into(), BUCKET_LIMIT.to_string()));
    q.push(("order".into(), "desc".into()));
    if let Some(end) = end_time {
        q.push(("end_time".into(), end.to_string()));
    }
    q
}

fn bucket_time(ms: Option<i64>, resolution: Resolution) -> String {
    let fmt = if resolution.millis() >= Resolution::Day.millis() {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M"
    };
    ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|t| t.format(fmt).to_string())
        .unwrap_or_else(|| DASH.to_string())
}

pub(crate) fn bucket_rows(buckets: &[TradeAggregation], resolution: Resolution) -> Vec<DisplayLine> {
    buckets
        .iter()
        .map(|b| {
            let num = |s: &str| parse_f64(s).map(|v| format_decimal(v, 7)).unwrap_or_else(|| DASH.into());
            DisplayLine::text(
                bucket_time(b.timestamp_ms(), resolution),
                format!("{} · {} · {}", num(&b.avg), num(&b.base_volume), b.trades()),
            )
        })
        .collect()
}

/// Close of the newest bucket, range and totals across what is loaded.
pub(crate) fn summary_lines(newest_first: &[TradeAggregation]) -> Vec<DisplayLine> {
    let highs = newest_first.iter().filter_map(|b| parse_f64(&b.high));
    let lows = newest_first.iter().filter_map(|b| parse_f64(&b.low));
    let high = highs.fold(f64::NEG_INFINITY, f64::max);
    let low = lows.fold(f64::INFINITY, f64::min);
    let volume: f64 = newest_first.iter().filter_map(|b| parse_f64(&b.base_volume)).sum();
    let trades: i64 = newest_first.iter().map(TradeAggregation::trades).sum();
    let last = newest_first
        .first()
        .and_then(|b| parse_f64(&b.close))
        .map(|v| format_decimal(v, 7))
        .unwrap_or_else(|| DASH.into());
    vec![
        DisplayLine::text("Last", last),
        DisplayLine::text("High", format_decimal(high, 7)),
        DisplayLine::text("Low", format_decimal(low, 7)),
        DisplayLine::text("Volume", format_decimal(volume, 7)),
        DisplayLine::text("Trades", trades.to_string()),
    ]
}

pub struct ChartsView {
    base: Asset,
    requested: Option<Asset>,
    counters: Vec<CounterAsset>,
    counter: Option<Asset>,
    resolution: Resolution,
    buckets: Vec<TradeAggregation>,
    exhausted: bool,
    error: Option<String>,
}

impl ChartsView {
    pub fn new(base: Asset, counter: Option<Asset>) -> Self {
        ChartsView {
            base,
            requested: counter,
            counters: Vec::new(),
            counter: None,
            resolution: Resolution::default(),
            buckets: Vec::new(),
            exhausted: false,
            error: None,
        }
    }

    /// Fetch the next page, older than anything loaded so far.
    async fn fetch_page(&mut self, ctx: &ViewContext) -> Result<usize> {
        let Some(counter) = self.counter.clone() else {
            self.exhausted = true;
            return Ok(0);
        };
        let end = self.buckets.last().and_then(TradeAggregation::timestamp_ms);
        let q = aggregation_params(&self.base, &counter, self.resolution, end);
        let page: Page<TradeAggregation> = ctx
            .guard(ctx.horizon.get_path("/trade_aggregations", &q))
            .await?;
        let records = page.into_records();
        let n = records.len();
        if n == 0 || n < BUCKET_LIMIT as usize {
            self.exhausted = true;
        }
        self.buckets.extend(records);
        Ok(n)
    }

    fn reset(&mut self) {
        self.buckets.clear();
        self.exhausted = false;
        self.error = None;
    }

    fn model(&self, ctx: &ViewContext) -> ViewModel {
        let mut head = vec![DisplayLine::new(ctx.t("view.asset"), vec![Segment::Asset(self.base.clone())])];
        if let Some(c) = &self.counter {
            head.push(DisplayLine::new("Counter", vec![Segment::Asset(c.clone())]));
        }
        head.push(DisplayLine::text("Resolution", self.resolution.label()));
        let markets: Vec<Segment> = self
            .counters
            .iter()
            .take(10)
            .enumerate()
            .flat_map(|(i, c)| {
                let href = Route::AssetCharts {
                    asset: self.base.clone(),
                    counter: Some(c.asset.clone()),
                }
                .path();
                let sep = (i > 0).then(|| Segment::text(" · "));
                sep.into_iter().chain(std::iter::once(Segment::Link {
                    label: c.asset.code().to_string(),
                    href,
                }))
            })
            .collect();
        if !markets.is_empty() {
            head.push(DisplayLine::new("Markets", markets));
        }
        let mut sections = vec![Section::new("", head)];
        let mut vm = if self.counter.is_none() {
            ViewModel::ok(self.title(ctx), sections).with_notice("No markets found for this asset.")
        } else if self.buckets.is_empty() {
            ViewModel::ok(self.title(ctx), sections).with_notice("No trades for this market.")
        } else {
            sections.push(Section::new("Summary", summary_lines(&self.buckets)));
            sections.push(Section::new(
                "Time · avg · volume · trades",
                bucket_rows(&self.buckets, self.resolution),
            ));
            ViewModel::ok(self.title(ctx), sections).with_more(!self.exhausted)
        };
        vm.error = self.error.clone();
        vm
    }
}

#[async_trait]
impl View for ChartsView {
    fn title(&self, ctx: &ViewContext) -> String {
        match &self.counter {
            Some(c) => format!("{} · {}/{}", ctx.t("view.charts"), self.base.code(), c.code()),
            None => format!("{} · {}", ctx.t("view.charts"), self.base.code()),
        }
    }

    async fn load(&mut self, ctx: &ViewContext) -> ViewModel {
        match discover(&ctx.horizon, &self.base, &ctx.cancel).await {
            Ok(found) => self.counters = found,
            Err(e) if self.requested.is_some() && !e.is_cancelled() => {
                log::warn!("[charts] counter discovery failed: {e}");
            }
            Err(e) => return ViewModel::failed(self.title(ctx), &e),
        }
        let requested = self.requested.as_ref().map(Asset::canonical);
        self.counter = pick_counter(&self.counters, requested.as_deref(), &self.base);
        self.reset();
        match self.fetch_page(ctx).await {
            Ok(_) => self.model(ctx),
            Err(e) => ViewModel::failed(self.title(ctx), &e),
        }
    }

    async fn load_more(&mut self, ctx: &ViewContext) -> ViewModel {
        if self.exhausted {
            return self.model(ctx);
        }
        self.error = match self.fetch_page(ctx).await {
            Ok(_) => None,
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(e.user_message()),
        };
        self.model(ctx)
    }

    fn filter_prompt(&self) -> Option<&'static str> {
        Some("Resolution (1m 5m 15m 1h 1d 1w) or counter CODE-ISSUER")
    }

    async fn apply_filter(&mut self, ctx: &ViewContext, input: &str) -> Result<ViewModel> {
        if let Some(r) = Resolution::parse(input) {
            self.resolution = r;
        } else {
            let counter = Asset::parse(input.trim())?;
            if counter == self.base {
                return Err(StellarxError::Validation("counter must differ from the base asset".into()));
            }
            self.counter = Some(counter);
        }
        self.reset();
        Ok(match self.fetch_page(ctx).await {
            Ok(_) => self.model(ctx),
            Err(e) => ViewModel::failed(self.title(ctx), &e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket(ts: i64, avg: &str, high: &str, low: &str, close: &str, vol: &str, n: &str) -> TradeAggregation {
        serde_json::from_value(json!({
            "timestamp": ts.to_string(),
            "trade_count": n,
            "base_volume": vol,
            "counter_volume": "0",
            "avg": avg,
            "high": high,
            "low": low,
            "open": avg,
            "close": close
        }))
        .unwrap()
    }

    #[test]
    fn resolutions_parse_by_label() {
        assert_eq!(Resolution::parse(" 15M "), Some(Resolution::FifteenMinutes));
        assert_eq!(Resolution::parse("2h"), None);
        assert_eq!(Resolution::default().millis(), 3_600_000);
    }

    #[test]
    fn params_page_backwards_from_end_time() {
        let usdc = Asset::credit("USDC", "GISS");
        let q = aggregation_params(&Asset::Native, &usdc, Resolution::Day, Some(1_700_000_000_000));
        let get = |k: &str| q.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("base_asset_type"), Some("native"));
        assert_eq!(get("counter_asset_code"), Some("USDC"));
        assert_eq!(get("resolution"), Some("86400000"));
        assert_eq!(get("order"), Some("desc"));
        assert_eq!(get("end_time"), Some("1700000000000"));
    }

    #[test]
    fn rows_and_summary() {
        let buckets = vec![
            bucket(1_704_153_600_000, "0.12", "0.13", "0.11", "0.125", "100", "4"),
            bucket(1_704_067_200_000, "0.10", "0.11", "0.09", "0.105", "50", "2"),
        ];
        let rows = bucket_rows(&buckets, Resolution::Day);
        assert_eq!(rows[0].plain(), "2024-01-02: 0.12 · 100 · 4");
        let summary: Vec<String> = summary_lines(&buckets).iter().map(DisplayLine::plain).collect();
        assert_eq!(
            summary,
            vec!["Last: 0.125", "High: 0.13", "Low: 0.09", "Volume: 150", "Trades: 6"]
        );
    }
}
