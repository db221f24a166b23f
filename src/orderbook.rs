//! Order-book depth, price grouping and swap quotes.

use futures::future::join_all;

use crate::asset::Asset;
use crate::error::{Result, StellarxError};
use crate::horizon::HorizonClient;
use crate::types::{OrderBook, PriceLevel};
use crate::util_text::parse_f64;

pub const BOOK_LIMIT: u32 = 200;

/// Grouping tolerance for prices sitting on a bucket edge.
const EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Level {
    pub price: f64,
    pub amount: f64,
}

/// Parse Horizon levels, dropping anything non-numeric or non-positive.
pub fn parse_levels(raw: &[PriceLevel]) -> Vec<Level> {
    raw.iter()
        .filter_map(|l| {
            let price = parse_f64(&l.price)?;
            let amount = parse_f64(&l.amount)?;
            (price > 0.0 && amount >= 0.0).then_some(Level { price, amount })
        })
        .collect()
}

/// Best price first: bids high to low, asks low to high.
fn sort_best_first(levels: &mut [Level], side: Side) {
    match side {
        Side::Bid => levels.sort_by(|a, b| b.price.total_cmp(&a.price)),
        Side::Ask => levels.sort_by(|a, b| a.price.total_cmp(&b.price)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthPoint {
    pub price: f64,
    pub cumulative: f64,
}

/// Cumulative depth walking away from the spread. Both sides come back
/// price-ascending so they can share an x axis.
pub fn depth_curve(levels: &[Level], side: Side) -> Vec<DepthPoint> {
    let mut sorted = levels.to_vec();
    sort_best_first(&mut sorted, side);
    let mut acc = 0.0;
    let mut out: Vec<DepthPoint> = sorted
        .iter()
        .map(|l| {
            acc += l.amount;
            DepthPoint {
                price: l.price,
                cumulative: acc,
            }
        })
        .collect();
    if side == Side::Bid {
        out.reverse();
    }
    out
}

/// Roughly half a percent of `mid`, snapped to 1, 2 or 5 times a power of ten.
pub fn auto_step(mid: f64) -> Option<f64> {
    if !mid.is_finite() || mid <= 0.0 {
        return None;
    }
    let target = mid * 0.005;
    let base = 10f64.powi(target.log10().floor() as i32);
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * base)
        .min_by(|a, b| (a - target).abs().total_cmp(&(b - target).abs()))
}

fn bucket_index(price: f64, step: f64, side: Side) -> i64 {
    let r = price / step;
    match side {
        Side::Bid => (r + EPS).floor() as i64,
        Side::Ask => (r - EPS).ceil() as i64,
    }
}

/// Merge levels into `step`-wide buckets: bids round down, asks round up.
pub fn group_levels(levels: &[Level], step: f64, side: Side) -> Vec<Level> {
    if !(step > 0.0) {
        let mut out = levels.to_vec();
        sort_best_first(&mut out, side);
        return out;
    }
    let mut buckets: Vec<(i64, f64)> = Vec::new();
    for l in levels {
        let idx = bucket_index(l.price, step, side);
        match buckets.iter_mut().find(|(i, _)| *i == idx) {
            Some((_, amt)) => *amt += l.amount,
            None => buckets.push((idx, l.amount)),
        }
    }
    let mut out: Vec<Level> = buckets
        .into_iter()
        .map(|(i, amount)| Level {
            price: i as f64 * step,
            amount,
        })
        .collect();
    sort_best_first(&mut out, side);
    out
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    pub price: f64,
    pub amount: f64,
    pub total: f64,
}

/// Table rows with running totals from the best price outward. Asks are
/// flipped so the best ask sits right above the spread row.
pub fn display_rows(grouped: &[Level], side: Side) -> Vec<Row> {
    let mut sorted = grouped.to_vec();
    sort_best_first(&mut sorted, side);
    let mut acc = 0.0;
    let mut rows: Vec<Row> = sorted
        .iter()
        .map(|l| {
            acc += l.amount;
            Row {
                price: l.price,
                amount: l.amount,
                total: acc,
            }
        })
        .collect();
    if side == Side::Ask {
        rows.reverse();
    }
    rows
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spread {
    pub best_bid: f64,
    pub best_ask: f64,
    pub absolute: f64,
    pub percent: f64,
    pub mid: f64,
}

pub fn spread(bids: &[Level], asks: &[Level]) -> Option<Spread> {
    let best_bid = bids.iter().map(|l| l.price).max_by(f64::total_cmp)?;
    let best_ask = asks.iter().map(|l| l.price).min_by(f64::total_cmp)?;
    let mid = (best_bid + best_ask) / 2.0;
    let absolute = best_ask - best_bid;
    let percent = if mid > 0.0 { absolute / mid * 100.0 } else { 0.0 };
    Some(Spread {
        best_bid,
        best_ask,
        absolute,
        percent,
        mid,
    })
}

/// Parse a user-entered grouping step.
pub fn validate_step(raw: &str) -> Result<f64> {
    match parse_f64(raw.trim()) {
        Some(v) if v > 0.0 => Ok(v),
        _ => Err(StellarxError::Validation(format!(
            "step must be a positive number, got '{}'",
            raw.trim()
        ))),
    }
}

/// Both sides parsed and grouped, with the spread.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedBook {
    pub step: Option<f64>,
    pub bids: Vec<Row>,
    pub asks: Vec<Row>,
    pub spread: Option<Spread>,
}

/// Group a Horizon book. Without an explicit step one is derived from mid.
pub fn group_book(book: &OrderBook, step: Option<f64>) -> GroupedBook {
    let bids = parse_levels(&book.bids);
    let asks = parse_levels(&book.asks);
    let spread = spread(&bids, &asks);
    let step = step.or_else(|| spread.and_then(|s| auto_step(s.mid)));
    let (gb, ga) = match step {
        Some(s) => (group_levels(&bids, s, Side::Bid), group_levels(&asks, s, Side::Ask)),
        None => (bids, asks),
    };
    GroupedBook {
        step,
        bids: display_rows(&gb, Side::Bid),
        asks: display_rows(&ga, Side::Ask),
        spread,
    }
}

// ---------------------------------------------------------------------------
// Swap quotes

pub const STABLECOINS: &[&str] = &[
    "USDC", "USDT", "EURC", "EURT", "USD", "EUR", "PYUSD", "BRL", "ARST", "YUSDC",
];

pub fn is_stablecoin(asset: &Asset) -> bool {
    !asset.is_native()
        && STABLECOINS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(asset.code()))
}

/// Amounts to quote for `asset`: larger sizes for dollar-ish assets.
pub fn quote_ladder(asset: &Asset) -> &'static [&'static str] {
    if is_stablecoin(asset) {
        &["10", "100", "1000", "10000"]
    } else {
        &["1", "10", "100", "1000"]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Quote {
    Filled {
        send: String,
        receive: String,
        /// Destination units per source unit.
        price: f64,
        hops: usize,
    },
    NoRoute {
        send: String,
    },
}

impl Quote {
    pub fn send(&self) -> &str {
        match self {
            Quote::Filled { send, .. } | Quote::NoRoute { send } => send,
        }
    }
}

/// Pick the path with the largest destination amount.
pub fn best_quote(send: &str, paths: &[crate::types::PathRecord]) -> Quote {
    let best = paths
        .iter()
        .filter_map(|p| parse_f64(&p.destination_amount).map(|d| (d, p)))
        .max_by(|a, b| a.0.total_cmp(&b.0));
    match (best, parse_f64(send)) {
        (Some((dest, p)), Some(src)) if src > 0.0 => Quote::Filled {
            send: send.to_string(),
            receive: p.destination_amount.clone(),
            price: dest / src,
            hops: p.path.len(),
        },
        _ => Quote::NoRoute {
            send: send.to_string(),
        },
    }
}

pub async fn quote(
    client: &HorizonClient,
    from: &Asset,
    to: &Asset,
    amount: &str,
) -> Result<Quote> {
    let paths = client.strict_send_paths(from, amount, to).await?;
    Ok(best_quote(amount, &paths))
}

/// One quote per ladder size, all in flight together.
pub async fn quote_ladder_for(
    client: &HorizonClient,
    from: &Asset,
    to: &Asset,
) -> Vec<Result<Quote>> {
    let sizes = quote_ladder(from);
    join_all(sizes.iter().map(|amt| quote(client, from, to, amt))).await
}

#[derive(Debug, Default)]
pub struct SwapQuotes {
    pub sell: Vec<Result<Quote>>,
    pub buy: Vec<Result<Quote>>,
}

/// Quotes base→counter and counter→base concurrently.
pub async fn swap_quotes(client: &HorizonClient, base: &Asset, counter: &Asset) -> SwapQuotes {
    let (sell, buy) = tokio::join!(
        quote_ladder_for(client, base, counter),
        quote_ladder_for(client, counter, base),
    );
    SwapQuotes { sell, buy }
}
