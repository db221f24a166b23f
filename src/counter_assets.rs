//! Discover which assets trade against a given asset.
//!
//! Two sources are scanned side by side: liquidity pools holding the asset
//! and open offers selling it. Each side is capped so a popular asset does
//! not turn into hundreds of requests.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::asset::Asset;
use crate::error::{Result, StellarxError};
use crate::horizon::{params, HorizonClient};
use crate::paging::{fetch_all_partial, HorizonCollection, PageSource, Visit};
use crate::types::{OfferRecord, PoolRecord};

pub const MAX_DISCOVERY_PAGES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterAsset {
    pub asset: Asset,
    pub count: usize,
}

/// Tally of counter assets keyed by canonical id.
#[derive(Debug, Default)]
pub struct Tally {
    seen: HashMap<String, CounterAsset>,
}

impl Tally {
    pub fn add(&mut self, asset: Asset) {
        self.seen
            .entry(asset.canonical())
            .and_modify(|c| c.count += 1)
            .or_insert(CounterAsset { asset, count: 1 });
    }

    /// Native first, then by occurrences, then by code.
    pub fn into_sorted(self) -> Vec<CounterAsset> {
        let mut out: Vec<CounterAsset> = self.seen.into_values().collect();
        out.sort_by(|a, b| {
            b.asset
                .is_native()
                .cmp(&a.asset.is_native())
                .then(b.count.cmp(&a.count))
                .then_with(|| a.asset.code().cmp(b.asset.code()))
                .then_with(|| a.asset.issuer().cmp(&b.asset.issuer()))
        });
        out
    }
}

fn pool_counterparts(pool: &PoolRecord, base: &Asset) -> Vec<Asset> {
    pool.reserves
        .iter()
        .filter_map(|r| r.asset_id())
        .filter(|a| a != base)
        .collect()
}

fn offer_counterpart(offer: &OfferRecord, base: &Asset) -> Option<Asset> {
    offer.buying_asset().filter(|a| a != base)
}

/// First-page failures are errors; later failures keep what was gathered.
fn settle<T>(side: &str, (records, err): (Vec<T>, Option<StellarxError>)) -> Result<Vec<T>> {
    match err {
        Some(e) if records.is_empty() => Err(e),
        Some(e) => {
            log::warn!("[counter_assets] {side} scan cut short: {e}");
            Ok(records)
        }
        None => Ok(records),
    }
}

/// Merge pool and offer results into the sorted counter list.
pub async fn discover_from<P, O>(
    base: &Asset,
    pools: &P,
    offers: &O,
    cancel: &CancellationToken,
) -> Result<Vec<CounterAsset>>
where
    P: PageSource<Item = PoolRecord> + ?Sized,
    O: PageSource<Item = OfferRecord> + ?Sized,
{
    let (pool_side, offer_side) = tokio::join!(
        fetch_all_partial(pools, cancel, Some(MAX_DISCOVERY_PAGES), |_| Visit::Take),
        fetch_all_partial(offers, cancel, Some(MAX_DISCOVERY_PAGES), |_| Visit::Take),
    );
    let pools = settle("pools", pool_side)?;
    let offers = settle("offers", offer_side)?;

    let mut tally = Tally::default();
    for pool in &pools {
        for a in pool_counterparts(pool, base) {
            tally.add(a);
        }
    }
    for offer in &offers {
        if let Some(a) = offer_counterpart(offer, base) {
            tally.add(a);
        }
    }
    let out = tally.into_sorted();
    log::debug!(
        "[counter_assets] {} pools, {} offers, {} counters",
        pools.len(),
        offers.len(),
        out.len()
    );
    Ok(out)
}

pub async fn discover(
    client: &HorizonClient,
    base: &Asset,
    cancel: &CancellationToken,
) -> Result<Vec<CounterAsset>> {
    let id = base.canonical();
    let pools: HorizonCollection<PoolRecord> = HorizonCollection::new(
        client,
        "/liquidity_pools",
        params(&[("reserves", id.as_str()), ("limit", "200"), ("order", "asc")]),
    );
    let offers: HorizonCollection<OfferRecord> = HorizonCollection::new(
        client,
        "/offers",
        params(&[("selling", id.as_str()), ("limit", "200"), ("order", "desc")]),
    );
    discover_from(base, &pools, &offers, cancel).await
}

/// Counter to preselect: the requested one when valid, else the top entry.
pub fn pick_counter(found: &[CounterAsset], requested: Option<&str>, base: &Asset) -> Option<Asset> {
    if let Some(req) = requested {
        if let Ok(a) = Asset::parse(req) {
            if &a != base {
                return Some(a);
            }
        }
    }
    found.first().map(|c| c.asset.clone())
}
