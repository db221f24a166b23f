//! Account snapshot: balances, reserve estimate and pool-share breakdown.
//!
//! All arithmetic runs on integer stroops; values are formatted back to
//! decimals only for display.

use std::collections::HashMap;

use futures::future::join_all;

use crate::asset::Asset;
use crate::data_value::{decode_value, DecodedValue};
use crate::horizon::HorizonClient;
use crate::types::{AccountFlags, AccountRecord, Balance, PoolRecord, Signer, Thresholds};
use crate::util_text::{format_stroops, stroops_from_decimal};

/// Half an XLM per base-reserve entry.
pub const BASE_RESERVE_STROOPS: i64 = 5_000_000;

/// Entries the minimum balance is charged for, never below zero.
pub fn reserve_entries(subentries: u32, sponsoring: u32, sponsored: u32) -> i64 {
    (2 + i64::from(subentries) + i64::from(sponsoring) - i64::from(sponsored)).max(0)
}

pub fn min_reserve_stroops(acct: &AccountRecord) -> i64 {
    reserve_entries(acct.subentry_count, acct.num_sponsoring, acct.num_sponsored)
        * BASE_RESERVE_STROOPS
}

/// Spendable XLM estimate: balance less reserve and selling liabilities.
pub fn available_stroops(balance: i64, reserve: i64, selling_liabilities: i64) -> i64 {
    (balance - reserve - selling_liabilities).max(0)
}

/// Holder's slice of one pool reserve, in stroops. Zero for an empty pool.
pub fn implied_share(reserve_amount: &str, holder_shares: &str, total_shares: &str) -> Option<i64> {
    let reserve = i128::from(stroops_from_decimal(reserve_amount)?);
    let held = i128::from(stroops_from_decimal(holder_shares)?);
    let total = i128::from(stroops_from_decimal(total_shares)?);
    if total == 0 {
        return Some(0);
    }
    i64::try_from(reserve * held / total).ok()
}

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceLine {
    pub asset: Asset,
    pub balance: String,
    pub limit: Option<String>,
    pub buying_liabilities: Option<String>,
    pub selling_liabilities: Option<String>,
    pub authorized: Option<bool>,
    pub sponsor: Option<String>,
}

impl BalanceLine {
    fn from_balance(b: &Balance) -> Option<Self> {
        Some(BalanceLine {
            asset: b.asset()?,
            balance: b.balance.clone(),
            limit: b.limit.clone(),
            buying_liabilities: b.buying_liabilities.clone(),
            selling_liabilities: b.selling_liabilities.clone(),
            authorized: b.is_authorized,
            sponsor: b.sponsor.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReserveShare {
    pub asset: Asset,
    /// Decimal string.
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PoolShareLine {
    pub pool_id: String,
    pub shares: String,
    /// Filled once the pool is in the cache.
    pub implied: Vec<ReserveShare>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataEntry {
    pub name: String,
    pub raw: String,
    pub decoded: Option<DecodedValue>,
}

/// Pools looked up while a view is open. Entries are never evicted.
#[derive(Debug, Default)]
pub struct PoolCache {
    pools: HashMap<String, PoolRecord>,
}

impl PoolCache {
    pub fn get(&self, id: &str) -> Option<&PoolRecord> {
        self.pools.get(id)
    }

    pub fn insert(&mut self, pool: PoolRecord) {
        self.pools.insert(pool.id.clone(), pool);
    }

    pub fn missing<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for id in ids {
            if !self.pools.contains_key(id) && !out.iter().any(|o| o == id) {
                out.push(id.to_string());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Fetch every id not yet cached, concurrently. Failed lookups are
    /// logged and left out.
    pub async fn fill(&mut self, client: &HorizonClient, ids: &[String]) {
        let todo = self.missing(ids.iter().map(String::as_str));
        if todo.is_empty() {
            return;
        }
        let results = join_all(todo.iter().map(|id| client.liquidity_pool(id))).await;
        for (id, res) in todo.iter().zip(results) {
            match res {
                Ok(pool) => self.insert(pool),
                Err(e) => log::warn!("[account] pool {id} lookup failed: {e}"),
            }
        }
    }
}

/// Holder's share of each reserve of `pool`.
pub fn pool_breakdown(pool: &PoolRecord, shares: &str) -> Vec<ReserveShare> {
    pool.reserves
        .iter()
        .filter_map(|r| {
            let asset = r.asset_id()?;
            let amt = implied_share(&r.amount, shares, &pool.total_shares)?;
            Some(ReserveShare {
                asset,
                amount: format_stroops(amt),
            })
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct AccountSummary {
    pub account_id: String,
    pub sequence: String,
    pub home_domain: Option<String>,
    pub sponsor: Option<String>,
    pub subentry_count: u32,
    pub num_sponsoring: u32,
    pub num_sponsored: u32,
    pub thresholds: Thresholds,
    pub flags: AccountFlags,
    pub signers: Vec<Signer>,
    pub native: Option<BalanceLine>,
    pub credit: Vec<BalanceLine>,
    pub pools: Vec<PoolShareLine>,
    pub data: Vec<DataEntry>,
    pub reserve_stroops: i64,
    pub available_stroops: Option<i64>,
}

impl AccountSummary {
    pub fn from_record(acct: &AccountRecord) -> Self {
        let mut native = None;
        let mut credit = Vec::new();
        let mut pools = Vec::new();
        for b in &acct.balances {
            if b.is_pool_share() {
                if let Some(id) = &b.liquidity_pool_id {
                    pools.push(PoolShareLine {
                        pool_id: id.clone(),
                        shares: b.balance.clone(),
                        implied: Vec::new(),
                    });
                }
                continue;
            }
            match BalanceLine::from_balance(b) {
                Some(line) if line.asset.is_native() => native = Some(line),
                Some(line) => credit.push(line),
                None => log::debug!("[account] skipping balance of type {}", b.asset_type),
            }
        }

        let reserve = min_reserve_stroops(acct);
        let available = native.as_ref().and_then(|n: &BalanceLine| {
            let bal = stroops_from_decimal(&n.balance)?;
            let liab = n
                .selling_liabilities
                .as_deref()
                .and_then(stroops_from_decimal)
                .unwrap_or(0);
            Some(available_stroops(bal, reserve, liab))
        });

        let data = acct
            .data
            .iter()
            .map(|(name, raw)| DataEntry {
                name: name.clone(),
                raw: raw.clone(),
                decoded: decode_value(raw),
            })
            .collect();

        AccountSummary {
            account_id: acct.account_id.clone(),
            sequence: acct.sequence.clone(),
            home_domain: acct.home_domain.clone().filter(|d| !d.is_empty()),
            sponsor: acct.sponsor.clone(),
            subentry_count: acct.subentry_count,
            num_sponsoring: acct.num_sponsoring,
            num_sponsored: acct.num_sponsored,
            thresholds: acct.thresholds.clone(),
            flags: acct.flags.clone(),
            signers: acct.signers.clone(),
            native,
            credit,
            pools,
            data,
            reserve_stroops: reserve,
            available_stroops: available,
        }
    }

    pub fn pool_ids(&self) -> Vec<String> {
        self.pools.iter().map(|p| p.pool_id.clone()).collect()
    }

    /// Attach implied reserves for every pool present in `cache`.
    pub fn apply_pools(&mut self, cache: &PoolCache) {
        for line in &mut self.pools {
            if let Some(pool) = cache.get(&line.pool_id) {
                line.implied = pool_breakdown(pool, &line.shares);
            }
        }
    }

    pub fn reserve_display(&self) -> String {
        format_stroops(self.reserve_stroops)
    }

    pub fn available_display(&self) -> Option<String> {
        self.available_stroops.map(format_stroops)
    }
}
