//! Horizon response records.
//!
//! Numeric amounts stay as the decimal strings Horizon returns; the few
//! fields we never read are left out and ignored on deserialize.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::Asset;

/// Records that can continue a paginated walk.
pub trait Paged {
    fn paging_token(&self) -> Option<&str>;
}

impl Paged for Value {
    fn paging_token(&self) -> Option<&str> {
        self.get("paging_token").and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<Link>,
    #[serde(default)]
    pub prev: Option<Link>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Embedded<T> {
    pub records: Vec<T>,
}

/// HAL collection page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Embedded<T>,
    #[serde(rename = "_links", default)]
    pub links: PageLinks,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, next_href: Option<String>) -> Self {
        Page {
            embedded: Embedded { records },
            links: PageLinks {
                next: next_href.map(|href| Link { href }),
                prev: None,
            },
        }
    }

    pub fn records(&self) -> &[T] {
        &self.embedded.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.embedded.records
    }

    pub fn next_href(&self) -> Option<&str> {
        self.links.next.as_ref().map(|l| l.href.as_str())
    }
}

/// Rational price. Trades report `n`/`d` as strings, offers as numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    #[serde(deserialize_with = "de_flexible_i64")]
    pub n: i64,
    #[serde(deserialize_with = "de_flexible_i64")]
    pub d: i64,
}

fn de_flexible_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    value_to_i64(&v).ok_or_else(|| serde::de::Error::custom(format!("expected integer, got {v}")))
}

impl Price {
    pub fn ratio(&self) -> String {
        format!("{}/{}", self.n, self.d)
    }

    pub fn as_f64(&self) -> Option<f64> {
        (self.d != 0).then(|| self.n as f64 / self.d as f64)
    }
}

// ---------------------------------------------------------------------------
// Accounts

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub low_threshold: u32,
    #[serde(default)]
    pub med_threshold: u32,
    #[serde(default)]
    pub high_threshold: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountFlags {
    #[serde(default)]
    pub auth_required: bool,
    #[serde(default)]
    pub auth_revocable: bool,
    #[serde(default)]
    pub auth_immutable: bool,
    #[serde(default)]
    pub auth_clawback_enabled: bool,
}

impl AccountFlags {
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.auth_required {
            out.push("auth_required");
        }
        if self.auth_revocable {
            out.push("auth_revocable");
        }
        if self.auth_immutable {
            out.push("auth_immutable");
        }
        if self.auth_clawback_enabled {
            out.push("auth_clawback_enabled");
        }
        out
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Balance {
    pub balance: String,
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
    #[serde(default)]
    pub liquidity_pool_id: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub buying_liabilities: Option<String>,
    #[serde(default)]
    pub selling_liabilities: Option<String>,
    #[serde(default)]
    pub is_authorized: Option<bool>,
    #[serde(default)]
    pub sponsor: Option<String>,
}

impl Balance {
    pub fn is_pool_share(&self) -> bool {
        self.asset_type == "liquidity_pool_shares"
    }

    /// The asset held, `None` for pool shares.
    pub fn asset(&self) -> Option<Asset> {
        match self.asset_type.as_str() {
            "native" => Some(Asset::Native),
            "liquidity_pool_shares" => None,
            _ => Some(Asset::credit(
                self.asset_code.clone()?,
                self.asset_issuer.clone()?,
            )),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Signer {
    pub key: String,
    pub weight: u32,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub sponsor: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    #[serde(default)]
    pub sequence: String,
    #[serde(default)]
    pub subentry_count: u32,
    #[serde(default)]
    pub num_sponsoring: u32,
    #[serde(default)]
    pub num_sponsored: u32,
    #[serde(default)]
    pub sponsor: Option<String>,
    #[serde(default)]
    pub home_domain: Option<String>,
    #[serde(default)]
    pub inflation_destination: Option<String>,
    #[serde(default)]
    pub last_modified_ledger: Option<u64>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub flags: AccountFlags,
    #[serde(default)]
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub signers: Vec<Signer>,
    /// Data entry name -> base64 value.
    #[serde(default)]
    pub data: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub paging_token: Option<String>,
}

impl Paged for AccountRecord {
    fn paging_token(&self) -> Option<&str> {
        self.paging_token.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Offers and trades

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(default)]
    pub seller: String,
    #[serde(default)]
    pub selling: Value,
    #[serde(default)]
    pub buying: Value,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub price_r: Option<Price>,
    #[serde(default)]
    pub last_modified_ledger: Option<u64>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
    #[serde(default)]
    pub sponsor: Option<String>,
}

impl OfferRecord {
    pub fn selling_asset(&self) -> Option<Asset> {
        Asset::from_horizon(&self.selling, "")
    }

    pub fn buying_asset(&self) -> Option<Asset> {
        Asset::from_horizon(&self.buying, "")
    }
}

impl Paged for OfferRecord {
    fn paging_token(&self) -> Option<&str> {
        self.paging_token.as_deref()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(default)]
    pub ledger_close_time: String,
    #[serde(default)]
    pub trade_type: Option<String>,
    #[serde(default)]
    pub base_offer_id: Option<String>,
    #[serde(default)]
    pub base_account: Option<String>,
    #[serde(default)]
    pub base_liquidity_pool_id: Option<String>,
    #[serde(default)]
    pub base_amount: String,
    #[serde(default)]
    pub base_asset_type: String,
    #[serde(default)]
    pub base_asset_code: Option<String>,
    #[serde(default)]
    pub base_asset_issuer: Option<String>,
    #[serde(default)]
    pub counter_offer_id: Option<String>,
    #[serde(default)]
    pub counter_account: Option<String>,
    #[serde(default)]
    pub counter_liquidity_pool_id: Option<String>,
    #[serde(default)]
    pub counter_amount: String,
    #[serde(default)]
    pub counter_asset_type: String,
    #[serde(default)]
    pub counter_asset_code: Option<String>,
    #[serde(default)]
    pub counter_asset_issuer: Option<String>,
    #[serde(default)]
    pub base_is_seller: Option<bool>,
    #[serde(default)]
    pub price: Option<Price>,
}

impl TradeRecord {
    fn asset(kind: &str, code: &Option<String>, issuer: &Option<String>) -> Option<Asset> {
        if kind == "native" {
            return Some(Asset::Native);
        }
        Some(Asset::credit(code.clone()?, issuer.clone()?))
    }

    pub fn base_asset(&self) -> Option<Asset> {
        Self::asset(&self.base_asset_type, &self.base_asset_code, &self.base_asset_issuer)
    }

    pub fn counter_asset(&self) -> Option<Asset> {
        Self::asset(
            &self.counter_asset_type,
            &self.counter_asset_code,
            &self.counter_asset_issuer,
        )
    }

    /// Counter per base, from the rational price.
    pub fn price_f64(&self) -> Option<f64> {
        self.price.as_ref().and_then(Price::as_f64)
    }
}

impl Paged for TradeRecord {
    fn paging_token(&self) -> Option<&str> {
        self.paging_token.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Liquidity pools

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PoolReserve {
    /// `native` or `CODE:ISSUER`
    pub asset: String,
    pub amount: String,
}

impl PoolReserve {
    pub fn asset_id(&self) -> Option<Asset> {
        Asset::from_canonical(&self.asset)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PoolRecord {
    pub id: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(default)]
    pub fee_bp: u32,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub total_trustlines: String,
    #[serde(default)]
    pub total_shares: String,
    #[serde(default)]
    pub reserves: Vec<PoolReserve>,
    #[serde(default)]
    pub last_modified_ledger: Option<u64>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
}

impl Paged for PoolRecord {
    fn paging_token(&self) -> Option<&str> {
        self.paging_token.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Order book and paths

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: String,
    pub amount: String,
    #[serde(default)]
    pub price_r: Option<Price>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathRecord {
    #[serde(default)]
    pub source_amount: String,
    #[serde(default)]
    pub destination_amount: String,
    #[serde(default)]
    pub path: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Ledgers, transactions, operations, effects

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub sequence: u64,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub prev_hash: Option<String>,
    #[serde(default)]
    pub closed_at: String,
    #[serde(default)]
    pub successful_transaction_count: u64,
    #[serde(default)]
    pub failed_transaction_count: Option<u64>,
    #[serde(default)]
    pub operation_count: u64,
    #[serde(default)]
    pub tx_set_operation_count: Option<u64>,
    #[serde(default)]
    pub total_coins: String,
    #[serde(default)]
    pub fee_pool: String,
    #[serde(default)]
    pub base_fee_in_stroops: u64,
    #[serde(default)]
    pub base_reserve_in_stroops: u64,
    #[serde(default)]
    pub max_tx_set_size: u64,
    #[serde(default)]
    pub protocol_version: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(default)]
    pub successful: bool,
    #[serde(default)]
    pub ledger: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub source_account: String,
    #[serde(default)]
    pub fee_account: Option<String>,
    #[serde(default)]
    pub fee_charged: String,
    #[serde(default)]
    pub max_fee: String,
    #[serde(default)]
    pub operation_count: u32,
    #[serde(default)]
    pub memo_type: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
}

impl Paged for TransactionRecord {
    fn paging_token(&self) -> Option<&str> {
        self.paging_token.as_deref()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetRecord {
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: String,
    #[serde(default)]
    pub asset_issuer: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(default)]
    pub num_accounts: Option<u64>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub accounts: Option<Value>,
    #[serde(default)]
    pub balances: Option<Value>,
    #[serde(default)]
    pub num_claimable_balances: Option<u64>,
    #[serde(default)]
    pub num_liquidity_pools: Option<u64>,
    #[serde(default)]
    pub num_contracts: Option<u64>,
    #[serde(default)]
    pub liquidity_pools_amount: Option<String>,
    #[serde(default)]
    pub contracts_amount: Option<String>,
    #[serde(default)]
    pub flags: AccountFlags,
}

impl AssetRecord {
    pub fn asset(&self) -> Asset {
        Asset::credit(self.asset_code.clone(), self.asset_issuer.clone())
    }

    /// Authorized holder count; newer Horizon reports it under `accounts`.
    pub fn holders(&self) -> Option<u64> {
        self.accounts
            .as_ref()
            .and_then(|a| a.get("authorized"))
            .and_then(Value::as_u64)
            .or(self.num_accounts)
    }

    /// Authorized supply; newer Horizon reports it under `balances`.
    pub fn supply(&self) -> Option<String> {
        self.balances
            .as_ref()
            .and_then(|b| b.get("authorized"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.amount.clone())
    }
}

impl Paged for AssetRecord {
    fn paging_token(&self) -> Option<&str> {
        self.paging_token.as_deref()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TradeAggregation {
    /// Bucket start, milliseconds since epoch (a string in Horizon).
    pub timestamp: Value,
    #[serde(default)]
    pub trade_count: Value,
    #[serde(default)]
    pub base_volume: String,
    #[serde(default)]
    pub counter_volume: String,
    #[serde(default)]
    pub avg: String,
    #[serde(default)]
    pub high: String,
    #[serde(default)]
    pub low: String,
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
}

fn value_to_i64(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
}

impl TradeAggregation {
    pub fn timestamp_ms(&self) -> Option<i64> {
        value_to_i64(&self.timestamp)
    }

    pub fn trades(&self) -> i64 {
        value_to_i64(&self.trade_count).unwrap_or(0)
    }
}
