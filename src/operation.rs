//! Normalisation of operation records into one typed model.
//!
//! Operations reach us in two JSON shapes:
//! - Horizon records (`/operations`): flat snake_case fields keyed by `type`,
//!   decimal amounts.
//! - XDR JSON (decoded envelopes): `{ "body": { "<kind>": { … } } }`, stroop
//!   amounts, nested asset/account enums, camelCase or snake_case names.
//!
//! `normalize` picks the shape once per record and reads every field with
//! that shape's names only. Everything downstream (formatter, stats) sees
//! `OperationRecord`.

use serde_json::Value;

use crate::asset::{account_from_xdr, Asset};
use crate::data_value::Encoding;
use crate::util_text::format_stroop;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Horizon,
    Xdr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrustLine {
    Asset(Option<Asset>),
    Pool(Option<String>),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct OfferFields {
    pub offer_id: Option<String>,
    pub amount: Option<String>,
    pub selling: Option<Asset>,
    pub buying: Option<Asset>,
    /// `n/d` when the rational form is known, else Horizon's decimal price.
    pub price: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Claimant {
    pub destination: Option<String>,
    pub predicate: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignerChange {
    pub key: Option<String>,
    pub weight: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReserveAmount {
    pub asset: Option<Asset>,
    pub amount: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataValueField {
    pub raw: String,
    pub encoding: Encoding,
}

/// What a `revoke_sponsorship` operation targets.
#[derive(Clone, Debug, PartialEq)]
pub enum RevokeTarget {
    Offer {
        offer_id: String,
        seller: Option<String>,
    },
    ClaimableBalance {
        balance_id: String,
    },
    LiquidityPool {
        pool_id: String,
        account: Option<String>,
    },
    Data {
        account: Option<String>,
        name: String,
    },
    Signer {
        account: Option<String>,
        key: String,
    },
    TrustLine {
        account: Option<String>,
        asset: Option<Asset>,
    },
    Account {
        account: String,
    },
    Unresolved(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    CreateAccount {
        destination: Option<String>,
        starting_balance: Option<String>,
    },
    Payment {
        destination: Option<String>,
        asset: Option<Asset>,
        amount: Option<String>,
    },
    PathPaymentStrictReceive {
        destination: Option<String>,
        dest_asset: Option<Asset>,
        dest_amount: Option<String>,
        send_asset: Option<Asset>,
        send_max: Option<String>,
        path: Vec<Asset>,
    },
    PathPaymentStrictSend {
        destination: Option<String>,
        send_asset: Option<Asset>,
        send_amount: Option<String>,
        dest_asset: Option<Asset>,
        dest_min: Option<String>,
        path: Vec<Asset>,
    },
    ManageSellOffer(OfferFields),
    ManageBuyOffer(OfferFields),
    CreatePassiveSellOffer(OfferFields),
    SetOptions {
        inflation_dest: Option<String>,
        home_domain: Option<String>,
        master_weight: Option<u32>,
        low_threshold: Option<u32>,
        med_threshold: Option<u32>,
        high_threshold: Option<u32>,
        set_flags: Option<String>,
        clear_flags: Option<String>,
        signer: Option<SignerChange>,
    },
    ChangeTrust {
        line: TrustLine,
        limit: Option<String>,
    },
    AllowTrust {
        trustor: Option<String>,
        asset: Option<Asset>,
        asset_code: Option<String>,
        authorize: Option<String>,
    },
    AccountMerge {
        destination: Option<String>,
    },
    Inflation,
    ManageData {
        name: Option<String>,
        value: Option<DataValueField>,
    },
    BumpSequence {
        bump_to: Option<String>,
    },
    CreateClaimableBalance {
        asset: Option<Asset>,
        amount: Option<String>,
        claimants: Vec<Claimant>,
    },
    ClaimClaimableBalance {
        balance_id: Option<String>,
    },
    BeginSponsoringFutureReserves {
        sponsored_id: Option<String>,
    },
    EndSponsoringFutureReserves {
        begin_sponsor: Option<String>,
    },
    RevokeSponsorship(RevokeTarget),
    Clawback {
        from: Option<String>,
        asset: Option<Asset>,
        amount: Option<String>,
    },
    ClawbackClaimableBalance {
        balance_id: Option<String>,
    },
    SetTrustLineFlags {
        trustor: Option<String>,
        asset: Option<Asset>,
        set_flags: Option<String>,
        clear_flags: Option<String>,
    },
    LiquidityPoolDeposit {
        pool_id: Option<String>,
        max_amounts: Vec<ReserveAmount>,
        min_price: Option<String>,
        max_price: Option<String>,
        deposited: Vec<ReserveAmount>,
        shares_received: Option<String>,
    },
    LiquidityPoolWithdraw {
        pool_id: Option<String>,
        shares: Option<String>,
        min_amounts: Vec<ReserveAmount>,
        received: Vec<ReserveAmount>,
    },
    /// Any other kind (Soroban ops included); rendered as a JSON dump.
    Unknown {
        raw: Value,
    },
}

/// One operation, normalised.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationRecord {
    pub type_tag: String,
    pub shape: Shape,
    pub id: Option<String>,
    pub paging_token: Option<String>,
    pub source_account: Option<String>,
    pub created_at: Option<String>,
    pub transaction_hash: Option<String>,
    pub successful: Option<bool>,
    pub op: Operation,
}

/// Effective type tag: `type`, else the sole key of `body`, else "unknown".
pub fn type_tag(raw: &Value) -> String {
    if let Some(t) = raw.get("type").and_then(Value::as_str) {
        return t.to_string();
    }
    match raw.get("body") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) if map.len() == 1 => map.keys().next().cloned().unwrap_or_default(),
        _ => "unknown".to_string(),
    }
}

/// Normalise a Horizon or XDR operation record.
pub fn normalize(raw: &Value) -> OperationRecord {
    let tag = type_tag(raw);
    if raw.get("type").and_then(Value::as_str).is_some() {
        normalize_horizon(raw, tag)
    } else if raw.get("body").is_some() {
        normalize_xdr(raw, tag)
    } else {
        OperationRecord {
            type_tag: tag,
            shape: Shape::Horizon,
            id: None,
            paging_token: None,
            source_account: None,
            created_at: None,
            transaction_hash: None,
            successful: None,
            op: Operation::Unknown { raw: raw.clone() },
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar helpers

/// Strings and numbers as text; single-key objects unwrap (XDR unions).
fn flat_str(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(flat_str),
        _ => None,
    }
}

fn first<'a>(v: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| v.get(*n))
        .find(|x| !x.is_null())
}

fn price_from_obj(v: &Value) -> Option<String> {
    let n = flat_str(v.get("n")?)?;
    let d = flat_str(v.get("d")?)?;
    Some(format!("{n}/{d}"))
}

fn as_u32(v: &Value) -> Option<u32> {
    v.as_u64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        .and_then(|n| u32::try_from(n).ok())
}

const ACCOUNT_FLAGS: &[(u32, &str)] = &[
    (1, "auth_required"),
    (2, "auth_revocable"),
    (4, "auth_immutable"),
    (8, "auth_clawback_enabled"),
];

const TRUSTLINE_FLAGS: &[(u32, &str)] = &[
    (1, "authorized"),
    (2, "authorized_to_maintain_liabilities"),
    (4, "clawback_enabled"),
];

fn flag_names(bits: u32, table: &[(u32, &str)]) -> String {
    let names: Vec<&str> = table
        .iter()
        .filter(|(b, _)| bits & b != 0)
        .map(|(_, n)| *n)
        .collect();
    if names.is_empty() {
        bits.to_string()
    } else {
        names.join(", ")
    }
}

/// Horizon flag lists: `set_flags_s` names, else numeric `set_flags`.
fn horizon_flags(v: &Value, key: &str) -> Option<String> {
    let named = v.get(format!("{key}_s")).and_then(Value::as_array);
    let list = named.or_else(|| v.get(key).and_then(Value::as_array))?;
    let parts: Vec<String> = list.iter().filter_map(flat_str).collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Depth-first search for the first non-null value under any of `names`.
fn find_key<'a>(v: &'a Value, names: &[&str]) -> Option<&'a Value> {
    match v {
        Value::Object(map) => {
            for n in names {
                if let Some(x) = map.get(*n) {
                    if !x.is_null() {
                        return Some(x);
                    }
                }
            }
            map.values().find_map(|child| find_key(child, names))
        }
        Value::Array(items) => items.iter().find_map(|child| find_key(child, names)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Horizon shape

struct H<'a>(&'a Value);

impl<'a> H<'a> {
    fn s(&self, names: &[&str]) -> Option<String> {
        first(self.0, names).and_then(flat_str)
    }
    fn amount(&self, names: &[&str]) -> Option<String> {
        self.s(names)
    }
    fn asset(&self, prefix: &str) -> Option<Asset> {
        Asset::from_horizon(self.0, prefix)
    }
    fn canonical_asset(&self, name: &str) -> Option<Asset> {
        self.0.get(name).and_then(Value::as_str).and_then(Asset::from_canonical)
    }
    fn price(&self, rational: &str, decimal: &str) -> Option<String> {
        self.0
            .get(rational)
            .and_then(price_from_obj)
            .or_else(|| self.s(&[decimal]))
    }
    fn u32(&self, name: &str) -> Option<u32> {
        self.0.get(name).and_then(as_u32)
    }
    fn path(&self) -> Vec<Asset> {
        self.0
            .get("path")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|p| Asset::from_horizon(p, "")).collect())
            .unwrap_or_default()
    }
    fn reserves(&self, name: &str) -> Vec<ReserveAmount> {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|r| ReserveAmount {
                        asset: r.get("asset").and_then(Value::as_str).and_then(Asset::from_canonical),
                        amount: r.get("amount").and_then(flat_str),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
    fn offer(&self) -> OfferFields {
        OfferFields {
            offer_id: self.s(&["offer_id"]).filter(|id| id != "0"),
            amount: self.amount(&["amount"]),
            selling: self.asset("selling_"),
            buying: self.asset("buying_"),
            price: self.price("price_r", "price"),
        }
    }
}

fn normalize_horizon(raw: &Value, tag: String) -> OperationRecord {
    let h = H(raw);
    let op = match tag.as_str() {
        "create_account" => Operation::CreateAccount {
            destination: h.s(&["account"]),
            starting_balance: h.amount(&["starting_balance"]),
        },
        "payment" => Operation::Payment {
            destination: h.s(&["to_muxed", "to"]),
            asset: h.asset(""),
            amount: h.amount(&["amount"]),
        },
        "path_payment_strict_receive" => Operation::PathPaymentStrictReceive {
            destination: h.s(&["to_muxed", "to"]),
            dest_asset: h.asset(""),
            dest_amount: h.amount(&["amount"]),
            send_asset: h.asset("source_"),
            send_max: h.amount(&["source_max", "source_amount"]),
            path: h.path(),
        },
        "path_payment_strict_send" => Operation::PathPaymentStrictSend {
            destination: h.s(&["to_muxed", "to"]),
            send_asset: h.asset("source_"),
            send_amount: h.amount(&["source_amount"]),
            dest_asset: h.asset(""),
            dest_min: h.amount(&["destination_min"]),
            path: h.path(),
        },
        "manage_sell_offer" => Operation::ManageSellOffer(h.offer()),
        "manage_buy_offer" => Operation::ManageBuyOffer(h.offer()),
        "create_passive_sell_offer" => Operation::CreatePassiveSellOffer(h.offer()),
        "set_options" => Operation::SetOptions {
            inflation_dest: h.s(&["inflation_dest"]),
            home_domain: h.s(&["home_domain"]),
            master_weight: h.u32("master_key_weight"),
            low_threshold: h.u32("low_threshold"),
            med_threshold: h.u32("med_threshold"),
            high_threshold: h.u32("high_threshold"),
            set_flags: horizon_flags(raw, "set_flags"),
            clear_flags: horizon_flags(raw, "clear_flags"),
            signer: h.s(&["signer_key"]).map(|key| SignerChange {
                key: Some(key),
                weight: h.u32("signer_weight"),
            }),
        },
        "change_trust" => {
            let is_pool = h.s(&["asset_type"]).as_deref() == Some("liquidity_pool_shares")
                || raw.get("liquidity_pool_id").is_some_and(|v| !v.is_null());
            Operation::ChangeTrust {
                line: if is_pool {
                    TrustLine::Pool(h.s(&["liquidity_pool_id"]))
                } else {
                    TrustLine::Asset(h.asset(""))
                },
                limit: h.amount(&["limit"]),
            }
        }
        "allow_trust" => Operation::AllowTrust {
            trustor: h.s(&["trustor"]),
            asset: h.asset(""),
            asset_code: h.s(&["asset_code"]),
            authorize: h.s(&["authorize"]),
        },
        "account_merge" => Operation::AccountMerge {
            destination: h.s(&["into_muxed", "into"]),
        },
        "inflation" => Operation::Inflation,
        "manage_data" => Operation::ManageData {
            name: h.s(&["name", "data_name"]),
            value: h.s(&["value", "data_value"]).map(|raw| DataValueField {
                raw,
                encoding: Encoding::Base64,
            }),
        },
        "bump_sequence" => Operation::BumpSequence {
            bump_to: h.s(&["bump_to"]),
        },
        "create_claimable_balance" => Operation::CreateClaimableBalance {
            asset: h.canonical_asset("asset"),
            amount: h.amount(&["amount"]),
            claimants: raw
                .get("claimants")
                .and_then(Value::as_array)
                .map(|cs| {
                    cs.iter()
                        .map(|c| Claimant {
                            destination: c.get("destination").and_then(flat_str),
                            predicate: c.get("predicate").cloned().unwrap_or(Value::Null),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        },
        "claim_claimable_balance" => Operation::ClaimClaimableBalance {
            balance_id: h.s(&["balance_id"]),
        },
        "begin_sponsoring_future_reserves" => Operation::BeginSponsoringFutureReserves {
            sponsored_id: h.s(&["sponsored_id"]),
        },
        "end_sponsoring_future_reserves" => Operation::EndSponsoringFutureReserves {
            begin_sponsor: h.s(&["begin_sponsor"]),
        },
        "revoke_sponsorship" => Operation::RevokeSponsorship(horizon_revoke_target(raw)),
        "clawback" => Operation::Clawback {
            from: h.s(&["from_muxed", "from"]),
            asset: h.asset(""),
            amount: h.amount(&["amount"]),
        },
        "clawback_claimable_balance" => Operation::ClawbackClaimableBalance {
            balance_id: h.s(&["balance_id"]),
        },
        "set_trust_line_flags" => Operation::SetTrustLineFlags {
            trustor: h.s(&["trustor"]),
            asset: h.asset(""),
            set_flags: horizon_flags(raw, "set_flags"),
            clear_flags: horizon_flags(raw, "clear_flags"),
        },
        "liquidity_pool_deposit" => Operation::LiquidityPoolDeposit {
            pool_id: h.s(&["liquidity_pool_id"]),
            max_amounts: h.reserves("reserves_max"),
            min_price: h.price("min_price_r", "min_price"),
            max_price: h.price("max_price_r", "max_price"),
            deposited: h.reserves("reserves_deposited"),
            shares_received: h.amount(&["shares_received"]),
        },
        "liquidity_pool_withdraw" => Operation::LiquidityPoolWithdraw {
            pool_id: h.s(&["liquidity_pool_id"]),
            shares: h.amount(&["shares"]),
            min_amounts: h.reserves("reserves_min"),
            received: h.reserves("reserves_received"),
        },
        _ => Operation::Unknown { raw: raw.clone() },
    };

    OperationRecord {
        type_tag: tag,
        shape: Shape::Horizon,
        id: h.s(&["id"]),
        paging_token: h.s(&["paging_token"]),
        source_account: h.s(&["source_account_muxed", "source_account"]),
        created_at: h.s(&["created_at"]),
        transaction_hash: h.s(&["transaction_hash"]),
        successful: raw.get("transaction_successful").and_then(Value::as_bool),
        op,
    }
}

/// Priority: offer > claimable balance > liquidity pool > data > signer > trustline > account.
fn horizon_revoke_target(raw: &Value) -> RevokeTarget {
    let h = H(raw);
    if let Some(offer_id) = h.s(&["offer_id"]) {
        return RevokeTarget::Offer {
            offer_id,
            seller: h.s(&["seller"]),
        };
    }
    if let Some(balance_id) = h.s(&["claimable_balance_id"]) {
        return RevokeTarget::ClaimableBalance { balance_id };
    }
    if let Some(pool_id) = h.s(&["trustline_liquidity_pool_id", "liquidity_pool_id"]) {
        return RevokeTarget::LiquidityPool {
            pool_id,
            account: h.s(&["trustline_account_id"]),
        };
    }
    if let Some(name) = h.s(&["data_name"]) {
        return RevokeTarget::Data {
            account: h.s(&["data_account_id"]),
            name,
        };
    }
    if let Some(key) = h.s(&["signer_key"]) {
        return RevokeTarget::Signer {
            account: h.s(&["signer_account_id"]),
            key,
        };
    }
    if let Some(account) = h.s(&["trustline_account_id"]) {
        return RevokeTarget::TrustLine {
            account: Some(account),
            asset: h.canonical_asset("trustline_asset"),
        };
    }
    if let Some(account) = h.s(&["account_id"]) {
        return RevokeTarget::Account { account };
    }
    RevokeTarget::Unresolved(raw.clone())
}

// ---------------------------------------------------------------------------
// XDR shape

struct X<'a>(&'a Value);

impl<'a> X<'a> {
    fn s(&self, names: &[&str]) -> Option<String> {
        first(self.0, names).and_then(flat_str)
    }
    fn amount(&self, names: &[&str]) -> Option<String> {
        self.s(names).map(|raw| format_stroop(&raw))
    }
    fn account(&self, names: &[&str]) -> Option<String> {
        first(self.0, names).and_then(account_from_xdr)
    }
    fn asset(&self, names: &[&str]) -> Option<Asset> {
        first(self.0, names).and_then(Asset::from_xdr_json)
    }
    fn price(&self, names: &[&str]) -> Option<String> {
        first(self.0, names).and_then(price_from_obj)
    }
    fn u32(&self, names: &[&str]) -> Option<u32> {
        first(self.0, names).and_then(as_u32)
    }
    fn flags(&self, names: &[&str], table: &[(u32, &str)]) -> Option<String> {
        self.u32(names).map(|bits| flag_names(bits, table))
    }
    fn path(&self) -> Vec<Asset> {
        self.0
            .get("path")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Asset::from_xdr_json).collect())
            .unwrap_or_default()
    }
    fn offer(&self, amount_names: &[&str]) -> OfferFields {
        OfferFields {
            offer_id: self.s(&["offerId", "offer_id"]).filter(|id| id != "0"),
            amount: self.amount(amount_names),
            selling: self.asset(&["selling"]),
            buying: self.asset(&["buying"]),
            price: self.price(&["price"]),
        }
    }
    fn reserve(&self, names: &[&str]) -> ReserveAmount {
        ReserveAmount {
            asset: None,
            amount: self.amount(names),
        }
    }
}

fn normalize_xdr(raw: &Value, tag: String) -> OperationRecord {
    let empty = Value::Object(Default::default());
    let inner = raw.get("body").and_then(|b| b.get(&tag)).unwrap_or(&empty);
    let x = X(inner);
    let dest = ["destination"];

    let op = match tag.as_str() {
        "create_account" | "createAccount" => Operation::CreateAccount {
            destination: x.account(&dest),
            starting_balance: x.amount(&["startingBalance", "starting_balance"]),
        },
        "payment" => Operation::Payment {
            destination: x.account(&dest),
            asset: x.asset(&["asset"]),
            amount: x.amount(&["amount"]),
        },
        "path_payment_strict_receive" | "pathPaymentStrictReceive" => {
            Operation::PathPaymentStrictReceive {
                destination: x.account(&dest),
                dest_asset: x.asset(&["destAsset", "dest_asset"]),
                dest_amount: x.amount(&["destAmount", "dest_amount"]),
                send_asset: x.asset(&["sendAsset", "send_asset"]),
                send_max: x.amount(&["sendMax", "send_max"]),
                path: x.path(),
            }
        }
        "path_payment_strict_send" | "pathPaymentStrictSend" => Operation::PathPaymentStrictSend {
            destination: x.account(&dest),
            send_asset: x.asset(&["sendAsset", "send_asset"]),
            send_amount: x.amount(&["sendAmount", "send_amount"]),
            dest_asset: x.asset(&["destAsset", "dest_asset"]),
            dest_min: x.amount(&["destMin", "dest_min"]),
            path: x.path(),
        },
        "manage_sell_offer" | "manageSellOffer" => {
            Operation::ManageSellOffer(x.offer(&["amount"]))
        }
        "manage_buy_offer" | "manageBuyOffer" => {
            Operation::ManageBuyOffer(x.offer(&["buyAmount", "buy_amount", "amount"]))
        }
        "create_passive_sell_offer" | "createPassiveSellOffer" => {
            Operation::CreatePassiveSellOffer(x.offer(&["amount"]))
        }
        "set_options" | "setOptions" => Operation::SetOptions {
            inflation_dest: x.account(&["inflationDest", "inflation_dest"]),
            home_domain: x.s(&["homeDomain", "home_domain"]),
            master_weight: x.u32(&["masterWeight", "master_weight"]),
            low_threshold: x.u32(&["lowThreshold", "low_threshold"]),
            med_threshold: x.u32(&["medThreshold", "med_threshold"]),
            high_threshold: x.u32(&["highThreshold", "high_threshold"]),
            set_flags: x.flags(&["setFlags", "set_flags"], ACCOUNT_FLAGS),
            clear_flags: x.flags(&["clearFlags", "clear_flags"], ACCOUNT_FLAGS),
            signer: inner.get("signer").filter(|s| !s.is_null()).map(|s| SignerChange {
                key: first(s, &["key", "ed25519", "preAuthTx", "hashX"]).and_then(flat_str),
                weight: s.get("weight").and_then(as_u32),
            }),
        },
        "change_trust" | "changeTrust" => {
            let line = inner.get("line").unwrap_or(&Value::Null);
            let pool_id = first(line, &["liquidityPoolId", "liquidity_pool_id"]).and_then(flat_str);
            let is_pool = pool_id.is_some()
                || find_key(line, &["pool_share", "poolShare", "liquidity_pool_constant_product"]).is_some();
            Operation::ChangeTrust {
                line: if is_pool {
                    TrustLine::Pool(pool_id)
                } else {
                    TrustLine::Asset(Asset::from_xdr_json(line))
                },
                limit: x.amount(&["limit"]),
            }
        }
        "allow_trust" | "allowTrust" => {
            let code = inner.get("asset").and_then(flat_str).map(|c| c.trim_end_matches('\0').to_string());
            Operation::AllowTrust {
                trustor: x.account(&["trustor"]),
                asset: None,
                asset_code: code,
                authorize: x.s(&["authorize"]),
            }
        }
        "account_merge" | "accountMerge" => Operation::AccountMerge {
            destination: account_from_xdr(inner)
                .or_else(|| x.account(&["destination", "into"])),
        },
        "inflation" => Operation::Inflation,
        "manage_data" | "manageData" => Operation::ManageData {
            name: x.s(&["dataName", "data_name"]),
            value: x.s(&["dataValue", "data_value"]).map(|raw| {
                let encoding = if is_hex(&raw) { Encoding::Hex } else { Encoding::Auto };
                DataValueField { raw, encoding }
            }),
        },
        "bump_sequence" | "bumpSequence" => Operation::BumpSequence {
            bump_to: x.s(&["bumpTo", "bump_to"]),
        },
        "create_claimable_balance" | "createClaimableBalance" => {
            Operation::CreateClaimableBalance {
                asset: x.asset(&["asset"]),
                amount: x.amount(&["amount"]),
                claimants: inner
                    .get("claimants")
                    .and_then(Value::as_array)
                    .map(|cs| cs.iter().map(xdr_claimant).collect())
                    .unwrap_or_default(),
            }
        }
        "claim_claimable_balance" | "claimClaimableBalance" => Operation::ClaimClaimableBalance {
            balance_id: x.s(&["balanceId", "balance_id"]),
        },
        "begin_sponsoring_future_reserves" | "beginSponsoringFutureReserves" => {
            Operation::BeginSponsoringFutureReserves {
                sponsored_id: x.account(&["sponsoredId", "sponsored_id"]),
            }
        }
        "end_sponsoring_future_reserves" | "endSponsoringFutureReserves" => {
            Operation::EndSponsoringFutureReserves { begin_sponsor: None }
        }
        "revoke_sponsorship" | "revokeSponsorship" => {
            Operation::RevokeSponsorship(xdr_revoke_target(inner))
        }
        "clawback" => Operation::Clawback {
            from: x.account(&["from"]),
            asset: x.asset(&["asset"]),
            amount: x.amount(&["amount"]),
        },
        "clawback_claimable_balance" | "clawbackClaimableBalance" => {
            Operation::ClawbackClaimableBalance {
                balance_id: x.s(&["balanceId", "balance_id"]),
            }
        }
        "set_trust_line_flags" | "setTrustLineFlags" => Operation::SetTrustLineFlags {
            trustor: x.account(&["trustor"]),
            asset: x.asset(&["asset"]),
            set_flags: x.flags(&["setFlags", "set_flags"], TRUSTLINE_FLAGS),
            clear_flags: x.flags(&["clearFlags", "clear_flags"], TRUSTLINE_FLAGS),
        },
        "liquidity_pool_deposit" | "liquidityPoolDeposit" => Operation::LiquidityPoolDeposit {
            pool_id: x.s(&["liquidityPoolId", "liquidity_pool_id"]),
            max_amounts: vec![
                x.reserve(&["maxAmountA", "max_amount_a"]),
                x.reserve(&["maxAmountB", "max_amount_b"]),
            ],
            min_price: x.price(&["minPrice", "min_price"]),
            max_price: x.price(&["maxPrice", "max_price"]),
            deposited: Vec::new(),
            shares_received: None,
        },
        "liquidity_pool_withdraw" | "liquidityPoolWithdraw" => Operation::LiquidityPoolWithdraw {
            pool_id: x.s(&["liquidityPoolId", "liquidity_pool_id"]),
            shares: x.amount(&["amount"]),
            min_amounts: vec![
                x.reserve(&["minAmountA", "min_amount_a"]),
                x.reserve(&["minAmountB", "min_amount_b"]),
            ],
            received: Vec::new(),
        },
        _ => Operation::Unknown { raw: inner.clone() },
    };

    OperationRecord {
        type_tag: tag,
        shape: Shape::Xdr,
        id: None,
        paging_token: None,
        source_account: first(raw, &["sourceAccount", "source_account"]).and_then(account_from_xdr),
        created_at: None,
        transaction_hash: None,
        successful: None,
        op,
    }
}

fn xdr_claimant(c: &Value) -> Claimant {
    // {"claimant_type_v0": {destination, predicate}} or js-xdr {"v0": {...}}
    let body = if c.get("destination").is_some() {
        c
    } else {
        c.as_object()
            .and_then(|m| m.values().find(|v| v.is_object()))
            .unwrap_or(c)
    };
    Claimant {
        destination: body.get("destination").and_then(account_from_xdr),
        predicate: body.get("predicate").cloned().unwrap_or(Value::Null),
    }
}

/// Priority: offer > claimable balance > liquidity pool > data > signer > trustline > account.
fn xdr_revoke_target(inner: &Value) -> RevokeTarget {
    let account = || find_key(inner, &["account_id", "accountId"]).and_then(account_from_xdr);
    if let Some(offer_id) = find_key(inner, &["offer_id", "offerId"]).and_then(flat_str) {
        return RevokeTarget::Offer {
            offer_id,
            seller: find_key(inner, &["seller_id", "sellerId"]).and_then(account_from_xdr),
        };
    }
    if let Some(balance_id) =
        find_key(inner, &["balance_id", "balanceId", "claimable_balance_id"]).and_then(flat_str)
    {
        return RevokeTarget::ClaimableBalance { balance_id };
    }
    if let Some(pool_id) = find_key(
        inner,
        &["liquidity_pool_id", "liquidityPoolId", "pool_share", "poolShare"],
    )
    .and_then(flat_str)
    {
        return RevokeTarget::LiquidityPool {
            pool_id,
            account: account(),
        };
    }
    if let Some(name) = find_key(inner, &["data_name", "dataName"]).and_then(flat_str) {
        return RevokeTarget::Data {
            account: account(),
            name,
        };
    }
    if let Some(key) = find_key(inner, &["signer_key", "signerKey"]).and_then(flat_str) {
        return RevokeTarget::Signer {
            account: account(),
            key,
        };
    }
    if let Some(line) = find_key(inner, &["trustline", "trustLine", "trust_line"]) {
        return RevokeTarget::TrustLine {
            account: find_key(line, &["account_id", "accountId"]).and_then(account_from_xdr),
            asset: line.get("asset").and_then(Asset::from_xdr_json),
        };
    }
    if let Some(account) = account() {
        return RevokeTarget::Account { account };
    }
    RevokeTarget::Unresolved(inner.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const G1: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";
    const G2: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";

    #[test]
    fn type_tag_resolution() {
        assert_eq!(type_tag(&json!({"type": "payment"})), "payment");
        assert_eq!(type_tag(&json!({"body": {"payment": {}}})), "payment");
        assert_eq!(type_tag(&json!({"body": "inflation"})), "inflation");
        assert_eq!(type_tag(&json!({"body": {"a": 1, "b": 2}})), "unknown");
        assert_eq!(type_tag(&json!({})), "unknown");
    }

    #[test]
    fn horizon_payment() {
        let r = normalize(&json!({
            "id": "1", "type": "payment", "to": G1, "amount": "12.5000000",
            "asset_type": "credit_alphanum4", "asset_code": "USDC", "asset_issuer": G2,
            "transaction_successful": true
        }));
        assert_eq!(r.shape, Shape::Horizon);
        assert_eq!(r.successful, Some(true));
        assert_eq!(
            r.op,
            Operation::Payment {
                destination: Some(G1.into()),
                asset: Some(Asset::credit("USDC", G2)),
                amount: Some("12.5000000".into()),
            }
        );
    }

    #[test]
    fn xdr_payment_converts_stroops() {
        let r = normalize(&json!({
            "source_account": null,
            "body": {"payment": {
                "destination": G1,
                "asset": {"credit_alphanum4": {"asset_code": "USDC", "issuer": G2}},
                "amount": 125000000
            }}
        }));
        assert_eq!(r.shape, Shape::Xdr);
        assert_eq!(
            r.op,
            Operation::Payment {
                destination: Some(G1.into()),
                asset: Some(Asset::credit("USDC", G2)),
                amount: Some("12.5".into()),
            }
        );
    }

    #[test]
    fn horizon_shape_ignores_xdr_names() {
        // `destination` is the XDR name; a Horizon record must not read it.
        let r = normalize(&json!({"type": "payment", "destination": G1, "amount": "1.0000000"}));
        match r.op {
            Operation::Payment { destination, .. } => assert_eq!(destination, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn change_trust_pool_vs_asset() {
        let pool = normalize(&json!({
            "type": "change_trust", "asset_type": "liquidity_pool_shares",
            "liquidity_pool_id": "abcd", "limit": "922337203685.4775807"
        }));
        assert!(matches!(pool.op, Operation::ChangeTrust { line: TrustLine::Pool(Some(ref id)), .. } if id == "abcd"));

        let asset = normalize(&json!({
            "body": {"change_trust": {"line": {"credit_alphanum4": {"asset_code": "AQUA", "issuer": G2}}, "limit": "100000000"}}
        }));
        assert_eq!(
            asset.op,
            Operation::ChangeTrust {
                line: TrustLine::Asset(Some(Asset::credit("AQUA", G2))),
                limit: Some("10".into()),
            }
        );
    }

    #[test]
    fn revoke_priority_prefers_offer() {
        let r = normalize(&json!({
            "type": "revoke_sponsorship",
            "offer_id": "77", "claimable_balance_id": "00ab", "account_id": G1
        }));
        assert_eq!(
            r.op,
            Operation::RevokeSponsorship(RevokeTarget::Offer { offer_id: "77".into(), seller: None })
        );

        let data = normalize(&json!({
            "type": "revoke_sponsorship", "data_account_id": G1, "data_name": "config", "account_id": G1
        }));
        assert!(matches!(data.op, Operation::RevokeSponsorship(RevokeTarget::Data { ref name, .. }) if name == "config"));

        let nothing = normalize(&json!({"type": "revoke_sponsorship"}));
        assert!(matches!(nothing.op, Operation::RevokeSponsorship(RevokeTarget::Unresolved(_))));
    }

    #[test]
    fn revoke_xdr_nested_targets() {
        let signer = normalize(&json!({
            "body": {"revoke_sponsorship": {"signer": {"account_id": G1, "signer_key": G2}}}
        }));
        assert_eq!(
            signer.op,
            Operation::RevokeSponsorship(RevokeTarget::Signer { account: Some(G1.into()), key: G2.into() })
        );

        let trust = normalize(&json!({
            "body": {"revoke_sponsorship": {"ledger_entry": {"trustline": {"account_id": G1, "asset": {"credit_alphanum4": {"asset_code": "USDC", "issuer": G2}}}}}}
        }));
        assert_eq!(
            trust.op,
            Operation::RevokeSponsorship(RevokeTarget::TrustLine {
                account: Some(G1.into()),
                asset: Some(Asset::credit("USDC", G2)),
            })
        );

        let acct = normalize(&json!({
            "body": {"revoke_sponsorship": {"ledger_entry": {"account": {"account_id": G1}}}}
        }));
        assert_eq!(acct.op, Operation::RevokeSponsorship(RevokeTarget::Account { account: G1.into() }));
    }

    #[test]
    fn manage_data_encodings() {
        let h = normalize(&json!({"type": "manage_data", "name": "k", "value": "aGk="}));
        assert_eq!(
            h.op,
            Operation::ManageData {
                name: Some("k".into()),
                value: Some(DataValueField { raw: "aGk=".into(), encoding: Encoding::Base64 }),
            }
        );
        let x = normalize(&json!({"body": {"manage_data": {"data_name": "k", "data_value": "6869"}}}));
        assert!(matches!(x.op, Operation::ManageData { value: Some(DataValueField { encoding: Encoding::Hex, .. }), .. }));
        let cleared = normalize(&json!({"body": {"manage_data": {"data_name": "k", "data_value": null}}}));
        assert!(matches!(cleared.op, Operation::ManageData { value: None, .. }));
    }

    #[test]
    fn xdr_flags_and_signer() {
        let r = normalize(&json!({"body": {"set_options": {
            "set_flags": 3, "home_domain": "example.com", "master_weight": 1,
            "signer": {"key": G2, "weight": 5}
        }}}));
        match r.op {
            Operation::SetOptions { set_flags, home_domain, master_weight, signer, .. } => {
                assert_eq!(set_flags.as_deref(), Some("auth_required, auth_revocable"));
                assert_eq!(home_domain.as_deref(), Some("example.com"));
                assert_eq!(master_weight, Some(1));
                assert_eq!(signer, Some(SignerChange { key: Some(G2.into()), weight: Some(5) }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn claimants_in_both_shapes() {
        let h = normalize(&json!({
            "type": "create_claimable_balance", "asset": "native", "amount": "5.0000000",
            "claimants": [{"destination": G1, "predicate": {"unconditional": true}}]
        }));
        match h.op {
            Operation::CreateClaimableBalance { asset, claimants, .. } => {
                assert_eq!(asset, Some(Asset::Native));
                assert_eq!(claimants[0].destination.as_deref(), Some(G1));
            }
            other => panic!("unexpected {other:?}"),
        }
        let x = normalize(&json!({"body": {"create_claimable_balance": {
            "asset": "native", "amount": "50000000",
            "claimants": [{"claimant_type_v0": {"destination": G2, "predicate": "unconditional"}}]
        }}}));
        match x.op {
            Operation::CreateClaimableBalance { amount, claimants, .. } => {
                assert_eq!(amount.as_deref(), Some("5"));
                assert_eq!(claimants[0].destination.as_deref(), Some(G2));
                assert_eq!(claimants[0].predicate, json!("unconditional"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_kinds_keep_raw() {
        let r = normalize(&json!({"body": {"invoke_host_function": {"host_function": {"x": 1}}}}));
        assert_eq!(r.type_tag, "invoke_host_function");
        assert_eq!(r.op, Operation::Unknown { raw: json!({"host_function": {"x": 1}}) });
        assert_eq!(normalize(&json!({"body": "inflation"})).op, Operation::Inflation);
    }
}
