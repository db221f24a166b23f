//! Path router for stellarx
//!
//! The same paths work as command-line arguments, in-app links and
//! `stellarx://` deep links.
//!
//! ## Supported Routes
//!
//! - `/` - Home (search and recent accounts)
//! - `/account/<id>`, `/account/<id>/operations`, `/account/<id>/offers`,
//!   `/account/<id>/<year>`
//! - `/offers/<id>` - Same as `/account/<id>/offers`
//! - `/pool/<id>`, `/pool/<id>/operations`, `/pool/<id>/trades`, `/pool/<id>/charts`
//! - `/asset/<CODE-ISSUER|XLM>`, `/asset/<a>/orderbook?counter=<b>`,
//!   `/asset/<a>/charts?counter=<b>`
//! - `/transaction/<hash>`, `/tx/<hash>` - 64 hex chars
//! - `/operation/<id>` - digits only
//! - `/offer/<id>`, `/offer/<id>/trades`
//! - `/contract/<C…>`
//! - `/ledger/<seq>`
//!
//! ## Robust Parsing
//!
//! - Case-insensitive scheme: `STELLARX://`, `stellarx://`
//! - Single-slash and repeated-slash variants: `stellarx:/account/…`
//! - Hash form: `#/account/…`
//! - Query and fragment are stripped; `counter` survives on asset sub-routes

use std::fmt;

use crate::asset::Asset;
use crate::strkey::is_tx_hash;

/// Strip query and fragment from URL path
#[inline]
fn strip_query_frag(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(i) => &s[..i],
        None => s,
    }
}

/// `counter=` value of the query string, if any.
fn counter_param(s: &str) -> Option<String> {
    let q = s.split_once('?')?.1;
    let q = q.split('#').next().unwrap_or("");
    q.split('&').find_map(|kv| {
        let (k, v) = kv.split_once('=')?;
        if k != "counter" || v.is_empty() {
            return None;
        }
        urlencoding::decode(v).ok().map(|c| c.into_owned())
    })
}

/// Extract path after stellarx:// scheme (case-insensitive, handles variants)
#[inline]
fn after_scheme(raw: &str) -> Option<&str> {
    let s = raw.trim();
    let rest = if let Some(pos) = s.find("://") {
        if !s[..pos].eq_ignore_ascii_case("stellarx") {
            return None;
        }
        &s[pos + 3..]
    } else {
        let (scheme, rest) = s.split_once(':')?;
        if !scheme.eq_ignore_ascii_case("stellarx") {
            return None;
        }
        rest
    };
    Some(rest.trim_start_matches('/'))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Account { id: String },
    AccountOperations { id: String },
    AccountOffers { id: String },
    AccountYearStats { id: String, year: i32 },
    Pool { id: String },
    PoolOperations { id: String },
    PoolTrades { id: String },
    PoolCharts { id: String },
    Asset { asset: Asset },
    AssetOrderbook { asset: Asset, counter: Option<Asset> },
    AssetCharts { asset: Asset, counter: Option<Asset> },
    Transaction { hash: String },
    Operation { id: String },
    Offer { id: String },
    OfferTrades { id: String },
    Contract { id: String },
    Ledger { seq: u64 },
}

fn digits(s: &str) -> Option<String> {
    (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())).then(|| s.to_string())
}

/// Parse a route from a path, `#/` hash or `stellarx://` link.
///
/// Returns `None` for paths that match no route.
pub fn parse(raw: &str) -> Option<Route> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(Route::Home);
    }
    let counter = counter_param(s).and_then(|c| Asset::parse(&c).ok());

    let path = if let Some(rest) = after_scheme(s) {
        rest
    } else if let Some(rest) = s.strip_prefix("#/") {
        rest
    } else {
        s.trim_start_matches('/')
    };
    let path = strip_query_frag(path);
    let segs: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    let route = match segs.as_slice() {
        [] => Route::Home,
        [page, rest @ ..] => match (page.to_ascii_lowercase().as_str(), rest) {
            ("account", [id]) => Route::Account { id: id.to_string() },
            ("account", [id, "operations"]) => Route::AccountOperations { id: id.to_string() },
            ("account", [id, "offers"]) => Route::AccountOffers { id: id.to_string() },
            ("account", [id, year]) => Route::AccountYearStats {
                id: id.to_string(),
                year: digits(year).filter(|y| y.len() == 4)?.parse().ok()?,
            },
            ("offers", [id]) => Route::AccountOffers { id: id.to_string() },
            ("pool", [id]) => Route::Pool { id: id.to_string() },
            ("pool", [id, "operations"]) => Route::PoolOperations { id: id.to_string() },
            ("pool", [id, "trades"]) => Route::PoolTrades { id: id.to_string() },
            ("pool", [id, "charts"]) => Route::PoolCharts { id: id.to_string() },
            ("asset", [a]) => Route::Asset {
                asset: parse_asset_segment(a)?,
            },
            ("asset", [a, "orderbook"]) => Route::AssetOrderbook {
                asset: parse_asset_segment(a)?,
                counter,
            },
            ("asset", [a, "charts"]) => Route::AssetCharts {
                asset: parse_asset_segment(a)?,
                counter,
            },
            ("transaction" | "tx", [hash]) if is_tx_hash(hash) => Route::Transaction {
                hash: hash.to_ascii_lowercase(),
            },
            ("operation", [id]) => Route::Operation { id: digits(id)? },
            ("offer", [id]) => Route::Offer { id: digits(id)? },
            ("offer", [id, "trades"]) => Route::OfferTrades { id: digits(id)? },
            ("contract", [id]) => Route::Contract { id: id.to_string() },
            ("ledger", [seq]) => Route::Ledger {
                seq: digits(seq)?.parse().ok()?,
            },
            ("home", []) => Route::Home,
            _ => return None,
        },
    };
    Some(route)
}

fn parse_asset_segment(seg: &str) -> Option<Asset> {
    let decoded = urlencoding::decode(seg).ok()?;
    Asset::parse(&decoded).ok()
}

impl Route {
    /// Canonical path for this route.
    pub fn path(&self) -> String {
        let with_counter = |base: String, counter: &Option<Asset>| match counter {
            Some(c) => format!("{base}?counter={}", c.route_id()),
            None => base,
        };
        match self {
            Route::Home => "/".to_string(),
            Route::Account { id } => format!("/account/{id}"),
            Route::AccountOperations { id } => format!("/account/{id}/operations"),
            Route::AccountOffers { id } => format!("/account/{id}/offers"),
            Route::AccountYearStats { id, year } => format!("/account/{id}/{year}"),
            Route::Pool { id } => format!("/pool/{id}"),
            Route::PoolOperations { id } => format!("/pool/{id}/operations"),
            Route::PoolTrades { id } => format!("/pool/{id}/trades"),
            Route::PoolCharts { id } => format!("/pool/{id}/charts"),
            Route::Asset { asset } => format!("/asset/{}", asset.route_id()),
            Route::AssetOrderbook { asset, counter } => {
                with_counter(format!("/asset/{}/orderbook", asset.route_id()), counter)
            }
            Route::AssetCharts { asset, counter } => {
                with_counter(format!("/asset/{}/charts", asset.route_id()), counter)
            }
            Route::Transaction { hash } => format!("/tx/{hash}"),
            Route::Operation { id } => format!("/operation/{id}"),
            Route::Offer { id } => format!("/offer/{id}"),
            Route::OfferTrades { id } => format!("/offer/{id}/trades"),
            Route::Contract { id } => format!("/contract/{id}"),
            Route::Ledger { seq } => format!("/ledger/{seq}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
