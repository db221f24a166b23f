//! Search box classification and the recent-accounts list.

use serde_json::Value;

use crate::router::Route;
use crate::strkey::{is_account_id, is_contract_id, is_tx_hash};

pub const HISTORY_LIMIT: usize = 10;

/// Assets shown for a code search.
pub const ASSET_SEARCH_LIMIT: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchTarget {
    /// Nothing typed; `search.empty` message.
    Empty,
    Account(String),
    Transaction(String),
    Contract(String),
    Ledger(u64),
    /// Look up `/assets?asset_code=`.
    AssetCode(String),
    /// `search.unknown` message.
    Unknown,
}

impl SearchTarget {
    /// Route to open, `None` for asset searches and messages.
    pub fn route(&self) -> Option<Route> {
        match self {
            SearchTarget::Account(id) => Some(Route::Account { id: id.clone() }),
            SearchTarget::Transaction(hash) => Some(Route::Transaction { hash: hash.clone() }),
            SearchTarget::Contract(id) => Some(Route::Contract { id: id.clone() }),
            SearchTarget::Ledger(seq) => Some(Route::Ledger { seq: *seq }),
            _ => None,
        }
    }
}

fn is_asset_code(s: &str) -> bool {
    (3..=12).contains(&s.len())
        && s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

pub fn classify(input: &str) -> SearchTarget {
    let s = input.trim();
    if s.is_empty() {
        return SearchTarget::Empty;
    }
    if is_account_id(s) {
        return SearchTarget::Account(s.to_string());
    }
    if is_tx_hash(s) {
        return SearchTarget::Transaction(s.to_ascii_lowercase());
    }
    if is_contract_id(s) {
        return SearchTarget::Contract(s.to_string());
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(seq) = s.parse() {
            return SearchTarget::Ledger(seq);
        }
    }
    if is_asset_code(s) {
        return SearchTarget::AssetCode(s.to_string());
    }
    SearchTarget::Unknown
}

/// Most-recent-first list of visited accounts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountHistory {
    items: Vec<String>,
}

impl AccountHistory {
    /// Load from the stored JSON array; anything malformed reads as empty.
    pub fn from_json(raw: Option<&str>) -> Self {
        let items = raw
            .and_then(|s| serde_json::from_str::<Value>(s).ok())
            .and_then(|v| match v {
                Value::Array(a) => Some(
                    a.into_iter()
                        .filter_map(|x| x.as_str().map(str::to_string))
                        .collect::<Vec<_>>(),
                ),
                _ => None,
            })
            .unwrap_or_default();
        let mut h = AccountHistory { items: Vec::new() };
        for id in items.into_iter().rev() {
            h.push(&id);
        }
        h
    }

    pub fn to_json(&self) -> String {
        Value::from(self.items.clone()).to_string()
    }

    /// Move `id` to the front, dropping duplicates and the overflow.
    pub fn push(&mut self, id: &str) {
        self.items.retain(|x| x != id);
        self.items.insert(0, id.to_string());
        self.items.truncate(HISTORY_LIMIT);
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u8) -> String {
        stellar_strkey::ed25519::PublicKey([n; 32]).to_string()
    }

    #[test]
    fn classifies_inputs() {
        let acc = account(1);
        assert_eq!(classify(&format!("  {acc} ")), SearchTarget::Account(acc.clone()));
        let hash = "AB".repeat(32);
        assert_eq!(classify(&hash), SearchTarget::Transaction("ab".repeat(32)));
        let contract = stellar_strkey::Contract([2; 32]).to_string();
        assert_eq!(classify(&contract), SearchTarget::Contract(contract.clone()));
        assert_eq!(classify("123456"), SearchTarget::Ledger(123_456));
        assert_eq!(classify("USDC"), SearchTarget::AssetCode("USDC".into()));
        assert_eq!(classify("usdc"), SearchTarget::Unknown);
        assert_eq!(classify("AB"), SearchTarget::Unknown);
        assert_eq!(classify(""), SearchTarget::Empty);
        assert_eq!(classify("   "), SearchTarget::Empty);
    }

    #[test]
    fn routes_for_targets() {
        assert_eq!(SearchTarget::Ledger(5).route(), Some(Route::Ledger { seq: 5 }));
        assert_eq!(SearchTarget::AssetCode("USDC".into()).route(), None);
    }

    #[test]
    fn history_is_mru_and_capped() {
        let mut h = AccountHistory::default();
        for i in 0..12u8 {
            h.push(&account(i));
        }
        assert_eq!(h.items().len(), HISTORY_LIMIT);
        assert_eq!(h.items()[0], account(11));
        h.push(&account(5));
        assert_eq!(h.items()[0], account(5));
        assert_eq!(h.items().iter().filter(|x| **x == account(5)).count(), 1);

        let restored = AccountHistory::from_json(Some(&h.to_json()));
        assert_eq!(restored, h);
        assert!(AccountHistory::from_json(Some("{oops")).is_empty());
        assert!(AccountHistory::from_json(None).is_empty());
    }
}
