//! Display labels and language preference.

use std::collections::HashMap;
use std::fmt;

/// Label lookup used by the formatters.
pub trait Translator: Send + Sync {
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Label for `key`, or the key itself when unknown.
    fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    fn tr(&self, key: &str, fallback: &str) -> String {
        self.lookup(key).unwrap_or(fallback).to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Ru,
    Es,
}

impl Lang {
    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ru => "ru",
            Lang::Es => "es",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Map a stored or environment language tag onto a supported language.
/// Region and encoding suffixes are dropped: `en-US`, `ru_RU.UTF-8`.
pub fn normalize_lang(raw: &str) -> Option<Lang> {
    let primary = raw
        .trim()
        .split(['-', '_', '.'])
        .next()?
        .to_ascii_lowercase();
    match primary.as_str() {
        "en" => Some(Lang::En),
        "ru" => Some(Lang::Ru),
        "es" => Some(Lang::Es),
        _ => None,
    }
}

const EN: &[(&str, &str)] = &[
    ("status.success", "success"),
    ("status.failed", "failed"),
    ("status.loading", "loading"),
    ("status.error", "error"),
    ("status.not_found", "not found"),
    ("op.source", "Source"),
    ("op.transaction", "Transaction"),
    ("op.created_at", "Created"),
    ("op.to", "To"),
    ("op.destination", "Destination"),
    ("op.starting_balance", "Starting balance"),
    ("op.amount", "Amount"),
    ("op.buy_amount", "Buy amount"),
    ("op.dest_amount", "Destination amount"),
    ("op.send_max", "Send max"),
    ("op.send_amount", "Send amount"),
    ("op.dest_min", "Destination min"),
    ("op.path", "Path"),
    ("op.offer", "Offer"),
    ("op.selling", "Selling"),
    ("op.buying", "Buying"),
    ("op.price", "Price"),
    ("op.inflation_dest", "Inflation destination"),
    ("op.home_domain", "Home domain"),
    ("op.thresholds", "Thresholds"),
    ("op.master_weight", "Master weight"),
    ("op.set_flags", "Set flags"),
    ("op.clear_flags", "Clear flags"),
    ("op.signer", "Signer"),
    ("op.weight", "weight"),
    ("op.pool", "Liquidity pool"),
    ("op.asset", "Asset"),
    ("op.limit", "Limit"),
    ("op.trustor", "Trustor"),
    ("op.authorize", "Authorize"),
    ("op.into", "Merge into"),
    ("op.data_name", "Name"),
    ("op.value_raw", "Value (raw)"),
    ("op.value_string", "Value (string)"),
    ("op.value_hex", "Value (hex)"),
    ("op.value_deleted", "Value"),
    ("op.deleted", "(entry removed)"),
    ("op.bump_to", "Bump to"),
    ("op.claimants", "Claimants"),
    ("op.balance_id", "Balance ID"),
    ("op.sponsored", "Sponsored account"),
    ("op.sponsor", "Sponsor"),
    ("op.target", "Target"),
    ("op.target_offer", "Offer"),
    ("op.target_balance", "Claimable balance"),
    ("op.target_pool", "Liquidity pool trustline"),
    ("op.target_data", "Data entry"),
    ("op.target_signer", "Signer"),
    ("op.target_trustline", "Trustline"),
    ("op.target_account", "Account"),
    ("op.from", "From"),
    ("op.seller", "Seller"),
    ("op.max_amounts", "Max amounts"),
    ("op.min_price", "Min price"),
    ("op.max_price", "Max price"),
    ("op.deposited", "Deposited"),
    ("op.shares_received", "Shares received"),
    ("op.shares", "Shares"),
    ("op.min_amounts", "Min amounts"),
    ("op.received", "Received"),
    ("op.raw", "Raw"),
    ("effect.credited", "Credited"),
    ("effect.debited", "Debited"),
    ("effect.trade", "Trade"),
    ("view.home", "Stellar explorer"),
    ("view.account", "Account"),
    ("view.operations", "Operations"),
    ("view.offers", "Offers"),
    ("view.offer", "Offer"),
    ("view.pool", "Liquidity pool"),
    ("view.trades", "Trades"),
    ("view.asset", "Asset"),
    ("view.orderbook", "Order book"),
    ("view.charts", "Charts"),
    ("view.transaction", "Transaction"),
    ("view.operation", "Operation"),
    ("view.effects", "Effects"),
    ("view.contract", "Contract"),
    ("view.ledger", "Ledger"),
    ("view.stats", "Year in review"),
    ("view.holders", "Holders"),
    ("view.load_more", "Press n to load more"),
    ("view.empty", "Nothing here yet"),
    ("search.empty", "Enter an account, transaction hash, contract or asset code"),
    ("search.unknown", "Unknown format"),
    ("search.recent", "Recent accounts"),
];

/// Built-in English labels.
#[derive(Clone, Debug)]
pub struct English {
    table: HashMap<&'static str, &'static str>,
}

impl Default for English {
    fn default() -> Self {
        English {
            table: EN.iter().copied().collect(),
        }
    }
}

impl Translator for English {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.table.get(key).copied()
    }
}

/// Caller-supplied labels layered over English.
#[derive(Clone, Debug, Default)]
pub struct MapTranslator {
    entries: HashMap<String, String>,
    base: English,
}

impl MapTranslator {
    pub fn new(entries: HashMap<String, String>) -> Self {
        MapTranslator {
            entries,
            base: English::default(),
        }
    }
}

impl Translator for MapTranslator {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .or_else(|| self.base.lookup(key))
    }
}

/// Translator for a language; only English ships built in.
pub fn translator_for(lang: Lang) -> Box<dyn Translator> {
    if lang != Lang::En {
        log::debug!("[i18n] no built-in labels for {lang}, using English");
    }
    Box::new(English::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_normalization() {
        assert_eq!(normalize_lang("en-US"), Some(Lang::En));
        assert_eq!(normalize_lang("ru_RU.UTF-8"), Some(Lang::Ru));
        assert_eq!(normalize_lang("ES"), Some(Lang::Es));
        assert_eq!(normalize_lang("de"), None);
        assert_eq!(normalize_lang(""), None);
    }

    #[test]
    fn lookup_falls_back() {
        let en = English::default();
        assert_eq!(en.t("op.amount"), "Amount");
        assert_eq!(en.t("no.such.key"), "no.such.key");
        assert_eq!(en.tr("no.such.key", "Fallback"), "Fallback");

        let mut m = HashMap::new();
        m.insert("op.amount".to_string(), "Сумма".to_string());
        let ru = MapTranslator::new(m);
        assert_eq!(ru.t("op.amount"), "Сумма");
        assert_eq!(ru.t("op.to"), "To");
    }
}
