//! Client-side trade filters used by the offer trades view.

use crate::error::{Result, StellarxError};
use crate::types::TradeRecord;
use crate::util_text::parse_f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Gt,
    Lt,
    Eq,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmountFilter {
    pub cmp: Cmp,
    pub value: f64,
}

fn is_number(s: &str) -> bool {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.map_or(true, digits)
}

impl AmountFilter {
    /// `>10`, `< 2.5` or a bare `100` (exact match). Empty input is no filter.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let s = raw.trim();
        if s.is_empty() {
            return Ok(None);
        }
        let (cmp, rest) = match s.as_bytes()[0] {
            b'>' => (Cmp::Gt, s[1..].trim_start()),
            b'<' => (Cmp::Lt, s[1..].trim_start()),
            _ => (Cmp::Eq, s),
        };
        if !is_number(rest) {
            return Err(StellarxError::Validation(
                "amount filter must look like >10, <5 or 100".into(),
            ));
        }
        let value = parse_f64(rest)
            .ok_or_else(|| StellarxError::Validation(format!("bad amount '{rest}'")))?;
        Ok(Some(AmountFilter { cmp, value }))
    }

    pub fn matches_value(&self, v: f64) -> bool {
        match self.cmp {
            Cmp::Gt => v > self.value,
            Cmp::Lt => v < self.value,
            Cmp::Eq => v == self.value,
        }
    }

    /// True when either side of the trade satisfies the filter.
    pub fn matches(&self, trade: &TradeRecord) -> bool {
        [&trade.base_amount, &trade.counter_amount]
            .iter()
            .filter_map(|a| parse_f64(a))
            .any(|v| self.matches_value(v))
    }
}

/// Case-insensitive substring over codes and issuers; `XLM` matches native.
pub fn matches_asset(trade: &TradeRecord, needle: &str) -> bool {
    let needle = needle.trim().to_ascii_uppercase();
    if needle.is_empty() {
        return true;
    }
    let mut hay: Vec<String> = [
        &trade.base_asset_code,
        &trade.base_asset_issuer,
        &trade.counter_asset_code,
        &trade.counter_asset_issuer,
    ]
    .into_iter()
    .flatten()
    .map(|s| s.to_ascii_uppercase())
    .collect();
    if trade.base_asset_type == "native" || trade.counter_asset_type == "native" {
        hay.push("XLM".into());
    }
    hay.iter().any(|h| h.contains(&needle))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradeFilter {
    pub amount: Option<AmountFilter>,
    pub asset: Option<String>,
}

impl TradeFilter {
    pub fn new(amount: &str, asset: &str) -> Result<Self> {
        let asset = asset.trim();
        Ok(TradeFilter {
            amount: AmountFilter::parse(amount)?,
            asset: (!asset.is_empty()).then(|| asset.to_string()),
        })
    }

    /// One-line form used by the filter prompt: an optional amount
    /// expression followed by an optional asset, e.g. `>100 USDC`.
    pub fn parse_line(raw: &str) -> Result<Self> {
        let s = raw.trim();
        let starts_amount = s
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c == '<' || c.is_ascii_digit());
        if !starts_amount {
            return TradeFilter::new("", s);
        }
        let (op, body) = match s.strip_prefix(['>', '<']) {
            Some(rest) => (&s[..1], rest.trim_start()),
            None => ("", s),
        };
        let end = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (num, rest) = body.split_at(end);
        TradeFilter::new(&format!("{op}{num}"), rest)
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.asset.is_none()
    }

    pub fn matches(&self, trade: &TradeRecord) -> bool {
        self.amount.map_or(true, |a| a.matches(trade))
            && self.asset.as_deref().map_or(true, |q| matches_asset(trade, q))
    }

    pub fn apply<'a>(&self, trades: &'a [TradeRecord]) -> Vec<&'a TradeRecord> {
        trades.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(base: &str, counter: &str) -> TradeRecord {
        TradeRecord {
            id: "1".into(),
            base_amount: base.into(),
            base_asset_type: "native".into(),
            counter_amount: counter.into(),
            counter_asset_type: "credit_alphanum4".into(),
            counter_asset_code: Some("USDC".into()),
            counter_asset_issuer: Some("GAISSUER".into()),
            ..Default::default()
        }
    }

    #[test]
    fn amount_grammar() {
        assert_eq!(
            AmountFilter::parse(">10").unwrap(),
            Some(AmountFilter { cmp: Cmp::Gt, value: 10.0 })
        );
        assert_eq!(
            AmountFilter::parse("< 2.5").unwrap(),
            Some(AmountFilter { cmp: Cmp::Lt, value: 2.5 })
        );
        assert_eq!(
            AmountFilter::parse("100").unwrap(),
            Some(AmountFilter { cmp: Cmp::Eq, value: 100.0 })
        );
        assert_eq!(AmountFilter::parse("  ").unwrap(), None);
        for bad in [">", "=5", "1.", ".5", "1e3", "abc", ">>1"] {
            assert!(AmountFilter::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn amount_checks_both_sides() {
        let t = trade("5.0000000", "150.0000000");
        assert!(AmountFilter::parse(">100").unwrap().unwrap().matches(&t));
        assert!(AmountFilter::parse("<6").unwrap().unwrap().matches(&t));
        assert!(AmountFilter::parse("5").unwrap().unwrap().matches(&t));
        assert!(!AmountFilter::parse(">200").unwrap().unwrap().matches(&t));
    }

    #[test]
    fn asset_substring() {
        let t = trade("1", "1");
        assert!(matches_asset(&t, "usd"));
        assert!(matches_asset(&t, "xlm"));
        assert!(matches_asset(&t, "aissu"));
        assert!(!matches_asset(&t, "BTC"));
        assert!(matches_asset(&t, ""));
    }

    #[test]
    fn one_line_filter() {
        let f = TradeFilter::parse_line(">100 usdc").unwrap();
        assert_eq!(f.amount, Some(AmountFilter { cmp: Cmp::Gt, value: 100.0 }));
        assert_eq!(f.asset.as_deref(), Some("usdc"));
        let f = TradeFilter::parse_line("XLM").unwrap();
        assert!(f.amount.is_none());
        assert!(TradeFilter::parse_line("").unwrap().is_empty());
        assert!(TradeFilter::parse_line("> x").is_err());

        let trades = vec![trade("5", "150"), trade("500", "1")];
        let f = TradeFilter::parse_line("<10 usdc").unwrap();
        assert_eq!(f.apply(&trades).len(), 2);
        let f = TradeFilter::parse_line(">400").unwrap();
        assert_eq!(f.apply(&trades).len(), 1);
    }
}
