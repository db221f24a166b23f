//! Asset identity: native XLM or a credit asset `CODE` issued by `G…`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StellarxError};
use crate::util_text::shorten;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Native,
    Credit { code: String, issuer: String },
}

/// `^[A-Za-z0-9]{1,12}$`
pub fn is_valid_code(code: &str) -> bool {
    (1..=12).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl Asset {
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// Parse a route or user form: `XLM`, `native`, `CODE-ISSUER` or `CODE:ISSUER`.
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("native") || s.eq_ignore_ascii_case("xlm") {
            return Ok(Asset::Native);
        }
        let split = s.rfind('-').or_else(|| s.rfind(':'));
        let (code, issuer) = match split {
            Some(i) => (&s[..i], &s[i + 1..]),
            None => {
                return Err(StellarxError::Validation(format!(
                    "asset must be CODE-ISSUER, got '{s}'"
                )))
            }
        };
        if !is_valid_code(code) {
            return Err(StellarxError::Validation(format!(
                "invalid asset code '{code}'"
            )));
        }
        if issuer.is_empty() {
            return Err(StellarxError::Validation("missing asset issuer".into()));
        }
        Ok(Asset::credit(code, issuer))
    }

    /// Horizon canonical form: `native` or `CODE:ISSUER`.
    pub fn from_canonical(s: &str) -> Option<Self> {
        if s == "native" {
            return Some(Asset::Native);
        }
        let (code, issuer) = s.split_once(':')?;
        if code.is_empty() || issuer.is_empty() {
            return None;
        }
        Some(Asset::credit(code, issuer))
    }

    /// Read `{prefix}asset_type/_code/_issuer` fields of a Horizon record.
    pub fn from_horizon(v: &Value, prefix: &str) -> Option<Self> {
        let get = |k: &str| v.get(format!("{prefix}{k}")).and_then(Value::as_str);
        match get("asset_type") {
            Some("native") => Some(Asset::Native),
            Some(_) | None => {
                let code = get("asset_code")?;
                let issuer = get("asset_issuer")?;
                Some(Asset::credit(code, issuer))
            }
        }
    }

    /// Read an asset in the shapes XDR JSON produces: `"native"`,
    /// `{"credit_alphanum4": {"asset_code", "issuer"}}`, js-xdr style
    /// `{"alphaNum4": {"assetCode", "issuer"}}`, or a canonical string.
    pub fn from_xdr_json(v: &Value) -> Option<Self> {
        match v {
            Value::String(s) => {
                if s.eq_ignore_ascii_case("native") {
                    Some(Asset::Native)
                } else {
                    Asset::from_canonical(s)
                }
            }
            Value::Object(map) => {
                if map.contains_key("native") {
                    return Some(Asset::Native);
                }
                let direct_code = map
                    .get("asset_code")
                    .or_else(|| map.get("assetCode"))
                    .or_else(|| map.get("code"))
                    .and_then(Value::as_str);
                if let Some(code) = direct_code {
                    let issuer = map.get("issuer").and_then(account_from_xdr)?;
                    return Some(Asset::credit(code.trim_end_matches('\0'), issuer));
                }
                if map.len() == 1 {
                    let inner = map.values().next()?;
                    if inner.is_object() {
                        return Asset::from_xdr_json(inner);
                    }
                }
                None
            }
            _ => None,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Display code, `XLM` for native.
    pub fn code(&self) -> &str {
        match self {
            Asset::Native => "XLM",
            Asset::Credit { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<&str> {
        match self {
            Asset::Native => None,
            Asset::Credit { issuer, .. } => Some(issuer),
        }
    }

    pub fn wire_type(&self) -> &'static str {
        match self {
            Asset::Native => "native",
            Asset::Credit { code, .. } if code.len() <= 4 => "credit_alphanum4",
            Asset::Credit { .. } => "credit_alphanum12",
        }
    }

    pub fn canonical(&self) -> String {
        match self {
            Asset::Native => "native".to_string(),
            Asset::Credit { code, issuer } => format!("{code}:{issuer}"),
        }
    }

    /// Path segment used in routes: `XLM` or `CODE-ISSUER`.
    pub fn route_id(&self) -> String {
        match self {
            Asset::Native => "XLM".to_string(),
            Asset::Credit { code, issuer } => format!("{code}-{issuer}"),
        }
    }

    /// `XLM` or `CODE · GABC…WXYZ`
    pub fn label(&self) -> String {
        match self {
            Asset::Native => "XLM".to_string(),
            Asset::Credit { code, issuer } => format!("{code} · {}", shorten(issuer)),
        }
    }

    pub fn link(&self) -> Option<String> {
        match self {
            Asset::Native => None,
            Asset::Credit { code, issuer } => Some(format!("/asset/{code}-{issuer}")),
        }
    }

    /// Horizon query params, e.g. prefix `selling_` gives
    /// `selling_asset_type`, `selling_asset_code`, `selling_asset_issuer`.
    pub fn query_params(&self, prefix: &str) -> Vec<(String, String)> {
        let mut out = vec![(format!("{prefix}asset_type"), self.wire_type().to_string())];
        if let Asset::Credit { code, issuer } = self {
            out.push((format!("{prefix}asset_code"), code.clone()));
            out.push((format!("{prefix}asset_issuer"), issuer.clone()));
        }
        out
    }

    /// Case-insensitive substring match on code or issuer; `XLM` matches native.
    pub fn matches_query(&self, q: &str) -> bool {
        let q = q.trim().to_ascii_uppercase();
        if q.is_empty() {
            return true;
        }
        match self {
            Asset::Native => "XLM".contains(&q) || "NATIVE".contains(&q),
            Asset::Credit { code, issuer } => {
                code.to_ascii_uppercase().contains(&q) || issuer.to_ascii_uppercase().contains(&q)
            }
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Accounts in XDR JSON are plain strkeys, or a single-key object around one.
pub(crate) fn account_from_xdr(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(account_from_xdr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    #[test]
    fn parse_forms() {
        assert_eq!(Asset::parse("XLM").unwrap(), Asset::Native);
        assert_eq!(Asset::parse("native").unwrap(), Asset::Native);
        let a = Asset::parse(&format!("USDC-{ISSUER}")).unwrap();
        assert_eq!(a, Asset::credit("USDC", ISSUER));
        assert_eq!(Asset::parse(&format!("USDC:{ISSUER}")).unwrap(), a);
        assert!(Asset::parse("USDC").is_err());
        assert!(Asset::parse("TOOLONGCODE123-G").is_err());
        assert!(Asset::parse("USDC-").is_err());
    }

    #[test]
    fn wire_type_by_code_length() {
        assert_eq!(Asset::credit("USDC", ISSUER).wire_type(), "credit_alphanum4");
        assert_eq!(Asset::credit("YUSDC", ISSUER).wire_type(), "credit_alphanum12");
        assert_eq!(Asset::Native.wire_type(), "native");
    }

    #[test]
    fn label_and_link() {
        let a = Asset::credit("USDC", ISSUER);
        assert_eq!(a.label(), "USDC · GA5Z…KZVN");
        assert_eq!(a.link().unwrap(), format!("/asset/USDC-{ISSUER}"));
        assert_eq!(Asset::Native.label(), "XLM");
        assert!(Asset::Native.link().is_none());
    }

    #[test]
    fn horizon_fields() {
        let v = json!({"selling_asset_type": "credit_alphanum4", "selling_asset_code": "AQUA", "selling_asset_issuer": ISSUER, "buying_asset_type": "native"});
        assert_eq!(Asset::from_horizon(&v, "selling_"), Some(Asset::credit("AQUA", ISSUER)));
        assert_eq!(Asset::from_horizon(&v, "buying_"), Some(Asset::Native));
        assert_eq!(Asset::from_horizon(&v, "source_"), None);
    }

    #[test]
    fn xdr_json_shapes() {
        assert_eq!(Asset::from_xdr_json(&json!("native")), Some(Asset::Native));
        let a = json!({"credit_alphanum4": {"asset_code": "USDC", "issuer": ISSUER}});
        assert_eq!(Asset::from_xdr_json(&a), Some(Asset::credit("USDC", ISSUER)));
        let b = json!({"alphaNum12": {"assetCode": "YBTC", "issuer": {"ed25519": ISSUER}}});
        assert_eq!(Asset::from_xdr_json(&b), Some(Asset::credit("YBTC", ISSUER)));
    }

    #[test]
    fn query_params_and_matching() {
        let p = Asset::credit("USDC", ISSUER).query_params("selling_");
        assert_eq!(p.len(), 3);
        assert_eq!(p[0], ("selling_asset_type".into(), "credit_alphanum4".into()));
        assert_eq!(Asset::Native.query_params("buying_").len(), 1);
        assert!(Asset::Native.matches_query("xlm"));
        assert!(Asset::credit("USDC", ISSUER).matches_query("usd"));
        assert!(Asset::credit("USDC", ISSUER).matches_query("KZVN"));
        assert!(!Asset::credit("USDC", ISSUER).matches_query("AQUA"));
    }
}
