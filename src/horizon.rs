//! Horizon REST client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::asset::Asset;
use crate::error::{Result, StellarxError};
use crate::net::send_with_backoff;
use crate::types::{
    AccountRecord, AssetRecord, LedgerRecord, OfferRecord, OrderBook, Page, PathRecord,
    PoolRecord, TransactionRecord,
};

pub const DEFAULT_HORIZON_URL: &str = "https://horizon.stellar.org";

#[derive(Clone, Debug)]
pub struct HorizonClient {
    base: String,
    http: reqwest::Client,
    retries: u8,
}

impl HorizonClient {
    pub fn new(base_url: &str, timeout_ms: u64, retries: u8) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(HorizonClient {
            base: base_url.trim_end_matches('/').to_string(),
            http,
            retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Absolute URL for a Horizon path with encoded query params.
    pub fn url(&self, path: &str, params: &[(String, String)]) -> String {
        let mut out = format!("{}{}", self.base, path);
        for (i, (k, v)) in params.iter().enumerate() {
            out.push(if i == 0 && !path.contains('?') { '?' } else { '&' });
            out.push_str(&urlencoding::encode(k));
            out.push('=');
            out.push_str(&urlencoding::encode(v));
        }
        out
    }

    pub async fn get_value(&self, url: &str) -> Result<Value> {
        log::debug!("[horizon] GET {url}");
        let res = send_with_backoff(self.http.get(url), url, self.retries).await?;
        let status = res.status().as_u16();
        if status == 404 {
            return Err(StellarxError::NotFound(url.to_string()));
        }
        if !res.status().is_success() {
            let detail = res
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.get("detail")
                        .or_else(|| v.get("title"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                });
            log::warn!("[horizon] {status} {url} {}", detail.as_deref().unwrap_or(""));
            return Err(StellarxError::Http { status, detail });
        }
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| StellarxError::Decode(format!("{url}: {e}")))
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let v = self.get_value(url).await?;
        serde_json::from_value(v).map_err(|e| StellarxError::Decode(format!("{url}: {e}")))
    }

    pub async fn get_path<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        self.get(&self.url(path, params)).await
    }

    pub async fn account(&self, id: &str) -> Result<AccountRecord> {
        self.get_path(&format!("/accounts/{id}"), &[]).await
    }

    pub async fn liquidity_pool(&self, id: &str) -> Result<PoolRecord> {
        self.get_path(&format!("/liquidity_pools/{id}"), &[]).await
    }

    pub async fn offer(&self, id: &str) -> Result<OfferRecord> {
        self.get_path(&format!("/offers/{id}"), &[]).await
    }

    pub async fn operation(&self, id: &str) -> Result<Value> {
        self.get_path(&format!("/operations/{id}"), &[]).await
    }

    pub async fn operation_effects(&self, id: &str) -> Result<Page<Value>> {
        self.get_path(
            &format!("/operations/{id}/effects"),
            &params(&[("limit", "200"), ("order", "asc")]),
        )
        .await
    }

    pub async fn transaction(&self, hash: &str) -> Result<TransactionRecord> {
        self.get_path(&format!("/transactions/{hash}"), &[]).await
    }

    pub async fn transaction_operations(&self, hash: &str) -> Result<Page<Value>> {
        self.get_path(
            &format!("/transactions/{hash}/operations"),
            &params(&[("limit", "200"), ("order", "asc")]),
        )
        .await
    }

    pub async fn ledger(&self, seq: u64) -> Result<LedgerRecord> {
        self.get_path(&format!("/ledgers/{seq}"), &[]).await
    }

    pub async fn order_book(&self, selling: &Asset, buying: &Asset, limit: u32) -> Result<OrderBook> {
        let mut q = selling.query_params("selling_");
        q.extend(buying.query_params("buying_"));
        q.push(("limit".into(), limit.to_string()));
        self.get_path("/order_book", &q).await
    }

    /// Best paths for sending `amount` of `source` to `destination`.
    pub async fn strict_send_paths(
        &self,
        source: &Asset,
        amount: &str,
        destination: &Asset,
    ) -> Result<Vec<PathRecord>> {
        let mut q = source.query_params("source_");
        q.push(("source_amount".into(), amount.to_string()));
        q.push(("destination_assets".into(), destination.canonical()));
        let page: Page<PathRecord> = self.get_path("/paths/strict-send", &q).await?;
        Ok(page.into_records())
    }

    /// Assets matching a code, most recent first.
    pub async fn assets_by_code(&self, code: &str, limit: u32) -> Result<Vec<AssetRecord>> {
        let limit = limit.to_string();
        let page: Page<AssetRecord> = self
            .get_path(
                "/assets",
                &params(&[("asset_code", code), ("limit", limit.as_str()), ("order", "desc")]),
            )
            .await?;
        Ok(page.into_records())
    }

    /// Stats for one credit asset; `None` when Horizon does not know it.
    pub async fn asset(&self, asset: &Asset) -> Result<Option<AssetRecord>> {
        let (code, issuer) = match asset {
            Asset::Native => return Ok(None),
            Asset::Credit { code, issuer } => (code, issuer),
        };
        let page: Page<AssetRecord> = self
            .get_path(
                "/assets",
                &params(&[
                    ("asset_code", code.as_str()),
                    ("asset_issuer", issuer.as_str()),
                    ("limit", "1"),
                ]),
            )
            .await?;
        Ok(page.into_records().into_iter().next())
    }
}

/// Borrowed pairs to owned query params.
pub fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_building() {
        let c = HorizonClient::new("https://horizon.example/", 5000, 0).unwrap();
        assert_eq!(c.base_url(), "https://horizon.example");
        assert_eq!(
            c.url("/offers", &params(&[("selling", "USDC:GABC"), ("limit", "200")])),
            "https://horizon.example/offers?selling=USDC%3AGABC&limit=200"
        );
        assert_eq!(c.url("/ledgers/5", &[]), "https://horizon.example/ledgers/5");
        assert_eq!(
            c.url("/x?a=1", &params(&[("b", "2")])),
            "https://horizon.example/x?a=1&b=2"
        );
    }
}
