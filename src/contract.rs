//! Soroban contract lookups: the instance ledger key, the JSON-RPC client
//! and XDR decoding of ledger entries and transaction envelopes.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use stellar_xdr::curr::{
    ContractExecutable, FeeBumpTransactionInnerTx, LedgerEntryData, Limits, ReadXdr, ScVal,
    TransactionEnvelope,
};

use crate::error::{Result, StellarxError};
use crate::net::send_with_backoff;
use crate::strkey::{bytes_to_hex, decode_contract_id};

pub const DEFAULT_SOROBAN_RPC_URL: &str = "https://soroban-rpc.mainnet.stellar.gateway.fm";

const LEDGER_ENTRY_CONTRACT_DATA: u32 = 6;
const SC_ADDRESS_TYPE_CONTRACT: u32 = 1;
const SCV_LEDGER_KEY_CONTRACT_INSTANCE: u32 = 20;
const DURABILITY_PERSISTENT: u32 = 1;

/// XDR `LedgerKey::ContractData` for the instance entry of a contract.
pub fn contract_instance_key(contract: &[u8; 32]) -> [u8; 48] {
    let mut out = [0u8; 48];
    out[0..4].copy_from_slice(&LEDGER_ENTRY_CONTRACT_DATA.to_be_bytes());
    out[4..8].copy_from_slice(&SC_ADDRESS_TYPE_CONTRACT.to_be_bytes());
    out[8..40].copy_from_slice(contract);
    out[40..44].copy_from_slice(&SCV_LEDGER_KEY_CONTRACT_INSTANCE.to_be_bytes());
    out[44..48].copy_from_slice(&DURABILITY_PERSISTENT.to_be_bytes());
    out
}

/// Base64 instance key for a `C…` contract id.
pub fn contract_instance_key_b64(contract_id: &str) -> Result<String> {
    use base64::Engine as _;
    let hash = decode_contract_id(contract_id)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(contract_instance_key(&hash)))
}

// ---------------------------------------------------------------------------
// JSON-RPC

#[derive(Clone, Debug, Deserialize)]
pub struct LedgerEntryResult {
    pub key: String,
    pub xdr: String,
    #[serde(rename = "lastModifiedLedgerSeq", default)]
    pub last_modified_ledger_seq: Option<u64>,
    #[serde(rename = "liveUntilLedgerSeq", default)]
    pub live_until_ledger_seq: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LedgerEntries {
    #[serde(default)]
    pub entries: Option<Vec<LedgerEntryResult>>,
    #[serde(rename = "latestLedger", default)]
    pub latest_ledger: u64,
}

impl LedgerEntries {
    pub fn entries(&self) -> &[LedgerEntryResult] {
        self.entries.as_deref().unwrap_or(&[])
    }
}

#[derive(Clone, Debug)]
pub struct SorobanRpc {
    url: String,
    http: reqwest::Client,
    retries: u8,
}

impl SorobanRpc {
    pub fn new(url: &str, timeout_ms: u64, retries: u8) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(SorobanRpc {
            url: url.to_string(),
            http,
            retries,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST a JSON-RPC 2.0 call and return its `result`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({"jsonrpc": "2.0", "id": "stellarx", "method": method, "params": params});
        log::debug!("[rpc] {method} -> {}", self.url);
        let res = send_with_backoff(self.http.post(&self.url).json(&body), method, self.retries).await?;
        let status = res.status().as_u16();
        if !res.status().is_success() {
            return Err(StellarxError::Http {
                status,
                detail: None,
            });
        }
        let v: Value = res.json().await?;
        rpc_result(v)
    }

    pub async fn get_ledger_entries(&self, keys: &[String]) -> Result<LedgerEntries> {
        let result = self.call("getLedgerEntries", json!({ "keys": keys })).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Instance entry of a contract, `None` when the ledger has no such entry.
    pub async fn contract_instance(&self, contract_id: &str) -> Result<Option<ContractInstance>> {
        let key = contract_instance_key_b64(contract_id)?;
        let res = self.get_ledger_entries(&[key]).await?;
        let Some(entry) = res.entries().first() else {
            return Ok(None);
        };
        Ok(Some(ContractInstance::from_entry(entry, res.latest_ledger)))
    }
}

/// Pull `result` out of a JSON-RPC reply, surfacing `error.code/message`.
pub fn rpc_result(v: Value) -> Result<Value> {
    if let Some(err) = v.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("rpc error")
            .to_string();
        return Err(StellarxError::Rpc { code, message });
    }
    match v {
        Value::Object(mut map) => map
            .remove("result")
            .ok_or_else(|| StellarxError::Decode("invalid rpc payload (no result)".into())),
        _ => Err(StellarxError::Decode("invalid rpc payload".into())),
    }
}

// ---------------------------------------------------------------------------
// XDR decoding

pub fn decode_ledger_entry(xdr_b64: &str) -> Result<LedgerEntryData> {
    LedgerEntryData::from_xdr_base64(xdr_b64, Limits::none())
        .map_err(|e| StellarxError::Decode(format!("ledger entry: {e}")))
}

/// Ledger entry data as JSON.
pub fn decode_ledger_entry_data(xdr_b64: &str) -> Result<Value> {
    let data = decode_ledger_entry(xdr_b64)?;
    Ok(serde_json::to_value(&data)?)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Executable {
    Wasm(String),
    StellarAsset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceSummary {
    pub executable: Executable,
    pub storage_entries: usize,
}

pub fn summarize_instance(data: &LedgerEntryData) -> Option<InstanceSummary> {
    let LedgerEntryData::ContractData(cd) = data else {
        return None;
    };
    let ScVal::ContractInstance(inst) = &cd.val else {
        return None;
    };
    let executable = match &inst.executable {
        ContractExecutable::Wasm(hash) => Executable::Wasm(bytes_to_hex(&hash.0)),
        ContractExecutable::StellarAsset => Executable::StellarAsset,
    };
    Some(InstanceSummary {
        executable,
        storage_entries: inst.storage.as_ref().map(|m| m.0.len()).unwrap_or(0),
    })
}

/// What the contract view shows for an instance entry.
#[derive(Clone, Debug)]
pub struct ContractInstance {
    pub latest_ledger: u64,
    pub last_modified: Option<u64>,
    pub live_until: Option<u64>,
    pub summary: Option<InstanceSummary>,
    pub json: Option<Value>,
    /// Entry XDR, shown as-is when decoding fails.
    pub xdr: String,
}

impl ContractInstance {
    pub fn from_entry(entry: &LedgerEntryResult, latest_ledger: u64) -> Self {
        let decoded = decode_ledger_entry(&entry.xdr);
        if let Err(e) = &decoded {
            log::warn!("[contract] {e}");
        }
        let decoded = decoded.ok();
        ContractInstance {
            latest_ledger,
            last_modified: entry.last_modified_ledger_seq,
            live_until: entry.live_until_ledger_seq,
            summary: decoded.as_ref().and_then(summarize_instance),
            json: decoded.as_ref().and_then(|d| serde_json::to_value(d).ok()),
            xdr: entry.xdr.clone(),
        }
    }
}

/// Operations of a base64 transaction envelope in XDR JSON shape
/// (`{"source_account", "body": {"<kind>": {...}}}`). Fee bumps yield
/// the inner transaction's operations.
pub fn envelope_operations(envelope_b64: &str) -> Result<Vec<Value>> {
    let env = TransactionEnvelope::from_xdr_base64(envelope_b64, Limits::none())
        .map_err(|e| StellarxError::Decode(format!("envelope: {e}")))?;
    let ops = match &env {
        TransactionEnvelope::TxV0(e) => e.tx.operations.to_vec(),
        TransactionEnvelope::Tx(e) => e.tx.operations.to_vec(),
        TransactionEnvelope::TxFeeBump(e) => match &e.tx.inner_tx {
            FeeBumpTransactionInnerTx::Tx(inner) => inner.tx.operations.to_vec(),
        },
    };
    ops.iter()
        .map(|op| serde_json::to_value(op).map_err(StellarxError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{
        ContractDataDurability, ContractDataEntry, ExtensionPoint, Hash, ScAddress,
        ScContractInstance, WriteXdr,
    };

    #[test]
    fn instance_key_layout() {
        let hash = [0xabu8; 32];
        let key = contract_instance_key(&hash);
        assert_eq!(&key[0..8], &[0, 0, 0, 6, 0, 0, 0, 1]);
        assert_eq!(&key[8..40], &hash);
        assert_eq!(&key[40..48], &[0, 0, 0, 0x14, 0, 0, 0, 1]);
    }

    #[test]
    fn instance_key_from_strkey() {
        let id = stellar_strkey::Contract([7u8; 32]).to_string();
        let b64 = contract_instance_key_b64(&id).unwrap();
        use base64::Engine as _;
        let raw = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        assert_eq!(raw.len(), 48);
        assert_eq!(&raw[8..40], &[7u8; 32]);
        assert!(contract_instance_key_b64("CNOTAKEY").is_err());
    }

    #[test]
    fn rpc_errors_surface() {
        let err = rpc_result(json!({"jsonrpc": "2.0", "error": {"code": -32602, "message": "bad key"}}))
            .unwrap_err();
        assert!(matches!(err, StellarxError::Rpc { code: -32602, .. }));
        let ok = rpc_result(json!({"result": {"latestLedger": 5}})).unwrap();
        assert_eq!(ok["latestLedger"], 5);
        assert!(rpc_result(json!({"id": 1})).is_err());
    }

    #[test]
    fn entries_tolerate_null() {
        let e: LedgerEntries = serde_json::from_value(json!({"entries": null, "latestLedger": 9})).unwrap();
        assert!(e.entries().is_empty());
        assert_eq!(e.latest_ledger, 9);
    }

    #[test]
    fn summarizes_wasm_instance() {
        let data = LedgerEntryData::ContractData(ContractDataEntry {
            ext: ExtensionPoint::V0,
            contract: ScAddress::Contract(Hash([1u8; 32])),
            key: ScVal::LedgerKeyContractInstance,
            durability: ContractDataDurability::Persistent,
            val: ScVal::ContractInstance(ScContractInstance {
                executable: ContractExecutable::Wasm(Hash([0xcdu8; 32])),
                storage: None,
            }),
        });
        let b64 = data.to_xdr_base64(Limits::none()).unwrap();
        let decoded = decode_ledger_entry(&b64).unwrap();
        let summary = summarize_instance(&decoded).unwrap();
        assert_eq!(summary.executable, Executable::Wasm("cd".repeat(32)));
        assert_eq!(summary.storage_entries, 0);
        assert!(decode_ledger_entry_data(&b64).unwrap().is_object());
        assert!(decode_ledger_entry("not xdr").is_err());
    }
}
