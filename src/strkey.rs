//! Strkey helpers on top of the `stellar-strkey` codec.

use crate::error::{Result, StellarxError};

fn is_strkey_shape(s: &str, prefix: u8) -> bool {
    let b = s.as_bytes();
    b.len() == 56
        && b[0] == prefix
        && b[1..]
            .iter()
            .all(|c| c.is_ascii_uppercase() || (b'2'..=b'7').contains(c))
}

/// `^G[A-Z2-7]{55}$`
pub fn is_account_id(s: &str) -> bool {
    is_strkey_shape(s, b'G')
}

/// `^C[A-Z2-7]{55}$`
pub fn is_contract_id(s: &str) -> bool {
    is_strkey_shape(s, b'C')
}

/// 64 hex chars, either case.
pub fn is_tx_hash(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a `C…` contract address into its 32-byte hash.
pub fn decode_contract_id(id: &str) -> Result<[u8; 32]> {
    stellar_strkey::Contract::from_string(id.trim())
        .map(|c| c.0)
        .map_err(|e| StellarxError::Validation(format!("invalid contract id: {e:?}")))
}

/// Decode a `G…` account id into its ed25519 key.
pub fn decode_account_id(id: &str) -> Result<[u8; 32]> {
    stellar_strkey::ed25519::PublicKey::from_string(id.trim())
        .map(|k| k.0)
        .map_err(|e| StellarxError::Validation(format!("invalid account id: {e:?}")))
}

pub fn encode_contract_address(hash: &[u8; 32]) -> String {
    stellar_strkey::Contract(*hash).to_string()
}

/// Encode a hex contract hash (as found in XDR JSON) into a `C…` address.
pub fn encode_contract_address_hex(hex: &str) -> Option<String> {
    let bytes = hex_to_bytes(hex)?;
    let arr: [u8; 32] = bytes.try_into().ok()?;
    Some(encode_contract_address(&arr))
}

/// Signature hint of an account: the last four bytes of its key, as hex.
pub fn signer_hint(account: &str) -> Option<String> {
    let key = decode_account_id(account).ok()?;
    Some(bytes_to_hex(&key[28..]))
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn hex_to_bytes(s: &str) -> Option<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> String {
        let mut key = [0u8; 32];
        key[28..].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        stellar_strkey::ed25519::PublicKey(key).to_string()
    }

    #[test]
    fn shape_checks() {
        let account = account();
        assert!(is_account_id(&account));
        assert!(!is_account_id(&account[1..]));
        assert!(!is_account_id(&account.to_lowercase()));
        assert!(!is_contract_id(&account));
        assert!(is_tx_hash(&"aB".repeat(32)));
        assert!(!is_tx_hash(&"g".repeat(64)));
    }

    #[test]
    fn contract_round_trip() {
        let hash = [7u8; 32];
        let addr = encode_contract_address(&hash);
        assert!(addr.starts_with('C'));
        assert!(is_contract_id(&addr));
        assert_eq!(decode_contract_id(&addr).unwrap(), hash);
        assert_eq!(
            encode_contract_address_hex(&"07".repeat(32)).as_deref(),
            Some(addr.as_str())
        );
    }

    #[test]
    fn account_decoding() {
        let account = account();
        assert_eq!(decode_account_id(&account).unwrap()[28..], [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(signer_hint(&account).as_deref(), Some("deadbeef"));
        assert!(decode_account_id("GBAD").is_err());
        assert!(decode_contract_id(&account).is_err());
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_to_bytes("00ff10"), Some(vec![0, 255, 16]));
        assert_eq!(hex_to_bytes("abc"), None);
        assert_eq!(bytes_to_hex(&[0xde, 0xad]), "dead");
    }
}
