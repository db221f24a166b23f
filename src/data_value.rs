//! Decoder for account data entries and `manage_data` values.
//!
//! Values arrive base64-encoded from Horizon and as hex from XDR JSON.
//! Auto-detection tries base64 first, then even-length hex.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

use crate::strkey::{bytes_to_hex, hex_to_bytes};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Base64,
    Hex,
    Auto,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedValue {
    /// Strict UTF-8 text, `None` when invalid or holding control characters.
    pub text: Option<String>,
    /// Lowercase hex of the decoded bytes.
    pub hex: String,
}

/// Decode with auto-detection. `None` means the caller should show the raw string.
pub fn decode_value(raw: &str) -> Option<DecodedValue> {
    decode_value_as(raw, Encoding::Auto)
}

pub fn decode_value_as(raw: &str, encoding: Encoding) -> Option<DecodedValue> {
    let s = raw.trim();
    let bytes = match encoding {
        Encoding::Base64 => B64.decode(s).ok()?,
        Encoding::Hex => hex_to_bytes(s)?,
        Encoding::Auto => match B64.decode(s) {
            Ok(b) => b,
            Err(_) => hex_to_bytes(s)?,
        },
    };
    Some(from_bytes(&bytes))
}

pub fn from_bytes(bytes: &[u8]) -> DecodedValue {
    let text = std::str::from_utf8(bytes)
        .ok()
        .filter(|t| !t.chars().any(is_control))
        .map(str::to_string);
    DecodedValue {
        text,
        hex: bytes_to_hex(bytes),
    }
}

// [\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x9F]
fn is_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}
