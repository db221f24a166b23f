//! Amount and key formatting helpers.
//!
//! Horizon reports amounts as 7-decimal strings ("100.0000000") while XDR
//! carries raw stroops (1 XLM = 10^7 stroops). All balance arithmetic here
//! stays in integer stroops so results like `765.9650307 - 51.5` format
//! exactly.

/// Placeholder for a missing value.
pub const DASH: &str = "—";

pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Format a stroop integer string as a decimal amount.
///
/// Examples: "100000000" -> "10", "100000001" -> "10.0000001", "-5" -> "-0.0000005"
pub fn format_stroop(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return DASH.to_string();
    }
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }

    let trimmed = digits.trim_start_matches('0');
    let padded = format!("{trimmed:0>8}");
    let split = padded.len() - 7;
    let int_part = &padded[..split];
    let frac_part = padded[split..].trim_end_matches('0');

    let mut out = String::with_capacity(padded.len() + 2);
    if neg && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Format a stroop count held as an integer.
pub fn format_stroops(stroops: i64) -> String {
    format_stroop(&stroops.to_string())
}

/// Horizon amounts are already decimal; show them as given.
pub fn format_amount(raw: Option<&str>) -> String {
    match raw {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => DASH.to_string(),
    }
}

/// Parse a decimal amount ("765.9650307", "-1.5", "10") into stroops.
/// Returns None for malformed input or more than 7 fractional digits.
pub fn stroops_from_decimal(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
        || frac_part.len() > 7
    {
        return None;
    }
    let int_val: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let frac_val: i64 = if frac_part.is_empty() {
        0
    } else {
        format!("{frac_part:0<7}").parse().ok()?
    };
    let total = int_val
        .checked_mul(STROOPS_PER_UNIT)?
        .checked_add(frac_val)?;
    Some(if neg { -total } else { total })
}

/// Shorten long keys and hashes to `first4…last4`.
pub fn shorten(s: &str) -> String {
    let n = s.chars().count();
    if n <= 12 {
        return s.to_string();
    }
    let head: String = s.chars().take(4).collect();
    let tail: String = s.chars().skip(n - 4).collect();
    format!("{head}…{tail}")
}

/// Shorten an optional key, `—` when absent.
pub fn shorten_opt(s: Option<&str>) -> String {
    match s {
        Some(v) if !v.is_empty() => shorten(v),
        _ => DASH.to_string(),
    }
}

/// Parse a Horizon decimal string into f64 for charting and ratios.
pub fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a float with up to `digits` fractional digits, trimming zeros.
pub fn format_decimal(v: f64, digits: usize) -> String {
    if !v.is_finite() {
        return DASH.to_string();
    }
    let s = format!("{v:.digits$}");
    if s.contains('.') {
        let t = s.trim_end_matches('0').trim_end_matches('.');
        if t == "-0" {
            "0".to_string()
        } else {
            t.to_string()
        }
    } else {
        s
    }
}

/// Rational price `n/d` as a 7-digit decimal.
pub fn format_ratio(n: i64, d: i64) -> String {
    if d == 0 {
        return DASH.to_string();
    }
    format_decimal(n as f64 / d as f64, 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroop_formatting() {
        assert_eq!(format_stroop("100000000"), "10");
        assert_eq!(format_stroop("100000001"), "10.0000001");
        assert_eq!(format_stroop("-5"), "-0.0000005");
        assert_eq!(format_stroop("0"), "0");
        assert_eq!(format_stroop("0000"), "0");
        assert_eq!(format_stroop("5000000"), "0.5");
        assert_eq!(format_stroop("-120000000"), "-12");
        assert_eq!(format_stroop(""), DASH);
        assert_eq!(format_stroop("abc"), "abc");
    }

    #[test]
    fn stroop_round_trip() {
        for raw in ["1", "7", "10000000", "123456789012", "-42"] {
            let dec = format_stroop(raw);
            assert_eq!(stroops_from_decimal(&dec).map(|v| v.to_string()), Some(raw.to_string()));
        }
    }

    #[test]
    fn decimal_to_stroops() {
        assert_eq!(stroops_from_decimal("765.9650307"), Some(7_659_650_307));
        assert_eq!(stroops_from_decimal("51.5"), Some(515_000_000));
        assert_eq!(stroops_from_decimal("-0.5"), Some(-5_000_000));
        assert_eq!(stroops_from_decimal(".5"), Some(5_000_000));
        assert_eq!(stroops_from_decimal("1.12345678"), None);
        assert_eq!(stroops_from_decimal("1e5"), None);
        assert_eq!(stroops_from_decimal(""), None);
    }

    #[test]
    fn shorten_keys() {
        assert_eq!(shorten("GABC"), "GABC");
        assert_eq!(shorten("123456789012"), "123456789012");
        assert_eq!(
            shorten("GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN"),
            "GA5Z…KZVN"
        );
        assert_eq!(shorten_opt(None), DASH);
    }

    #[test]
    fn decimal_trimming() {
        assert_eq!(format_decimal(1.5, 7), "1.5");
        assert_eq!(format_decimal(2.0, 7), "2");
        assert_eq!(format_decimal(-0.0000000001, 7), "0");
        assert_eq!(format_ratio(1, 4), "0.25");
        assert_eq!(format_ratio(1, 0), DASH);
    }
}
