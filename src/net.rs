//! Small helpers for rate-limit friendly networking.

use std::time::Duration;

/// Statuses worth retrying.
pub fn is_transient(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Send a request, retrying transient statuses and connection errors
/// with exponential backoff.
pub async fn send_with_backoff(
    rb: reqwest::RequestBuilder,
    label: &str,
    max_retries: u8,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut attempt = 0u8;
    loop {
        let Some(req) = rb.try_clone() else {
            // streaming bodies cannot be cloned; single shot
            return rb.send().await;
        };
        match req.send().await {
            Ok(r) => {
                let status = r.status().as_u16();
                if is_transient(status) && attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[net] {status} {label} retry={attempt} backoff={back_ms}ms");
                    tokio::time::sleep(Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Ok(r);
            }
            Err(e) => {
                if attempt < max_retries && (e.is_connect() || e.is_timeout() || e.is_request()) {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[net] err {label} retry={attempt} backoff={back_ms}ms : {e}");
                    tokio::time::sleep(Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Err(e);
            }
        }
    }
}

/// 300, 600, 1200, 2400, 4800, 9600 ms plus up to 250 ms of jitter.
pub fn backoff_delay_ms(attempt: u8) -> u64 {
    let base = 300u64.saturating_mul(1u64 << (attempt.clamp(1, 6) - 1));
    base + jitter_ms()
}

#[cfg(feature = "native")]
fn jitter_ms() -> u64 {
    use rand::{thread_rng, Rng};
    thread_rng().gen_range(0..=250)
}

#[cfg(not(feature = "native"))]
fn jitter_ms() -> u64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        for s in [429, 500, 502, 503, 504] {
            assert!(is_transient(s));
        }
        for s in [200, 400, 404, 501] {
            assert!(!is_transient(s));
        }
    }

    #[test]
    fn backoff_grows() {
        let first = backoff_delay_ms(1);
        assert!((300..=550).contains(&first));
        let sixth = backoff_delay_ms(6);
        assert!((9600..=9850).contains(&sixth));
        // capped past six attempts
        assert!(backoff_delay_ms(12) <= 9850);
    }
}
