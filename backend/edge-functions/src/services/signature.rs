//! Payment webhook signatures
//!
//! Header format: `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`, where each `v1`
//! is HMAC-SHA256 over `"{t}.{raw body}"` keyed with the endpoint secret.
//! Several `v1` entries appear while the gateway rotates secrets.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header is malformed")]
    Malformed,
    #[error("signature timestamp outside tolerance")]
    Expired,
    #[error("no signature matches")]
    Mismatch,
}

struct ParsedHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<ParsedHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::Malformed)?);
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(ParsedHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::Malformed),
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC takes any key size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Check `header` against `payload` at unix time `now`
pub fn verify(
    header: &str,
    payload: &[u8],
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;
    let skew = now
        .checked_sub(parsed.timestamp)
        .map(i64::unsigned_abs)
        .ok_or(SignatureError::Expired)?;
    if skew > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::Expired);
    }

    let mac = mac_for(secret, parsed.timestamp, payload);
    let matched = parsed.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Header value the gateway would send; used by tests and local tooling
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let digest = mac_for(secret, timestamp, payload).finalize().into_bytes();
    format!("t={},v1={}", timestamp, hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    #[test]
    fn test_valid_signature() {
        let header = sign(BODY, SECRET, 1_700_000_000);
        assert_eq!(verify(&header, BODY, SECRET, 1_700_000_100, 300), Ok(()));
    }

    #[test]
    fn test_tampered_body() {
        let header = sign(BODY, SECRET, 1_700_000_000);
        let tampered = br#"{"id":"evt_1","type":"customer.subscription.deleted"}"#;
        assert_eq!(
            verify(&header, tampered, SECRET, 1_700_000_000, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let header = sign(BODY, "whsec_other", 1_700_000_000);
        assert_eq!(
            verify(&header, BODY, SECRET, 1_700_000_000, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_outside_tolerance() {
        let header = sign(BODY, SECRET, 1_700_000_000);
        assert_eq!(
            verify(&header, BODY, SECRET, 1_700_000_301, 300),
            Err(SignatureError::Expired)
        );
        assert_eq!(
            verify(&header, BODY, SECRET, 1_699_999_699, 300),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_extreme_timestamps_are_expired() {
        for ts in [i64::MIN, i64::MAX, -1] {
            let header = format!("t={},v1=00", ts);
            assert_eq!(
                verify(&header, BODY, SECRET, 1_700_000_000, 300),
                Err(SignatureError::Expired),
                "timestamp {}",
                ts
            );
        }
    }

    #[test]
    fn test_any_of_several_signatures() {
        let good = sign(BODY, SECRET, 1_700_000_000);
        let good_sig = good.split_once("v1=").unwrap().1;
        let header = format!("t=1700000000,v1=deadbeef,v0=ignored,v1={}", good_sig);
        assert_eq!(verify(&header, BODY, SECRET, 1_700_000_000, 300), Ok(()));
    }

    #[test]
    fn test_malformed_headers() {
        for header in ["", "t=abc,v1=00", "v1=00", "t=1700000000", "garbage"] {
            assert_eq!(
                verify(header, BODY, SECRET, 1_700_000_000, 300),
                Err(SignatureError::Malformed),
                "header {:?}",
                header
            );
        }
    }
}
