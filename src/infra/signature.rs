//! Stripe-style webhook signature verification.
//!
//! Header format: `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`.
//! Signed payload: `<t>.<raw body bytes>`, HMAC-SHA256 with the shared secret.
//! Several `v1` candidates may be present while a secret is being rotated;
//! one match is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid signature format: {0}")]
    MalformedHeader(&'static str),

    #[error("No signature matches the expected value")]
    NoMatchingSignature,

    #[error("Signature timestamp is {age_secs}s away from now (tolerance {tolerance_secs}s)")]
    StaleTimestamp { age_secs: i64, tolerance_secs: i64 },

    #[error("HMAC key rejected")]
    InvalidKey,
}

/// What to do with a correctly signed request whose timestamp is outside the tolerance window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    #[default]
    Enforce,
    WarnOnly,
}

impl std::str::FromStr for TimestampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enforce" | "reject" => Ok(TimestampPolicy::Enforce),
            "warn" | "warn_only" => Ok(TimestampPolicy::WarnOnly),
            _ => Err(format!(
                "Invalid timestamp policy: {}. Must be 'enforce' or 'warn'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub tolerance_secs: i64,
    pub policy: TimestampPolicy,
}

impl Default for Freshness {
    fn default() -> Self {
        Self {
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            policy: TimestampPolicy::Enforce,
        }
    }
}

/// Parsed signature header. `timestamp_raw` is kept verbatim because the
/// signer hashed the text it sent, not our re-rendering of the integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    pub timestamp: i64,
    timestamp_raw: &'a str,
    pub signatures: Vec<&'a str>,
}

impl<'a> SignatureHeader<'a> {
    pub fn parse(header_value: &'a str) -> Result<Self, VerificationError> {
        let mut timestamp_raw: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in header_value.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "t" => timestamp_raw = Some(value.trim()),
                "v1" => signatures.push(value.trim()),
                _ => {}
            }
        }

        let timestamp_raw =
            timestamp_raw.ok_or(VerificationError::MalformedHeader("missing timestamp"))?;
        let timestamp: i64 = timestamp_raw
            .parse()
            .map_err(|_| VerificationError::MalformedHeader("timestamp is not an integer"))?;

        if signatures.is_empty() {
            return Err(VerificationError::MalformedHeader("missing v1 signature"));
        }

        Ok(Self {
            timestamp,
            timestamp_raw,
            signatures,
        })
    }
}

/// Successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedSignature {
    pub timestamp: i64,
    /// Set when the timestamp was outside the window and the policy only warns.
    pub stale: bool,
}

/// Authenticate `body` against `header_value`.
///
/// Operates on the exact received bytes. Pure: `now` is passed in, and a
/// stale timestamp accepted under [`TimestampPolicy::WarnOnly`] is reported
/// through [`VerifiedSignature::stale`] for the caller to log.
pub fn verify(
    body: &[u8],
    header_value: &str,
    secret: &[u8],
    now: i64,
    freshness: Freshness,
) -> Result<VerifiedSignature, VerificationError> {
    let header = SignatureHeader::parse(header_value)?;
    let expected = compute_signature(secret, header.timestamp_raw, body)?;

    // Every candidate is compared, matched or not.
    let matched = header
        .signatures
        .iter()
        .fold(false, |acc, candidate| constant_time_compare(candidate, &expected) | acc);

    if !matched {
        return Err(VerificationError::NoMatchingSignature);
    }

    let age_secs = now.saturating_sub(header.timestamp);
    let stale = age_secs.saturating_abs() > freshness.tolerance_secs;
    if stale && freshness.policy == TimestampPolicy::Enforce {
        return Err(VerificationError::StaleTimestamp {
            age_secs,
            tolerance_secs: freshness.tolerance_secs,
        });
    }

    Ok(VerifiedSignature {
        timestamp: header.timestamp,
        stale,
    })
}

/// Lowercase hex HMAC-SHA256 over `<timestamp>.<body>`.
pub fn compute_signature(
    secret: &[u8],
    timestamp: &str,
    body: &[u8],
) -> Result<String, VerificationError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| VerificationError::InvalidKey)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a provider-format header value for `body`.
pub fn signature_header(
    secret: &[u8],
    timestamp: i64,
    body: &[u8],
) -> Result<String, VerificationError> {
    let timestamp = timestamp.to_string();
    let signature = compute_signature(secret, &timestamp, body)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

/// Case-insensitive comparison of two hex strings whose running time does not
/// depend on the position of the first difference. A length mismatch is a
/// non-match but still walks the whole of `a`.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();

    let mut result = usize::from(a.len() != b.len());
    for (i, x) in a.iter().enumerate() {
        let y = b.get(i).copied().unwrap_or(0);
        result |= usize::from(x.to_ascii_lowercase() ^ y.to_ascii_lowercase());
    }
    result == 0
}
