//! Display-only decoding of access token claims
//!
//! The payload segment of the access token is decoded **without verifying the
//! signature**. The result is good for showing who is signed in and nothing
//! else: authorization decisions must never be based on these claims, the
//! backend is the only party that can vouch for them.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine as _, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Standard alphabet, padding optional, non-canonical trailing bits tolerated
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Identity attributes carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawClaims")]
pub struct IdentityClaims {
    /// Subject identifier (`sub`)
    #[serde(rename = "sub")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name (`name`, falling back to `username`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiry, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issue time, seconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Payload as issued; some issuers put the display name under `username`
#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    exp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    iat: Option<i64>,
}

impl From<RawClaims> for IdentityClaims {
    fn from(raw: RawClaims) -> Self {
        Self {
            id: raw.sub,
            email: raw.email,
            name: raw.name.or(raw.username),
            exp: raw.exp,
            iat: raw.iat,
        }
    }
}

impl IdentityClaims {
    /// Best label to show for this identity
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    /// Expiry as a UTC timestamp, when present and in range
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token had expired at `unix_secs`; tokens without `exp` never do
    #[must_use]
    pub fn is_expired_at(&self, unix_secs: i64) -> bool {
        self.exp.is_some_and(|exp| unix_secs >= exp)
    }

    /// Whether the token has expired by the local clock
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Decode the identity claims of a compact three-segment token
///
/// Returns `None` for anything that is not exactly three non-empty
/// dot-separated segments, for a payload that is not base64url, and for a
/// payload that is not a JSON object with a non-empty `sub`. Never panics.
#[must_use]
pub fn decode_claims(token: &str) -> Option<IdentityClaims> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return None;
    }

    let standard = payload.replace('-', "+").replace('_', "/");
    let bytes = LENIENT_BASE64.decode(standard.trim_end_matches('=')).ok()?;
    let claims: IdentityClaims = serde_json::from_slice(&bytes).ok()?;

    if claims.id.is_empty() {
        return None;
    }

    Some(claims)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))))
}
