use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quillgate_core::UserId;

/// Claims carried inside a signed credential.
///
/// Only the principal identity and the validity window are encoded; role and
/// profile data are always re-read from the user store on each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / principal identifier.
    pub sub: UserId,

    /// Issued-at timestamp (seconds since epoch on the wire).
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp (seconds since epoch on the wire).
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens in [`crate::TokenCodec`]; this only checks
/// the claims against `now`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(now: DateTime<Utc>, ttl: Duration) -> TokenClaims {
        TokenClaims {
            sub: UserId::new(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    #[test]
    fn accepts_inside_window() {
        let now = Utc::now();
        let c = claims(now, Duration::hours(24));
        assert_eq!(validate_claims(&c, now + Duration::hours(23)), Ok(()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let c = claims(now, Duration::hours(24));
        assert_eq!(
            validate_claims(&c, c.expires_at),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_future_and_inverted_windows() {
        let now = Utc::now();
        let c = claims(now, Duration::hours(1));
        assert_eq!(
            validate_claims(&c, now - Duration::minutes(5)),
            Err(TokenValidationError::NotYetValid)
        );

        let inverted = claims(now, Duration::hours(-1));
        assert_eq!(
            validate_claims(&inverted, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn wire_format_uses_numeric_dates() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let c = claims(now, Duration::hours(24));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["iat"], 1_700_000_000i64);
        assert_eq!(json["exp"], 1_700_086_400i64);
    }
}
