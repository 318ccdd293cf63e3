//! Signed, time-limited credentials (HS256 JWT).
//!
//! The codec is constructed once at startup from an explicit secret and then
//! shared; nothing in here reads the process environment.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use quillgate_core::UserId;

use crate::claims::{validate_claims, TokenClaims, TokenValidationError};

/// Fixed validity window of an issued credential.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signing secret was empty; treated as fatal at startup.
    #[error("signing secret must not be empty")]
    MissingSecret,

    #[error("credential expired")]
    Expired,

    /// Bad signature, bad structure, or an impossible time window.
    #[error("malformed credential")]
    Malformed,

    #[error("failed to sign credential: {0}")]
    Signing(String),
}

/// A freshly signed credential together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies credentials with a process-wide HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        Self::with_ttl(secret, DEFAULT_TOKEN_TTL)
    }

    pub fn with_ttl(secret: impl AsRef<[u8]>, ttl: Duration) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    /// Issue a credential for `user_id`, valid from `now` for the configured TTL.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;
        let claims = TokenClaims {
            sub: user_id,
            issued_at: now,
            expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at,
        })
    }

    /// Verify signature and validity window, returning the encoded principal.
    ///
    /// Expiry is judged against the caller-supplied `now` rather than the
    /// library clock so the outcome is deterministic under test.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Malformed)?;

        match validate_claims(&data.claims, now) {
            Ok(()) => Ok(data.claims.sub),
            Err(TokenValidationError::Expired) => Err(TokenError::Expired),
            Err(TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow) => {
                Err(TokenError::Malformed)
            }
        }
    }
}
