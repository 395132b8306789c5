//! Signed session tokens (HS256 JWT) carrying a username and an expiry.

use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use bookshelf_kernel::settings::AuthSettings;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token is malformed or its signature is invalid")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token is expired")]
    Expired,

    #[error("token ttl of {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

/// Source of the symmetric key tokens are signed with.
pub trait SecretProvider: Send + Sync {
    fn signing_secret(&self) -> &[u8];
}

impl SecretProvider for AuthSettings {
    fn signing_secret(&self) -> &[u8] {
        self.token_secret.as_bytes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub username: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

impl SessionClaims {
    /// A token is valid strictly before `exp`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.exp).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    span: time::Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let span = time::Duration::try_from(ttl).map_err(|_| TokenError::TtlOutOfRange(ttl))?;
        if OffsetDateTime::now_utc().checked_add(span).is_none() {
            return Err(TokenError::TtlOutOfRange(ttl));
        }

        // Expiry is checked against a caller-supplied clock in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
            span,
        })
    }

    pub fn from_provider(provider: &dyn SecretProvider, ttl: Duration) -> Result<Self, TokenError> {
        Self::new(provider.signing_secret(), ttl)
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self, TokenError> {
        Self::from_provider(settings, Duration::from_secs(settings.token_ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(username, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, username: &str, now: OffsetDateTime) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add(self.span)
            .ok_or(TokenError::TtlOutOfRange(self.ttl))?;
        let claims = SessionClaims {
            username: username.to_owned(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, TokenError> {
        let claims = decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
