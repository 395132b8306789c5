//! Authentication for the bookshelf service: signed session tokens, the
//! configured credential check and the cookie gate in front of protected routes.

use std::sync::Arc;

use bookshelf_http::AppError;
use bookshelf_kernel::settings::AuthSettings;

pub mod credentials;
pub mod gate;
pub mod token;

pub use credentials::{CredentialVerifier, Credentials, StaticCredentials};
pub use gate::{require_token, session_cookie, token_from_headers, TOKEN_COOKIE};
pub use token::{IssuedToken, SecretProvider, SessionClaims, TokenError, TokenService};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::unauthorized(err.to_string()),
            AuthError::Token(token_err) => token_err.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) | TokenError::Expired => AppError::unauthorized(err.to_string()),
            TokenError::EmptySecret | TokenError::Signing(_) | TokenError::TtlOutOfRange(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

/// Credential check plus token issuance, shared by the login route.
#[derive(Clone)]
pub struct Authenticator {
    tokens: TokenService,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authenticator {
    pub fn new(tokens: TokenService, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { tokens, verifier }
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self, TokenError> {
        Ok(Self::new(
            TokenService::from_settings(settings)?,
            Arc::new(StaticCredentials::from_settings(settings)),
        ))
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verify the credentials and issue a session token for them.
    pub fn login(&self, credentials: &Credentials) -> Result<IssuedToken, AuthError> {
        if !self.verifier.verify(credentials) {
            tracing::info!(username = %credentials.username, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&credentials.username)?;
        tracing::info!(
            username = %credentials.username,
            expires_at = %issued.expires_at,
            "session token issued"
        );
        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    struct AllowEveryone;

    impl CredentialVerifier for AllowEveryone {
        fn verify(&self, _credentials: &Credentials) -> bool {
            true
        }
    }

    #[test]
    fn login_issues_token_for_valid_credentials() {
        let auth = Authenticator::from_settings(&AuthSettings::default()).unwrap();
        let issued = auth.login(&Credentials::new("admin", "password")).unwrap();

        let claims = auth.tokens().verify(&issued.token).unwrap();
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn login_rejects_wrong_password() {
        let auth = Authenticator::from_settings(&AuthSettings::default()).unwrap();
        let err = auth.login(&Credentials::new("admin", "wrong")).unwrap_err();

        assert!(matches!(err, AuthError::InvalidCredentials));
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn verifier_is_substitutable() {
        let tokens = TokenService::from_settings(&AuthSettings::default()).unwrap();
        let auth = Authenticator::new(tokens, Arc::new(AllowEveryone));

        let issued = auth.login(&Credentials::new("guest", "")).unwrap();
        assert_eq!(auth.tokens().verify(&issued.token).unwrap().username, "guest");
    }

    #[test]
    fn empty_secret_fails_construction() {
        let settings = AuthSettings {
            token_secret: String::new(),
            ..AuthSettings::default()
        };
        assert!(matches!(
            Authenticator::from_settings(&settings),
            Err(TokenError::EmptySecret)
        ));
    }

    #[test]
    fn token_errors_map_to_statuses() {
        let expired: AppError = TokenError::Expired.into();
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);

        let empty: AppError = TokenError::EmptySecret.into();
        assert_eq!(empty.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
