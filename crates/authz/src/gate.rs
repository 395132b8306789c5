//! Cookie-based token gate placed in front of protected routes.

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use bookshelf_http::AppError;

use crate::token::{IssuedToken, TokenService};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Middleware rejecting requests without a valid `token` cookie.
///
/// Install with `axum::middleware::from_fn_with_state(tokens, require_token)`.
/// The request is passed on untouched; claims are not forwarded.
pub async fn require_token(
    State(tokens): State<TokenService>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers())?
        .ok_or_else(|| AppError::unauthorized("missing token cookie"))?;

    match tokens.verify(&token) {
        Ok(claims) => {
            tracing::debug!(username = %claims.username, "token accepted");
        }
        Err(err) => {
            tracing::info!(error = %err, "token rejected");
            return Err(AppError::unauthorized("invalid or expired token"));
        }
    }

    Ok(next.run(request).await)
}

/// Extract the `token` cookie value.
///
/// `Ok(None)` when no such cookie is present; a `Cookie` header that is not
/// readable text is a bad request.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    for value in headers.get_all(COOKIE) {
        value
            .to_str()
            .map_err(|_| AppError::bad_request("malformed cookie header"))?;
    }

    Ok(CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned()))
}

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(issued: &IssuedToken) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, issued.token.clone()))
        .expires(issued.expires_at)
        .path("/")
        .http_only(true)
        .build()
}
