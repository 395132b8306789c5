use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Bytes, extract::State, routing::post, Router};
use axum_extra::extract::cookie::CookieJar;
use bookshelf_authz::{session_cookie, Authenticator, Credentials};
use bookshelf_http::AppError;
use bookshelf_kernel::{InitCtx, Module};

/// Login module: exchanges the configured credentials for a session cookie
pub struct AuthModule {
    authenticator: Authenticator,
}

impl AuthModule {
    pub fn new(authenticator: Authenticator) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            token_ttl_secs = self.authenticator.tokens().ttl().as_secs(),
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/login", post(login))
            .with_state(self.authenticator.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/login": {
                    "post": {
                        "summary": "Log in and receive a `token` session cookie",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Credentials" }
                                }
                            }
                        },
                        "responses": {
                            "200": { "description": "Session cookie set" },
                            "400": { "description": "Malformed body" },
                            "401": { "description": "Invalid username or password" }
                        }
                    }
                }
            },
            "components": {
                "securitySchemes": {
                    "tokenCookie": { "type": "apiKey", "in": "cookie", "name": "token" }
                },
                "schemas": {
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    }
                }
            }
        }))
    }
}

/// The body is decoded as JSON whatever its `Content-Type`.
async fn login(
    State(auth): State<Authenticator>,
    jar: CookieJar,
    body: Bytes,
) -> Result<CookieJar, AppError> {
    let credentials: Credentials = serde_json::from_slice(&body)
        .map_err(|err| AppError::bad_request(format!("invalid login body: {err}")))?;
    let issued = auth.login(&credentials)?;
    Ok(jar.add(session_cookie(&issued)))
}

/// Create the auth module
pub fn create_module(authenticator: Authenticator) -> Arc<AuthModule> {
    Arc::new(AuthModule::new(authenticator))
}
