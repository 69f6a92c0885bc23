use std::sync::Arc;

use {
    axum::{
        extract::{FromRef, FromRequestParts},
        http::{HeaderMap, StatusCode, request::Parts},
        response::{IntoResponse, Json, Response},
    },
    tracing::{debug, error},
};

use crate::{
    auth::{AuthIdentity, AuthMethod, ResolvedAuth},
    state::GatewayState,
};

/// Header carrying the session token issued at login.
pub const TOKEN_HEADER: &str = "token";

/// Axum extractor that authenticates the caller and yields their identity.
///
/// Returns 401 when the token is missing or unknown.
pub struct AuthUser(pub AuthIdentity);

impl AuthUser {
    pub fn uid(&self) -> &str {
        &self.0.uid
    }

    pub fn method(&self) -> AuthMethod {
        self.0.method
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<GatewayState>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gw = Arc::<GatewayState>::from_ref(state);

        if let ResolvedAuth::Disabled { anonymous_uid } = &gw.auth {
            return Ok(AuthUser(AuthIdentity {
                uid: anonymous_uid.clone(),
                method: AuthMethod::Anonymous,
            }));
        }

        let Some((token, method)) = extract_token(&parts.headers) else {
            return Err(unauthorized());
        };

        match gw.tokens.uid_for_token(token).await {
            Ok(Some(uid)) => Ok(AuthUser(AuthIdentity { uid, method })),
            Ok(None) => {
                debug!("rejected unknown session token");
                Err(unauthorized())
            },
            Err(e) => {
                error!(error = %e, "failed to look up session token");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "authentication unavailable" })),
                )
                    .into_response())
            },
        }
    }
}

/// Pull a session token from the `token` header, falling back to
/// `Authorization: Bearer <token>`. Blank values count as absent.
pub fn extract_token(headers: &HeaderMap) -> Option<(&str, AuthMethod)> {
    if let Some(token) = header_value(headers, TOKEN_HEADER) {
        return Some((token, AuthMethod::TokenHeader));
    }

    header_value(headers, "authorization")
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|token| (token, AuthMethod::Bearer))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "not authenticated" })),
    )
        .into_response()
}
