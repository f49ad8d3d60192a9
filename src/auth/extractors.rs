use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::claims::{Claims, Role};
use super::jwt::SessionIssuer;
use crate::{config::AppConfig, error::AuthError};

/// Pulls the raw session token from the session cookie, falling back to a
/// `Bearer` Authorization header.
pub(crate) fn session_token(jar: &CookieJar, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = jar.get(cookie_name) {
        return Some(cookie.value().to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Any authenticated user.
pub struct AuthSession(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    Arc<SessionIssuer>: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<SessionIssuer>::from_ref(state);
        let config = Arc::<AppConfig>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let token = session_token(&jar, &parts.headers, &config.session.cookie_name)
            .ok_or(AuthError::Unauthenticated)?;
        let claims = sessions.parse(&token).map_err(|_| {
            warn!("invalid or expired session");
            AuthError::Unauthenticated
        })?;
        Ok(AuthSession(claims))
    }
}

/// An authenticated poster; seekers get `Forbidden`.
pub struct PosterSession(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for PosterSession
where
    S: Send + Sync,
    Arc<SessionIssuer>: FromRef<S>,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthSession(claims) = AuthSession::from_request_parts(parts, state).await?;
        if claims.role != Role::Poster {
            return Err(AuthError::Forbidden);
        }
        Ok(PosterSession(claims))
    }
}
