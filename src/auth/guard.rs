//! Route-level authorization for the poster panel.
//!
//! The policy is a pure function of the request path and the parsed session;
//! the middleware only supplies those two inputs and turns the decision into
//! a response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use super::claims::{Claims, Role};
use super::extractors::session_token;
use crate::state::AppState;

pub const PROTECTED_PREFIXES: [&str; 3] = ["/dashboard", "/post-job", "/my-jobs"];
pub const LOGIN_PATH: &str = "/login";
pub const JOBS_PATH: &str = "/jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Longest protected prefix covering `path`, matched on segment boundaries.
pub fn protected_prefix(path: &str) -> Option<&'static str> {
    PROTECTED_PREFIXES
        .iter()
        .copied()
        .filter(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .max_by_key(|prefix| prefix.len())
}

pub fn decide(path: &str, session: Option<&Claims>) -> RouteDecision {
    if protected_prefix(path).is_none() {
        return RouteDecision::Allow;
    }
    match session.map(|c| c.role) {
        None => RouteDecision::Redirect(LOGIN_PATH),
        Some(Role::Seeker) => RouteDecision::Redirect(JOBS_PATH),
        Some(Role::Poster) => RouteDecision::Allow,
    }
}

pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if protected_prefix(&path).is_none() {
        return next.run(req).await;
    }

    let claims = session_token(&jar, req.headers(), &state.config.session.cookie_name)
        .and_then(|token| state.sessions.parse(&token).ok());

    match decide(&path, claims.as_ref()) {
        RouteDecision::Allow => next.run(req).await,
        RouteDecision::Redirect(target) => {
            debug!(%path, %target, "route guard redirect");
            Redirect::to(target).into_response()
        }
    }
}
