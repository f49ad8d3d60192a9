use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        claims::{session_view, Identity, SessionView},
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        extractors::AuthSession,
        jwt::SESSION_TTL,
        repo_types::User,
        services,
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Identity>), AuthError> {
    let Json(payload) = payload?;
    let identity = services::register(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(identity)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    // An unreadable body fails like any other login attempt.
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, "login body rejected");
        AuthError::InvalidCredentials
    })?;
    let identity = services::authorize(state.store.as_ref(), &payload.email, &payload.password).await?;

    let token = state.sessions.issue(&identity).map_err(|e| {
        error!(error = %e, "session sign failed");
        AuthError::Internal(e.into())
    })?;
    let claims = state.sessions.parse(&token).map_err(|e| AuthError::Internal(e.into()))?;

    let cfg = &state.config.session;
    let cookie = Cookie::build((cfg.cookie_name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.cookie_secure)
        .max_age(TimeDuration::seconds(SESSION_TTL.as_secs() as i64));

    info!(user_id = %identity.id, "user logged in");
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            session: session_view(&claims),
        }),
    ))
}

/// Sessions are stateless, so logging out only drops the client's cookie.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookie = Cookie::build(state.config.session.cookie_name.clone()).path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

pub async fn session(AuthSession(claims): AuthSession) -> Json<SessionView> {
    Json(session_view(&claims))
}

#[instrument(skip(state, claims))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Result<Json<User>, AuthError> {
    match state.store.find_by_id(claims.sub).await? {
        Some(user) => Ok(Json(user)),
        None => {
            error!(user_id = %claims.sub, "session refers to missing user");
            Err(AuthError::Unauthenticated)
        }
    }
}
