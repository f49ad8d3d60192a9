use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::{
    auth::{
        claims::{session_view, SessionView},
        extractors::PosterSession,
    },
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub session: SessionView,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Data for the poster panel landing page.
pub async fn dashboard(PosterSession(claims): PosterSession) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        session: session_view(&claims),
    })
}
