//! Admin dashboard handler. The whole `/admin` subtree sits behind the
//! session gate.

use crate::{AppState, errors::AppError};
use axum::{Json, extract::State};
use serde::Serialize;

/// Summary shown on the admin dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub site_name: String,
    pub images: i64,
    pub comments: i64,
}

/// `GET /admin` — counts for the dashboard header.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, AppError> {
    let stats = state.gallery.stats().await?;
    Ok(Json(DashboardSummary {
        site_name: state.site_name.clone(),
        images: stats.images,
        comments: stats.comments,
    }))
}
