//! Report routes.

use axum::{Json, Router, extract::State, routing::post};
use tracing::info;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use ifinance_core::reports::{Report, ReportRequest};
use ifinance_db::ReportRepository;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/generate", post(generate_report))
}

/// POST `/reports/generate` - Build a report over the caller's books.
async fn generate_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ReportRequest>,
) -> Result<Json<Report>, ApiError> {
    let report = ReportRepository::new((*state.db).clone())
        .generate(auth.user_id(), &request)
        .await?;

    info!(
        owner_id = %auth.user_id(),
        report_type = request.report_type.display_name(),
        "Report generated"
    );
    Ok(Json(report))
}
