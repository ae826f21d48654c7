//! Dashboard endpoints.

use axum::{Router, extract::State, routing::get};
use ojt_common::AppResult;
use ojt_core::{AdminStats, CompanyStats, StudentStats};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

async fn company_stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CompanyStats>> {
    let stats = state.dashboard_service.company_stats(&user).await?;
    Ok(ApiResponse::ok(stats))
}

async fn student_stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<StudentStats>> {
    let stats = state.dashboard_service.student_stats(&user).await?;
    Ok(ApiResponse::ok(stats))
}

async fn admin_stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<AdminStats>> {
    let stats = state.dashboard_service.admin_stats(&user).await?;
    Ok(ApiResponse::ok(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/company-stats", get(company_stats))
        .route("/student-stats", get(student_stats))
        .route("/admin-stats", get(admin_stats))
}
