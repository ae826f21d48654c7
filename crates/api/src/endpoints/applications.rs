//! Application endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use ojt_common::{AppError, AppResult};
use ojt_core::{
    ApplicationView, ApplyInput, UpdateApplicationStatusInput, UpdateOwnApplicationInput, today,
};
use ojt_db::entities::user::Role;
use serde::de::DeserializeOwned;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

fn parse_body<T: DeserializeOwned>(body: serde_json::Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Applications visible to the caller.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ApplicationView>>> {
    let applications = state.application_service.list(&user).await?;
    Ok(ApiResponse::ok(applications))
}

/// Apply to a listing as a student.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ApplyInput>,
) -> AppResult<ApiResponse<ApplicationView>> {
    let application = state
        .application_service
        .apply(&user, input, today())
        .await?;
    Ok(ApiResponse::created(ApplicationView::new(
        application,
        None,
        None,
        Some(&user),
    )))
}

async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ApplicationView>> {
    let application = state.application_service.get(&user, &id).await?;
    Ok(ApiResponse::ok(application))
}

/// Companies review, students edit their own cover letter and documents.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<ApiResponse<ApplicationView>> {
    let application = match user.role {
        Role::Company => {
            let input: UpdateApplicationStatusInput = parse_body(body)?;
            state
                .application_service
                .update_status(&user, &id, input)
                .await?
        }
        Role::Student => {
            let input: UpdateOwnApplicationInput = parse_body(body)?;
            state.application_service.update_own(&user, &id, input).await?
        }
        Role::Admin => {
            return Err(AppError::Forbidden(
                "Administrators cannot modify applications.".to_string(),
            ));
        }
    };

    Ok(ApiResponse::ok(ApplicationView::new(
        application,
        None,
        None,
        None,
    )))
}

async fn destroy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.application_service.delete(&user, &id).await?;
    Ok(no_content())
}

/// Withdraw the caller's active application.
async fn withdraw(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ApplicationView>> {
    let application = state.application_service.withdraw(&user, &id).await?;
    Ok(ApiResponse::ok(ApplicationView::new(
        application,
        None,
        None,
        Some(&user),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(destroy))
        .route("/{id}/withdraw", post(withdraw))
}
