//! API endpoints.

mod applications;
mod auth;
mod dashboard;
mod listings;
mod notifications;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/listings", listings::router())
        .nest("/applications", applications::router())
        .nest("/dashboard", dashboard::router())
        .nest("/notifications", notifications::router())
}
