//! HTTP API layer for the OJT placement portal.
//!
//! - **Endpoints**: auth, listings, applications, dashboards, notifications
//! - **Extractors**: authenticated and optional users
//! - **Middleware**: bearer-token and cookie authentication
//!
//! Built on Axum 0.8. Every route is served under `/api`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// Build the `/api` application with authentication applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
