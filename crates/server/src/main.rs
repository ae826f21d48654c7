//! OJT placement portal server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ojt_api::AppState;
use ojt_common::Config;
use ojt_core::{
    ApplicationService, DashboardService, ListingService, NotificationService, UserService,
};
use ojt_db::repositories::{
    ApplicationRepository, ListingRepository, NotificationRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Wire repositories and services over one connection pool.
fn build_state(db: Arc<sea_orm::DatabaseConnection>, config: &Config) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(&db));
    let listing_repo = ListingRepository::new(Arc::clone(&db));
    let application_repo = ApplicationRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    let notification_service =
        NotificationService::new(notification_repo, config.notifications.batch_size);

    AppState {
        user_service: UserService::new(user_repo.clone()),
        listing_service: ListingService::new(
            listing_repo.clone(),
            user_repo.clone(),
            application_repo.clone(),
            notification_service.clone(),
        ),
        application_service: ApplicationService::new(
            application_repo.clone(),
            listing_repo.clone(),
            user_repo.clone(),
            notification_service.clone(),
        ),
        notification_service,
        dashboard_service: DashboardService::new(user_repo, listing_repo, application_repo),
        cookie_secure: config.server.cookie_secure,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ojt=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting OJT portal server...");

    let config = Config::load()?;

    let db = ojt_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    ojt_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = build_state(Arc::new(db), &config);

    let app = ojt_api::app(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, url = %config.server.url, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
