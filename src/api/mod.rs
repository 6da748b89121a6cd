//! HTTP interface - axum router, shared state and server lifecycle.
//!
//! Handlers stay thin: they extract the caller and the payload, call into
//! [`crate::core`], and serialize the result. Every error is rendered by
//! [`error`] as `{"error": "..."}` with the matching status code.

/// Extractors for the auth gate and request parsing
pub mod auth;
/// Error rendering
pub mod error;
/// Handlers
pub mod routes;

use crate::{core::auth::AuthConfig, errors::Result};
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use routes::{animals, bookings, diseases, owners, reports, services, session, users, visits};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Token and password settings
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    /// Wraps the connection and auth settings for sharing across handlers.
    #[must_use]
    pub fn new(db: DatabaseConnection, auth: AuthConfig) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
        }
    }
}

/// Builds the full `/api` router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/login", post(session::login))
        .route(
            "/api/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/api/services/:id",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        .route(
            "/api/reports",
            get(reports::list_reports).post(reports::generate_report),
        )
        .route(
            "/api/reports/:id",
            get(reports::get_report).delete(reports::delete_report),
        )
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/owners",
            get(owners::list_owners).post(owners::create_owner),
        )
        .route(
            "/api/owners/:id",
            get(owners::get_owner)
                .put(owners::update_owner)
                .delete(owners::delete_owner),
        )
        .route(
            "/api/animals",
            get(animals::list_animals).post(animals::create_animal),
        )
        .route("/api/animals/search", get(animals::search_animals))
        .route(
            "/api/animals/:id",
            get(animals::get_animal)
                .put(animals::update_animal)
                .delete(animals::delete_animal),
        )
        .route(
            "/api/animals/:id/medical-history",
            post(animals::add_medical_record),
        )
        .route(
            "/api/animals/:id/medical-history/:record_id",
            put(animals::replace_medical_record).delete(animals::remove_medical_record),
        )
        .route(
            "/api/diseases",
            get(diseases::list_diseases).post(diseases::create_disease),
        )
        .route(
            "/api/diseases/:id",
            get(diseases::get_disease)
                .put(diseases::update_disease)
                .delete(diseases::delete_disease),
        )
        .route(
            "/api/visits",
            get(visits::list_visits).post(visits::create_visit),
        )
        .route(
            "/api/visits/:id",
            get(visits::get_visit)
                .put(visits::update_visit)
                .delete(visits::delete_visit),
        )
        .route("/api/bookings", post(bookings::create_booking))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds to `0.0.0.0:<port>` and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = router(state);

    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
