//! HTTP interface - routes, handlers, and server setup.
//!
//! The handlers stay thin: they parse requests, pick the caller identity off
//! the `x-user-id` header, and delegate to `core`. All business rules and
//! error taxonomy live below this layer.

/// Request/response DTOs and route handlers
pub mod handlers;

use crate::errors::Result;
use axum::{
    Router,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tracing::info;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
}

/// Builds the application router with all scheduler routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/recurring",
            post(handlers::create_recurring).get(handlers::list_recurring),
        )
        .route("/recurring/upcoming", get(handlers::list_upcoming))
        .route("/recurring/totals", get(handlers::monthly_totals))
        .route(
            "/recurring/:id",
            get(handlers::get_recurring)
                .put(handlers::update_recurring)
                .delete(handlers::delete_recurring),
        )
        .route("/recurring/:id/toggle", patch(handlers::toggle_recurring))
        .route(
            "/categories",
            post(handlers::create_category).get(handlers::list_categories),
        )
}

/// Binds the listener and serves the API until the process exits.
pub async fn serve(bind_address: &str, db: DatabaseConnection) -> Result<()> {
    let app = router().with_state(AppState { db });
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("listening on {bind_address}");
    axum::serve(listener, app).await?;
    Ok(())
}
