mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/location",
            get(handlers::current_location).delete(handlers::clear_location),
        )
        .route("/api/location/manual", post(handlers::manual_location))
        .route("/api/location/image", post(handlers::image_location))
        .route("/api/location/gps", post(handlers::gps_location))
        .route("/api/location/gps/cancel", post(handlers::cancel_gps))
        .route("/api/regions", get(handlers::region_list))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "Server listening");
    eprintln!("  Plot locator server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
