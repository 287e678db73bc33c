//! CORS layer for the admin API
//!
//! The surface is an origin whitelist over the admin routes; with no
//! configured origins only local dashboards may call it.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::debug;

const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Build the CORS layer from the configured origin whitelist.
///
/// Origins that fail to parse as header values are skipped. An empty
/// whitelist falls back to localhost.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = if allowed_origins.is_empty() {
        debug!("CORS origins not configured, restricting to localhost");
        LOCAL_ORIGINS.iter().filter_map(|o| o.parse().ok()).collect()
    } else {
        debug!(?allowed_origins, "CORS origins configured");
        allowed_origins.iter().filter_map(|o| o.parse().ok()).collect()
    };

    // The admin API is unauthenticated within the deployment, so no
    // credentialed requests and no Authorization header.
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT])
}
