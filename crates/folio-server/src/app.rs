//! Router construction.

use std::path::Path;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::security;

/// Create a router serving the built site in `root`.
///
/// Directory URLs resolve to their `index.html`; unknown paths get
/// `404.html` with a 404 status. With a base path other than `/` the
/// site is mounted under it.
pub fn create_router(root: &Path, base_path: &str) -> Router {
    let files = ServeDir::new(root)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(root.join("404.html")));

    let mount = base_path.trim_end_matches('/');
    let router = if mount.is_empty() {
        Router::new().fallback_service(files)
    } else {
        Router::new().nest_service(mount, files)
    };

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(security::csp_layer())
            .layer(security::content_type_options_layer())
            .layer(security::frame_options_layer()),
    )
}
