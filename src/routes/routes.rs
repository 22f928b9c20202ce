//! Defines routes for the gallery API, media serving, and the admin surface.
//!
//! ## Structure
//! - **Public API**
//!   - `GET    /api/images` — list images, newest first
//!   - `POST   /api/images` — create an image record
//!   - `GET    /api/images/{id}` — one image with comments
//!   - `PUT    /api/images/{id}` — update mutable fields
//!   - `DELETE /api/images/{id}` — delete image and its comments
//!   - `POST   /api/comments` — create a comment
//!   - `DELETE /api/comments` — delete a comment (id in body)
//!
//! - **Media**
//!   - `GET    /media/{key}` — stream a stored payload
//!
//! - **Admin** (behind the session gate; no session redirects to `/login`)
//!   - `GET    /admin` — dashboard summary
//!   - `POST   /admin/upload` — multipart upload, returns the public URL

use crate::{
    AppState,
    auth::session_gate,
    handlers::{
        admin_handlers::dashboard,
        comment_handlers::{create_comment, delete_comment},
        health_handlers::{healthz, readyz},
        image_handlers::{create_image, delete_image, get_image, list_images, update_image},
        media_handlers::{serve_media, upload_image},
    },
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Build and return the router for the whole service.
///
/// The router carries shared state (`AppState`) to all handlers; the admin
/// subtree additionally runs the session gate before any handler.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // public API
        .route("/api/images", get(list_images).post(create_image))
        .route(
            "/api/images/{id}",
            get(get_image).put(update_image).delete(delete_image),
        )
        .route("/api/comments", post(create_comment).delete(delete_comment))
        // stored media
        .route("/media/{key}", get(serve_media))
        // admin surface, gated on session presence
        .merge(admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/upload", post(upload_image))
        .route_layer(middleware::from_fn(session_gate))
}
