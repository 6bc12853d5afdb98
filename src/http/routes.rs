use axum::{routing::get, routing::put, Router};

use crate::AppState;
use crate::http::handlers;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn films() -> Router<AppState> {
    Router::new()
        .route("/films", get(handlers::list_films).post(handlers::create_film))
        .route(
            "/films/:id",
            put(handlers::update_film).delete(handlers::delete_film),
        )
}
