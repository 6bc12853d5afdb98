use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::CallerId;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    let upload_max_bytes = state.upload_max_bytes;

    Router::new()
        .merge(routes::health())
        .merge(routes::films())
        .layer(DefaultBodyLimit::max(upload_max_bytes))
        .with_state(state)
}
