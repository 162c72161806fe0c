use axum::Router;
use axum::routing::get;

use crate::state::AppState;

mod context;
mod handler;
pub mod hub;
pub mod model;

pub use hub::Hub;

pub fn ws<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/ws/chats/{id}", get(handler::subscribe))
        .with_state(s)
}
