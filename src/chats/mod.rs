mod chat;
mod delete;
mod inbox;
mod send;

use axum::{Router, routing::{get, post}};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(inbox::inbox))
        .route("/{uuid}", get(chat::chat))
        .route("/{uuid}/send", post(send::send))
        .route("/{uuid}/delete", post(delete::delete))
}
