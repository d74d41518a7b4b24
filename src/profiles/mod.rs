mod edit;
mod page;
mod singles;

use axum::{Router, routing::get};

pub use singles::singles;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/edit", get(edit::edit_page).post(edit::edit))
        .route("/{uuid}", get(page::profile))
}
