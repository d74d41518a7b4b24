use axum::{Router, routing::{get, post}};
use rand::seq::IndexedRandom;
use sqlx::SqlitePool;
use tower_sessions::Session;

mod clients;
mod local;
mod lockin;
mod login;
mod logout;

pub use clients::{ClientProvider, Clients};

use crate::{AppResult, AppState, session::USER_ID, users, users::User};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page))
        .route("/login/{provider}", get(login::login))
        .route("/lockin/{provider}", get(lockin::lockin))
        .route("/register", get(local::register_page).post(local::register))
        .route("/signin", post(local::signin))
        .route("/logout", get(logout::logout))
}

/// Loads the acting user from the session, if any. Handlers pass the result
/// on explicitly; nothing below the routing layer reads the session.
pub async fn current_user(session: &Session, db_pool: &SqlitePool) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };
    Ok(users::fetch(db_pool, &user_id).await?)
}

/// Stand-in display name for providers that return no usable name.
pub(crate) fn generated_alias() -> String {
    let adjectives = [
        "Quiet", "Sunny", "Daring", "Gentle", "Witty", "Warm", "Breezy", "Starry",
        "Velvet", "Amber", "Coral", "Dreamy", "Mellow", "Rosy", "Sly", "Tender",
    ];
    let nouns = [
        "Wink", "Spark", "Ember", "Petal", "Comet", "Lark", "Willow", "Clover",
        "Harbor", "Meadow", "Robin", "Wren", "Juniper", "Sage", "Marigold",
    ];

    format!(
        "{} {}",
        adjectives.choose(&mut rand::rng()).unwrap(),
        nouns.choose(&mut rand::rng()).unwrap()
    )
}
