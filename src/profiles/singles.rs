use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, include_res, users};

#[debug_handler]
pub async fn singles(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login?return_url=/singles").into_response());
    };

    let mut items = String::new();
    for user in users::singles(&db_pool, &viewer.id).await? {
        items += &include_res!(str, "/pages/profiles/single_item.html")
            .replace("{id}", &user.id)
            .replace("{fullname}", &user.fullname)
            .replace("{city}", &user.city)
            .replace("{country}", &user.country)
            .replace("{online}", if user.online { "online" } else { "offline" });
    }

    Ok(Html(
        include_res!(str, "/pages/profiles/singles.html").replace("{singles}", &items),
    )
    .into_response())
}
