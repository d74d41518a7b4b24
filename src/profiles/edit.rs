use axum::{Form, debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, include_res, users};

#[derive(Deserialize)]
pub(crate) struct EditForm {
    fullname: String,
    city: String,
    country: String,
    image: String,
}

#[debug_handler]
pub(crate) async fn edit_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login?return_url=/p/me/edit").into_response());
    };

    Ok(Html(
        include_res!(str, "/pages/profiles/edit.html")
            .replace("{fullname}", &user.fullname)
            .replace("{city}", &user.city)
            .replace("{country}", &user.country)
            .replace("{image}", &user.image),
    )
    .into_response())
}

#[debug_handler]
pub(crate) async fn edit(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(EditForm { fullname, city, country, image }): Form<EditForm>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let fullname = fullname.trim();
    if fullname.is_empty() {
        return Ok(Redirect::to("/p/me/edit").into_response());
    }

    // the image field carries an object-store key, uploads happen elsewhere
    users::update_profile(&db_pool, &user.id, fullname, city.trim(), country.trim(), image.trim())
        .await?;

    Ok(Redirect::to(&format!("/p/{}", user.id)).into_response())
}
