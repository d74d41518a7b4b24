use axum::{Form, debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, include_res, session::USER_ID, users};

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    email: String,
    password: String,
    fullname: String,
}

#[derive(Deserialize)]
pub(crate) struct SigninForm {
    email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn register_page() -> impl IntoResponse {
    Html(include_res!(str, "/pages/register.html").replace("{error}", ""))
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(RegisterForm { email, password, fullname }): Form<RegisterForm>,
) -> AppResult<Response> {
    let email = email.trim().to_lowercase();
    let fullname = fullname.trim();
    if email.is_empty() || password.len() < 8 || fullname.is_empty() {
        return Ok(register_error("fill every field, password of 8 characters or more"));
    }

    if users::fetch_by_email(&db_pool, &email).await?.is_some() {
        return Ok(register_error("that email is already registered"));
    }

    let user = users::create_local(&db_pool, &email, &password, fullname).await?;
    users::set_online(&db_pool, &user.id, true).await?;
    session.insert(USER_ID, user.id.clone()).await?;

    Ok(Redirect::to("/").into_response())
}

#[debug_handler]
pub(crate) async fn signin(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(SigninForm { email, password }): Form<SigninForm>,
) -> AppResult<Response> {
    let email = email.trim().to_lowercase();
    let Some(user) = users::verify_local(&db_pool, &email, &password).await? else {
        return Ok(Html(
            include_res!(str, "/pages/login.html")
                .replace("{error}", "wrong email or password"),
        )
        .into_response());
    };

    users::set_online(&db_pool, &user.id, true).await?;
    session.insert(USER_ID, user.id.clone()).await?;

    tracing::info!(user = %user.id, "signed in with local credentials");
    Ok(Redirect::to("/").into_response())
}

fn register_error(error: &str) -> Response {
    Html(include_res!(str, "/pages/register.html").replace("{error}", error)).into_response()
}
