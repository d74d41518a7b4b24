use axum::{Form, debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, include_res};

use super::{PostStatus, create_post};

#[derive(Deserialize)]
pub(crate) struct NewPostForm {
    title: String,
    body: String,
    status: PostStatus,
    #[serde(default)]
    allow_comments: bool,
}

#[debug_handler]
pub(crate) async fn new_post_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if auth::current_user(&session, &db_pool).await?.is_none() {
        return Ok(Redirect::to("/login?return_url=/f/new").into_response());
    }

    Ok(Html(include_res!(str, "/pages/posts/new.html")).into_response())
}

#[debug_handler]
pub(crate) async fn new_post(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(NewPostForm { title, body, status, allow_comments }): Form<NewPostForm>,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let title = title.trim();
    let body = body.trim();
    if title.is_empty() || body.is_empty() {
        return Ok(Redirect::to("/f/new").into_response());
    }

    create_post(&db_pool, &viewer.id, title, body, status, allow_comments).await?;
    Ok(Redirect::to("/f").into_response())
}
