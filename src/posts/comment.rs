use axum::{Form, debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, auth, res};

use super::add_comment;

#[derive(Deserialize)]
pub(crate) struct CommentForm {
    body: String,
}

#[debug_handler]
pub(crate) async fn comment(
    Path(post_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(CommentForm { body }): Form<CommentForm>,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let body = body.trim();
    if body.is_empty() {
        return Ok(Redirect::to("/f").into_response());
    }

    if add_comment(&db_pool, &post_id.to_string(), &viewer.id, body)
        .await?
        .is_none()
    {
        return res::sorry("post");
    }

    Ok(Redirect::to("/f").into_response())
}
