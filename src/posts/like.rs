use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, auth, res};

use super::{fetch_post, toggle_like};

#[debug_handler]
pub(crate) async fn like(
    Path(post_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let post_id = post_id.to_string();
    if fetch_post(&db_pool, &post_id).await?.is_none() {
        return res::sorry("post");
    }

    toggle_like(&db_pool, &post_id, &viewer.id).await?;
    Ok(Redirect::to("/f").into_response())
}
