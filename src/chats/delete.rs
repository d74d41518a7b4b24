use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, auth, ledger, res};

#[debug_handler]
pub(crate) async fn delete(
    Path(counterpart_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let Some(conv) = ledger::find(&db_pool, &viewer.id, &counterpart_id.to_string()).await? else {
        return res::sorry("chat");
    };
    ledger::delete_conversation(&db_pool, &conv.id).await?;

    Ok(Redirect::to("/c").into_response())
}
