use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, include_res, ledger, smiles};

#[debug_handler]
pub async fn index(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let unread = ledger::unread_summary(&db_pool, &user.id).await?;
    let smile_count = smiles::count_received(&db_pool, &user.id).await?;

    Ok(Html(
        include_res!(str, "/pages/index.html")
            .replace("{fullname}", &user.fullname)
            .replace("{wallet}", &user.wallet.to_string())
            .replace("{inbox_badge}", if unread.has_unread { "●" } else { "" })
            .replace("{smile_count}", &smile_count.to_string()),
    )
    .into_response())
}
