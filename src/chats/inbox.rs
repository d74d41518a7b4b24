use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, include_res, ledger, res, smiles, users};

#[debug_handler]
pub(crate) async fn inbox(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login?return_url=/c").into_response());
    };

    let mut items = String::new();
    for conv in ledger::conversations_for(&db_pool, &viewer.id).await? {
        let Some(counterpart_id) = conv.counterpart(&viewer.id) else {
            continue;
        };
        let fullname = match users::fetch(&db_pool, counterpart_id).await? {
            Some(user) => user.fullname,
            None => "Former member".to_owned(),
        };

        items += &include_res!(str, "/pages/chats/inbox_item.html")
            .replace("{counterpart_id}", counterpart_id)
            .replace("{fullname}", &fullname)
            .replace("{unread}", if conv.unread_for(&viewer.id) { "unread" } else { "" })
            .replace("{ago}", &res::ago(conv.last_activity));
    }

    let mut smile_items = String::new();
    for smile in smiles::received(&db_pool, &viewer.id).await? {
        let fullname = match users::fetch(&db_pool, &smile.sender).await? {
            Some(user) => user.fullname,
            None => continue,
        };
        smile_items += &include_res!(str, "/pages/chats/smile_item.html")
            .replace("{sender_id}", &smile.sender)
            .replace("{fullname}", &fullname)
            .replace("{ago}", &res::ago(smile.sent_at));
    }

    Ok(Html(
        include_res!(str, "/pages/chats/inbox.html")
            .replace("{conversations}", &items)
            .replace("{smiles}", &smile_items),
    )
    .into_response())
}
