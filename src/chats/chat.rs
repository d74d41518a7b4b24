use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, auth, include_res, ledger, res, users};

const PAGE_SIZE: i64 = 50;

#[debug_handler]
pub(crate) async fn chat(
    Path(counterpart_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to(&format!("/login?return_url=/c/{counterpart_id}")).into_response());
    };

    let Some(counterpart) = users::fetch(&db_pool, &counterpart_id.to_string()).await? else {
        return res::sorry("chat");
    };

    let conv = match ledger::open_or_route(&db_pool, &viewer.id, &counterpart.id).await {
        Ok(conv) => conv,
        Err(ledger::LedgerError::Validation(_)) => return res::sorry("chat"),
        Err(e) => return Err(e)?,
    };
    let log = ledger::messages(&db_pool, &conv.id, PAGE_SIZE, None).await?;

    let mut messages = String::new();
    for message in &log {
        let mut body_html = String::new();
        pulldown_cmark::html::push_html(&mut body_html, pulldown_cmark::Parser::new(&message.body));

        messages += &include_res!(str, "/pages/chats/message.html")
            .replace("{side}", if message.from_party == viewer.id { "mine" } else { "theirs" })
            .replace("{fullname}", if message.from_party == viewer.id {
                &viewer.fullname
            } else {
                &counterpart.fullname
            })
            .replace("{ago}", &res::ago(message.written_at))
            .replace("{body}", &body_html);
    }

    // a fresh nonce per rendered form makes a double-submit append only once
    Ok(Html(
        include_res!(str, "/pages/chats/chat.html")
            .replace("{counterpart_id}", &counterpart.id)
            .replace("{fullname}", &counterpart.fullname)
            .replace("{messages}", &messages)
            .replace("{nonce}", &Uuid::now_v7().to_string()),
    )
    .into_response())
}
