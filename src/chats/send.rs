use axum::{Form, debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, auth, ledger, res, wallet};

#[derive(Deserialize)]
pub(crate) struct SendForm {
    body: String,
    nonce: Option<Uuid>,
}

#[debug_handler]
pub(crate) async fn send(
    Path(counterpart_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(SendForm { body, nonce }): Form<SendForm>,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    // empty wallet never reaches the ledger
    if let Some(payment) = wallet::gate(&viewer) {
        return Ok(payment);
    }

    let conv = match ledger::open_or_route(&db_pool, &viewer.id, &counterpart_id.to_string()).await {
        Ok(conv) => conv,
        Err(ledger::LedgerError::Validation(_)) => return res::sorry("chat"),
        Err(e) => return Err(e)?,
    };

    let nonce = nonce.map(|nonce| nonce.to_string());
    match ledger::send_message(&db_pool, &conv.id, &viewer.id, &body, nonce.as_deref()).await {
        Ok(_) => {}
        Err(ledger::LedgerError::Validation(reason)) => {
            tracing::debug!(%reason, "send rejected");
        }
        Err(ledger::LedgerError::InsufficientFunds) => {
            return Ok(Redirect::to("/wallet").into_response());
        }
        Err(ledger::LedgerError::Conflict) => {
            tracing::warn!(conversation = %conv.id, "concurrent send, not retrying");
        }
        Err(ledger::LedgerError::NotFound) => return res::sorry("chat"),
        Err(e @ ledger::LedgerError::Store(_)) => return Err(e)?,
    }

    Ok(Redirect::to(&format!("/c/{counterpart_id}")).into_response())
}
