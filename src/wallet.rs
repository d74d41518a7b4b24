use axum::{Form, Router, debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}, routing::{get, post}};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, AppState, auth, include_res, users, users::User};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payment_page))
        .route("/topup", post(top_up))
}

/// Send-path check from before the ledger is ever invoked: an empty wallet
/// short-circuits to the payment page and the send handler returns without
/// touching the conversation.
pub fn gate(user: &User) -> Option<Response> {
    if user.wallet <= 0 {
        Some(payment_html(user).into_response())
    } else {
        None
    }
}

fn payment_html(user: &User) -> Html<String> {
    Html(
        include_res!(str, "/pages/payment.html")
            .replace("{fullname}", &user.fullname)
            .replace("{wallet}", &user.wallet.to_string()),
    )
}

#[debug_handler]
async fn payment_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    Ok(payment_html(&user).into_response())
}

#[derive(Deserialize)]
struct TopUpForm {
    credits: i64,
}

/// Credits a confirmed purchase. The gateway exchange happens outside this
/// app; by the time this handler runs the amount is settled.
#[debug_handler]
async fn top_up(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(TopUpForm { credits }): Form<TopUpForm>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    if credits <= 0 {
        return Ok(payment_html(&user).into_response());
    }

    users::credit(&db_pool, &user.id, credits).await?;
    tracing::info!(user = %user.id, credits, "wallet topped up");
    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_wallet(wallet: i64) -> User {
        User {
            id: "u".into(),
            email: None,
            password_hash: None,
            oauth_provider: None,
            oauth_id: None,
            fullname: "Test".into(),
            city: String::new(),
            country: String::new(),
            image: String::new(),
            online: false,
            wallet,
        }
    }

    #[test]
    fn gate_blocks_empty_wallet() {
        assert!(gate(&user_with_wallet(0)).is_some());
        assert!(gate(&user_with_wallet(-1)).is_some());
        assert!(gate(&user_with_wallet(1)).is_none());
    }
}
