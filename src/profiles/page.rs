use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, auth, include_res, res, smiles, users};

#[debug_handler]
pub(crate) async fn profile(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to(&format!("/login?return_url=/p/{profile_id}")).into_response());
    };

    let Some(user) = users::fetch(&db_pool, &profile_id.to_string()).await? else {
        return res::sorry("profile");
    };

    let smiled = smiles::exists(&db_pool, &viewer.id, &user.id).await?;

    Ok(Html(
        include_res!(str, "/pages/profiles/profile.html")
            .replace("{id}", &user.id)
            .replace("{fullname}", &user.fullname)
            .replace("{city}", &user.city)
            .replace("{country}", &user.country)
            .replace("{image}", &user.image)
            .replace("{online}", if user.online { "online" } else { "offline" })
            .replace("{smile_action}", if smiled { "/retract" } else { "" })
            .replace("{smile_label}", if smiled { "Take back smile" } else { "Send a smile" }),
    )
    .into_response())
}
