use axum::{Router, debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, routing::post};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppResult, AppState, auth, db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{uuid}", post(send_smile))
        .route("/{uuid}/retract", post(retract_smile))
        .route("/{uuid}/clear", post(clear_smile))
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Smile {
    pub sender: String,
    pub receiver: String,
    pub sent_at: i64,
}

/// At most one live smile per ordered (sender, receiver) pair; resending is
/// a no-op until the first one is cleared.
pub async fn send(pool: &SqlitePool, sender: &str, receiver: &str) -> Result<(), sqlx::Error> {
    if sender == receiver {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO smiles (sender,receiver,sent_at) VALUES (?,?,?) \
         ON CONFLICT (sender,receiver) DO NOTHING",
    )
    .bind(sender)
    .bind(receiver)
    .bind(db::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn clear(pool: &SqlitePool, sender: &str, receiver: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM smiles WHERE sender=? AND receiver=?")
        .bind(sender)
        .bind(receiver)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn exists(pool: &SqlitePool, sender: &str, receiver: &str) -> Result<bool, sqlx::Error> {
    let hit: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM smiles WHERE sender=? AND receiver=?")
            .bind(sender)
            .bind(receiver)
            .fetch_optional(pool)
            .await?;
    Ok(hit.is_some())
}

pub async fn received(pool: &SqlitePool, receiver: &str) -> Result<Vec<Smile>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM smiles WHERE receiver=? ORDER BY sent_at DESC")
        .bind(receiver)
        .fetch_all(pool)
        .await
}

pub async fn count_received(pool: &SqlitePool, receiver: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM smiles WHERE receiver=?")
        .bind(receiver)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[debug_handler]
async fn send_smile(
    Path(receiver_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    send(&db_pool, &viewer.id, &receiver_id.to_string()).await?;
    Ok(Redirect::to(&format!("/p/{receiver_id}")).into_response())
}

#[debug_handler]
async fn retract_smile(
    Path(receiver_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    clear(&db_pool, &viewer.id, &receiver_id.to_string()).await?;
    Ok(Redirect::to(&format!("/p/{receiver_id}")).into_response())
}

#[debug_handler]
async fn clear_smile(
    Path(sender_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    clear(&db_pool, &sender_id.to_string(), &viewer.id).await?;
    Ok(Redirect::to("/c").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn smile_is_idempotent_per_ordered_pair() {
        let pool = test_pool().await;
        send(&pool, "a", "b").await.unwrap();
        send(&pool, "a", "b").await.unwrap();
        assert_eq!(count_received(&pool, "b").await.unwrap(), 1);

        // the reverse direction is its own smile
        send(&pool, "b", "a").await.unwrap();
        assert_eq!(count_received(&pool, "a").await.unwrap(), 1);
        assert_eq!(count_received(&pool, "b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_removes_only_one_direction() {
        let pool = test_pool().await;
        send(&pool, "a", "b").await.unwrap();
        send(&pool, "b", "a").await.unwrap();

        clear(&pool, "a", "b").await.unwrap();
        assert!(!exists(&pool, "a", "b").await.unwrap());
        assert!(exists(&pool, "b", "a").await.unwrap());
    }

    #[tokio::test]
    async fn self_smile_is_ignored() {
        let pool = test_pool().await;
        send(&pool, "a", "a").await.unwrap();
        assert_eq!(count_received(&pool, "a").await.unwrap(), 0);
    }
}
