mod comment;
mod feed;
mod like;
mod new;

use axum::{Router, routing::{get, post}};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppState, db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::feed))
        .route("/new", get(new::new_post_page).post(new::new_post))
        .route("/{uuid}/like", post(like::like))
        .route("/{uuid}/comment", post(comment::comment))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Public,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Public => "public",
            PostStatus::Private => "private",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub allow_comments: bool,
    pub posted_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub body: String,
    pub written_at: i64,
}

pub async fn create_post(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    body: &str,
    status: PostStatus,
    allow_comments: bool,
) -> Result<String, sqlx::Error> {
    let id = Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO posts (id,user_id,title,body,status,allow_comments,posted_at) VALUES (?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(title)
    .bind(body)
    .bind(status.as_str())
    .bind(allow_comments)
    .bind(db::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn fetch_post(pool: &SqlitePool, id: &str) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM posts WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Public posts plus the viewer's own private ones, newest first.
pub async fn visible_posts(pool: &SqlitePool, viewer: &str) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM posts WHERE status='public' OR user_id=? ORDER BY posted_at DESC LIMIT 50",
    )
    .bind(viewer)
    .fetch_all(pool)
    .await
}

/// One like per user per post; liking again takes the like back.
pub async fn toggle_like(pool: &SqlitePool, post_id: &str, user_id: &str) -> Result<(), sqlx::Error> {
    let removed = sqlx::query("DELETE FROM likes WHERE post_id=? AND user_id=?")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if removed.rows_affected() > 0 {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO likes (post_id,user_id,liked_at) VALUES (?,?,?) \
         ON CONFLICT (post_id,user_id) DO NOTHING",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(db::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn like_count(pool: &SqlitePool, post_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE post_id=?")
        .bind(post_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Appends a comment, or returns None when the author disabled comments.
pub async fn add_comment(
    pool: &SqlitePool,
    post_id: &str,
    user_id: &str,
    body: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    let Some(post) = fetch_post(pool, post_id).await? else {
        return Ok(None);
    };
    if !post.allow_comments {
        return Ok(None);
    }

    let comment = Comment {
        id: Uuid::now_v7().to_string(),
        post_id: post_id.to_owned(),
        user_id: user_id.to_owned(),
        body: body.to_owned(),
        written_at: db::now(),
    };
    sqlx::query("INSERT INTO comments (id,post_id,user_id,body,written_at) VALUES (?,?,?,?,?)")
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.user_id)
        .bind(&comment.body)
        .bind(comment.written_at)
        .execute(pool)
        .await?;
    Ok(Some(comment))
}

pub async fn comments_for(pool: &SqlitePool, post_id: &str) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM comments WHERE post_id=? ORDER BY rowid")
        .bind(post_id)
        .fetch_all(pool)
        .await
}
