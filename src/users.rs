use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

/// Credits a fresh account starts with before the first top up.
pub const STARTER_CREDITS: i64 = 3;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
    pub fullname: String,
    pub city: String,
    pub country: String,
    pub image: String,
    pub online: bool,
    pub wallet: i64,
}

pub async fn fetch(pool: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id=?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email=?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn create_local(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    fullname: &str,
) -> anyhow::Result<User> {
    let id = Uuid::now_v7().to_string();
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    sqlx::query("INSERT INTO users (id,email,password_hash,fullname,wallet) VALUES (?,?,?,?,?)")
        .bind(&id)
        .bind(email)
        .bind(&hash)
        .bind(fullname)
        .bind(STARTER_CREDITS)
        .execute(pool)
        .await?;

    tracing::info!(user = %id, "registered local account");
    fetch(pool, &id).await?.ok_or(anyhow::anyhow!("user vanished after insert"))
}

pub async fn verify_local(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = fetch_by_email(pool, email).await? else {
        return Ok(None);
    };
    let Some(hash) = &user.password_hash else {
        return Ok(None);
    };
    if bcrypt::verify(password, hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Finds the account a provider identity maps to, creating it on first login.
pub async fn upsert_oauth(
    pool: &SqlitePool,
    provider: &str,
    oauth_id: &str,
    fullname: &str,
) -> Result<User, sqlx::Error> {
    let existing: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE oauth_provider=? AND oauth_id=?")
            .bind(provider)
            .bind(oauth_id)
            .fetch_optional(pool)
            .await?;
    if let Some(user) = existing {
        return Ok(user);
    }

    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO users (id,oauth_provider,oauth_id,fullname,wallet) VALUES (?,?,?,?,?)")
        .bind(&id)
        .bind(provider)
        .bind(oauth_id)
        .bind(fullname)
        .bind(STARTER_CREDITS)
        .execute(pool)
        .await?;

    tracing::info!(user = %id, provider, "created account from oauth identity");
    sqlx::query_as("SELECT * FROM users WHERE id=?")
        .bind(&id)
        .fetch_one(pool)
        .await
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    fullname: &str,
    city: &str,
    country: &str,
    image: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET fullname=?, city=?, country=?, image=? WHERE id=?")
        .bind(fullname)
        .bind(city)
        .bind(country)
        .bind(image)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_online(pool: &SqlitePool, id: &str, online: bool) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET online=? WHERE id=?")
        .bind(online)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn credit(pool: &SqlitePool, id: &str, amount: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET wallet = wallet + ? WHERE id=?")
        .bind(amount)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Everyone except the viewer, online members first.
pub async fn singles(pool: &SqlitePool, viewer: &str) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id != ? ORDER BY online DESC, fullname")
        .bind(viewer)
        .fetch_all(pool)
        .await
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
    async fn local_register_and_login_round_trip() {
        let pool = test_pool().await;
        let user = create_local(&pool, "ada@example.com", "hunter2", "Ada")
            .await
            .unwrap();
        assert_eq!(user.wallet, STARTER_CREDITS);

        let found = verify_local(&pool, "ada@example.com", "hunter2")
            .await
            .unwrap()
            .expect("password should match");
        assert_eq!(found.id, user.id);

        assert!(verify_local(&pool, "ada@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(verify_local(&pool, "nobody@example.com", "hunter2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn oauth_upsert_is_stable_per_identity() {
        let pool = test_pool().await;
        let first = upsert_oauth(&pool, "google.com", "g-123", "Grace")
            .await
            .unwrap();
        let second = upsert_oauth(&pool, "google.com", "g-123", "Grace")
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let other = upsert_oauth(&pool, "facebook.com", "g-123", "Grace")
            .await
            .unwrap();
        assert_ne!(first.id, other.id);
    }
}
