use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE,
    password_hash TEXT,
    oauth_provider TEXT,
    oauth_id TEXT,
    fullname TEXT NOT NULL,
    city TEXT NOT NULL DEFAULT '',
    country TEXT NOT NULL DEFAULT '',
    image TEXT NOT NULL DEFAULT '',
    online INTEGER NOT NULL DEFAULT 0,
    wallet INTEGER NOT NULL DEFAULT 0,
    UNIQUE (oauth_provider, oauth_id)
);

CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    party_a TEXT NOT NULL,
    party_b TEXT NOT NULL,
    a_unread INTEGER NOT NULL DEFAULT 0,
    b_unread INTEGER NOT NULL DEFAULT 0,
    last_activity INTEGER NOT NULL,
    version INTEGER NOT NULL DEFAULT 0,
    UNIQUE (party_a, party_b)
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL,
    from_party TEXT NOT NULL,
    to_party TEXT NOT NULL,
    body TEXT NOT NULL,
    from_unread INTEGER NOT NULL DEFAULT 0,
    to_unread INTEGER NOT NULL DEFAULT 1,
    written_at INTEGER NOT NULL,
    nonce TEXT
);
CREATE INDEX IF NOT EXISTS messages_by_conversation ON messages (conversation_id);
CREATE UNIQUE INDEX IF NOT EXISTS messages_send_nonce
    ON messages (conversation_id, from_party, nonce) WHERE nonce IS NOT NULL;

CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'public',
    allow_comments INTEGER NOT NULL DEFAULT 1,
    posted_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    body TEXT NOT NULL,
    written_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS likes (
    post_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    liked_at INTEGER NOT NULL,
    PRIMARY KEY (post_id, user_id)
);

CREATE TABLE IF NOT EXISTS smiles (
    sender TEXT NOT NULL,
    receiver TEXT NOT NULL,
    sent_at INTEGER NOT NULL,
    PRIMARY KEY (sender, receiver)
);
"#;

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(url)
        .await?;
    init(&pool).await?;
    Ok(pool)
}

pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
