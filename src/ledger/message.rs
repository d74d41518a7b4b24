use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

use super::{Conversation, LedgerError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub from_party: String,
    pub to_party: String,
    pub body: String,
    pub from_unread: bool,
    pub to_unread: bool,
    pub written_at: i64,
    pub nonce: Option<String>,
}

/// Appends a message and debits one credit from the writer's wallet in a
/// single transaction. Either both happen or neither does.
///
/// `from_party` may sit in either slot of the conversation; the counterpart
/// is whoever holds the other slot. A party outside the conversation gets
/// `NotFound` rather than a hint that the record exists. Passing the same
/// `nonce` again returns the already-appended message without a second
/// append or debit.
pub async fn send_message(
    pool: &SqlitePool,
    conversation_id: &str,
    from_party: &str,
    body: &str,
    nonce: Option<&str>,
) -> Result<Message, LedgerError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(LedgerError::Validation("message body is empty"));
    }

    let mut tx = pool.begin().await?;

    let conv: Option<Conversation> = sqlx::query_as("SELECT * FROM conversations WHERE id=?")
        .bind(conversation_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(conv) = conv else {
        return Err(LedgerError::NotFound);
    };
    let Some(to_party) = conv.counterpart(from_party) else {
        return Err(LedgerError::NotFound);
    };
    let to_party = to_party.to_owned();

    if let Some(nonce) = nonce {
        let replayed: Option<Message> = sqlx::query_as(
            "SELECT * FROM messages WHERE conversation_id=? AND from_party=? AND nonce=?",
        )
        .bind(conversation_id)
        .bind(from_party)
        .bind(nonce)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(message) = replayed {
            return Ok(message);
        }
    }

    let message = Message {
        id: Uuid::now_v7().to_string(),
        conversation_id: conversation_id.to_owned(),
        from_party: from_party.to_owned(),
        to_party,
        body: body.to_owned(),
        from_unread: false,
        to_unread: true,
        written_at: db::now(),
        nonce: nonce.map(str::to_owned),
    };
    sqlx::query(
        "INSERT INTO messages (id,conversation_id,from_party,to_party,body,from_unread,to_unread,written_at,nonce) \
         VALUES (?,?,?,?,?,?,?,?,?)",
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.from_party)
    .bind(&message.to_party)
    .bind(&message.body)
    .bind(message.from_unread)
    .bind(message.to_unread)
    .bind(message.written_at)
    .bind(&message.nonce)
    .execute(&mut *tx)
    .await?;

    // writer's side read, counterpart's side unread; the version token
    // serializes racing sends on one conversation
    let a_unread = conv.party_a != from_party;
    let b_unread = conv.party_b != from_party;
    let swapped = sqlx::query(
        "UPDATE conversations SET a_unread=?, b_unread=?, last_activity=?, version=version+1 \
         WHERE id=? AND version=?",
    )
    .bind(a_unread)
    .bind(b_unread)
    .bind(message.written_at)
    .bind(conversation_id)
    .bind(conv.version)
    .execute(&mut *tx)
    .await?;
    if swapped.rows_affected() == 0 {
        return Err(LedgerError::Conflict);
    }

    let debited = sqlx::query("UPDATE users SET wallet = wallet - 1 WHERE id=? AND wallet > 0")
        .bind(from_party)
        .execute(&mut *tx)
        .await?;
    if debited.rows_affected() == 0 {
        return Err(LedgerError::InsufficientFunds);
    }

    tx.commit().await?;
    tracing::debug!(conversation = %conversation_id, message = %message.id, "message appended");
    Ok(message)
}

/// One page of the log in chronological order, newest page first. `before`
/// is the id of the oldest message already on screen. Pages walk the table's
/// rowid, which is append order regardless of timestamp granularity.
pub async fn messages(
    pool: &SqlitePool,
    conversation_id: &str,
    limit: i64,
    before: Option<&str>,
) -> Result<Vec<Message>, LedgerError> {
    let mut page: Vec<Message> = match before {
        Some(before) => {
            sqlx::query_as(
                "SELECT * FROM messages WHERE conversation_id=? \
                 AND rowid < (SELECT rowid FROM messages WHERE id=?) \
                 ORDER BY rowid DESC LIMIT ?",
            )
            .bind(conversation_id)
            .bind(before)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT * FROM messages WHERE conversation_id=? ORDER BY rowid DESC LIMIT ?",
            )
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };
    page.reverse();
    Ok(page)
}
