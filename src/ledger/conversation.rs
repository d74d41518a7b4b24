use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;

use super::LedgerError;

/// One record per unordered pair of parties. The pair is stored in canonical
/// order (`party_a < party_b`), so neither slot says anything about who made
/// first contact.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub id: String,
    pub party_a: String,
    pub party_b: String,
    pub a_unread: bool,
    pub b_unread: bool,
    pub last_activity: i64,
    pub version: i64,
}

impl Conversation {
    pub fn counterpart(&self, party: &str) -> Option<&str> {
        if party == self.party_a {
            Some(&self.party_b)
        } else if party == self.party_b {
            Some(&self.party_a)
        } else {
            None
        }
    }

    pub fn unread_for(&self, party: &str) -> bool {
        if party == self.party_a {
            self.a_unread
        } else if party == self.party_b {
            self.b_unread
        } else {
            false
        }
    }
}

pub fn canonical_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if x <= y { (x, y) } else { (y, x) }
}

/// Routes the viewer to the single conversation with `counterpart`, creating
/// it on first contact. Opening an existing record marks the viewer's side
/// read and the counterpart's side unread; a fresh record starts with the
/// viewer's own side unread, matching first-contact behavior.
pub async fn open_or_route(
    pool: &SqlitePool,
    viewer: &str,
    counterpart: &str,
) -> Result<Conversation, LedgerError> {
    if viewer == counterpart {
        return Err(LedgerError::Validation("cannot start a conversation with yourself"));
    }

    let (party_a, party_b) = canonical_pair(viewer, counterpart);
    if let Some(conv) = mark_opened(pool, party_a, party_b, viewer).await? {
        return Ok(conv);
    }

    let conv = Conversation {
        id: Uuid::now_v7().to_string(),
        party_a: party_a.to_owned(),
        party_b: party_b.to_owned(),
        a_unread: viewer == party_a,
        b_unread: viewer == party_b,
        last_activity: db::now(),
        version: 0,
    };
    let inserted = sqlx::query(
        "INSERT INTO conversations (id,party_a,party_b,a_unread,b_unread,last_activity,version) \
         VALUES (?,?,?,?,?,?,0) ON CONFLICT (party_a,party_b) DO NOTHING",
    )
    .bind(&conv.id)
    .bind(&conv.party_a)
    .bind(&conv.party_b)
    .bind(conv.a_unread)
    .bind(conv.b_unread)
    .bind(conv.last_activity)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        // lost a first-contact race; the pair's record exists now
        return mark_opened(pool, party_a, party_b, viewer)
            .await?
            .ok_or(LedgerError::Conflict);
    }

    tracing::debug!(conversation = %conv.id, "created conversation on first contact");
    Ok(conv)
}

async fn mark_opened(
    pool: &SqlitePool,
    party_a: &str,
    party_b: &str,
    viewer: &str,
) -> Result<Option<Conversation>, LedgerError> {
    let existing: Option<Conversation> =
        sqlx::query_as("SELECT * FROM conversations WHERE party_a=? AND party_b=?")
            .bind(party_a)
            .bind(party_b)
            .fetch_optional(pool)
            .await?;
    let Some(conv) = existing else {
        return Ok(None);
    };

    let a_unread = conv.party_a != viewer;
    let b_unread = conv.party_b != viewer;
    let last_activity = db::now();
    sqlx::query("UPDATE conversations SET a_unread=?, b_unread=?, last_activity=? WHERE id=?")
        .bind(a_unread)
        .bind(b_unread)
        .bind(last_activity)
        .bind(&conv.id)
        .execute(pool)
        .await?;

    Ok(Some(Conversation { a_unread, b_unread, last_activity, ..conv }))
}

/// Point lookup by pair with no flag side effects.
pub async fn find(
    pool: &SqlitePool,
    x: &str,
    y: &str,
) -> Result<Option<Conversation>, LedgerError> {
    let (party_a, party_b) = canonical_pair(x, y);
    Ok(
        sqlx::query_as("SELECT * FROM conversations WHERE party_a=? AND party_b=?")
            .bind(party_a)
            .bind(party_b)
            .fetch_optional(pool)
            .await?,
    )
}

/// Removes the conversation and its whole log. There is no soft delete and
/// no per-message deletion.
pub async fn delete_conversation(
    pool: &SqlitePool,
    conversation_id: &str,
) -> Result<(), LedgerError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM conversations WHERE id=?")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(LedgerError::NotFound);
    }
    sqlx::query("DELETE FROM messages WHERE conversation_id=?")
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(conversation = %conversation_id, "conversation deleted");
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct UnreadSummary {
    pub has_unread: bool,
}

/// Whether any conversation has unseen activity on whichever side `party`
/// occupies. Drives the inbox badge.
pub async fn unread_summary(
    pool: &SqlitePool,
    party: &str,
) -> Result<UnreadSummary, LedgerError> {
    let hit: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM conversations WHERE (party_a=? AND a_unread) OR (party_b=? AND b_unread) LIMIT 1",
    )
    .bind(party)
    .bind(party)
    .fetch_optional(pool)
    .await?;
    Ok(UnreadSummary { has_unread: hit.is_some() })
}

pub async fn conversations_for(
    pool: &SqlitePool,
    party: &str,
) -> Result<Vec<Conversation>, LedgerError> {
    Ok(
        sqlx::query_as(
            "SELECT * FROM conversations WHERE party_a=? OR party_b=? ORDER BY last_activity DESC",
        )
        .bind(party)
        .bind(party)
        .fetch_all(pool)
        .await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_insensitive() {
        assert_eq!(canonical_pair("a", "b"), ("a", "b"));
        assert_eq!(canonical_pair("b", "a"), ("a", "b"));
    }

    #[test]
    fn counterpart_resolves_either_slot() {
        let conv = Conversation {
            id: "c".into(),
            party_a: "a".into(),
            party_b: "b".into(),
            a_unread: false,
            b_unread: false,
            last_activity: 0,
            version: 0,
        };
        assert_eq!(conv.counterpart("a"), Some("b"));
        assert_eq!(conv.counterpart("b"), Some("a"));
        assert_eq!(conv.counterpart("z"), None);
    }
}
