use quietwinks::{db, ledger, ledger::LedgerError, users, wallet};
use sqlx::SqlitePool;

async fn pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init(&pool).await.unwrap();
    pool
}

async fn add_user(pool: &SqlitePool, id: &str, wallet: i64) {
    sqlx::query("INSERT INTO users (id,fullname,wallet) VALUES (?,?,?)")
        .bind(id)
        .bind(id)
        .bind(wallet)
        .execute(pool)
        .await
        .unwrap();
}

async fn wallet_of(pool: &SqlitePool, id: &str) -> i64 {
    users::fetch(pool, id).await.unwrap().unwrap().wallet
}

async fn log_of(pool: &SqlitePool, conversation_id: &str) -> Vec<ledger::Message> {
    ledger::messages(pool, conversation_id, 100, None).await.unwrap()
}

#[tokio::test]
async fn open_or_route_is_pair_symmetric() {
    let pool = pool().await;
    add_user(&pool, "alice", 5).await;
    add_user(&pool, "bob", 5).await;

    let ab = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    let ba = ledger::open_or_route(&pool, "bob", "alice").await.unwrap();
    assert_eq!(ab.id, ba.id);

    // still the only record for the pair
    let found = ledger::find(&pool, "alice", "bob").await.unwrap().unwrap();
    assert_eq!(found.id, ab.id);
}

#[tokio::test]
async fn alternating_sends_keep_length_and_order() {
    let pool = pool().await;
    add_user(&pool, "alice", 10).await;
    add_user(&pool, "bob", 10).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    let bodies = ["one", "two", "three", "four", "five", "six"];
    for (i, body) in bodies.iter().enumerate() {
        let from = if i % 2 == 0 { "alice" } else { "bob" };
        ledger::send_message(&pool, &conv.id, from, body, None)
            .await
            .unwrap();
    }

    let log = log_of(&pool, &conv.id).await;
    assert_eq!(log.len(), bodies.len());
    for (message, body) in log.iter().zip(bodies) {
        assert_eq!(message.body, body);
    }
}

#[tokio::test]
async fn blank_body_is_rejected_and_appends_nothing() {
    let pool = pool().await;
    add_user(&pool, "alice", 5).await;
    add_user(&pool, "bob", 5).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    let err = ledger::send_message(&pool, &conv.id, "alice", "   \t  ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    assert!(log_of(&pool, &conv.id).await.is_empty());
    assert_eq!(wallet_of(&pool, "alice").await, 5);
}

#[tokio::test]
async fn empty_wallet_short_circuits_at_the_gate() {
    let pool = pool().await;
    add_user(&pool, "alice", 0).await;
    add_user(&pool, "bob", 5).await;

    // the send handler consults the gate first and returns the payment page
    // without ever calling into the ledger
    let broke = users::fetch(&pool, "alice").await.unwrap().unwrap();
    assert!(wallet::gate(&broke).is_some());

    let funded = users::fetch(&pool, "bob").await.unwrap().unwrap();
    assert!(wallet::gate(&funded).is_none());
}

#[tokio::test]
async fn empty_wallet_cannot_slip_past_the_ledger_either() {
    let pool = pool().await;
    add_user(&pool, "alice", 0).await;
    add_user(&pool, "bob", 5).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    let err = ledger::send_message(&pool, &conv.id, "alice", "hi", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds));

    // the append rolled back with the failed debit
    assert!(log_of(&pool, &conv.id).await.is_empty());
    assert_eq!(wallet_of(&pool, "alice").await, 0);
}

#[tokio::test]
async fn unread_lands_on_the_reader_whatever_the_stored_order() {
    let pool = pool().await;
    // "zoe" sorts after "abe", so the sender sits in either slot across the
    // two directions
    add_user(&pool, "abe", 10).await;
    add_user(&pool, "zoe", 10).await;

    let conv = ledger::open_or_route(&pool, "zoe", "abe").await.unwrap();

    let sent = ledger::send_message(&pool, &conv.id, "zoe", "hello", None)
        .await
        .unwrap();
    assert!(!sent.from_unread);
    assert!(sent.to_unread);
    let conv = ledger::find(&pool, "zoe", "abe").await.unwrap().unwrap();
    assert!(conv.unread_for("abe"));
    assert!(!conv.unread_for("zoe"));

    ledger::send_message(&pool, &conv.id, "abe", "hey", None)
        .await
        .unwrap();
    let conv = ledger::find(&pool, "zoe", "abe").await.unwrap().unwrap();
    assert!(conv.unread_for("zoe"));
    assert!(!conv.unread_for("abe"));
}

#[tokio::test]
async fn opening_marks_the_viewer_side_read() {
    let pool = pool().await;
    add_user(&pool, "alice", 10).await;
    add_user(&pool, "bob", 10).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    ledger::send_message(&pool, &conv.id, "bob", "hi", None)
        .await
        .unwrap();
    assert!(ledger::unread_summary(&pool, "alice").await.unwrap().has_unread);

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    assert!(!conv.unread_for("alice"));
    assert!(!ledger::unread_summary(&pool, "alice").await.unwrap().has_unread);
    assert!(ledger::unread_summary(&pool, "bob").await.unwrap().has_unread);
}

#[tokio::test]
async fn delete_then_open_starts_from_scratch() {
    let pool = pool().await;
    add_user(&pool, "alice", 10).await;
    add_user(&pool, "bob", 10).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    ledger::send_message(&pool, &conv.id, "alice", "remember this", None)
        .await
        .unwrap();

    ledger::delete_conversation(&pool, &conv.id).await.unwrap();
    assert!(ledger::find(&pool, "alice", "bob").await.unwrap().is_none());

    let fresh = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    assert_ne!(fresh.id, conv.id);
    assert!(log_of(&pool, &fresh.id).await.is_empty());
    // no resurrection through the old id either
    assert!(log_of(&pool, &conv.id).await.is_empty());
}

#[tokio::test]
async fn first_contact_scenario() {
    let pool = pool().await;
    add_user(&pool, "alice", 4).await;
    add_user(&pool, "bob", 4).await;

    // A reaches out first: her own side starts unread
    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    assert!(conv.unread_for("alice"));
    assert!(!conv.unread_for("bob"));

    // B answers
    let message = ledger::send_message(&pool, &conv.id, "bob", "hello", None)
        .await
        .unwrap();
    assert_eq!(message.from_party, "bob");
    assert_eq!(message.to_party, "alice");

    let log = log_of(&pool, &conv.id).await;
    assert_eq!(log.len(), 1);

    let conv = ledger::find(&pool, "alice", "bob").await.unwrap().unwrap();
    assert!(conv.unread_for("alice"));
    assert!(!conv.unread_for("bob"));
    assert_eq!(wallet_of(&pool, "bob").await, 3);
    assert_eq!(wallet_of(&pool, "alice").await, 4);
}

#[tokio::test]
async fn nonce_replay_appends_and_debits_once() {
    let pool = pool().await;
    add_user(&pool, "alice", 5).await;
    add_user(&pool, "bob", 5).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    let first = ledger::send_message(&pool, &conv.id, "alice", "hi", Some("n-1"))
        .await
        .unwrap();
    let replay = ledger::send_message(&pool, &conv.id, "alice", "hi", Some("n-1"))
        .await
        .unwrap();

    assert_eq!(first.id, replay.id);
    assert_eq!(log_of(&pool, &conv.id).await.len(), 1);
    assert_eq!(wallet_of(&pool, "alice").await, 4);

    // a different nonce is a new message
    ledger::send_message(&pool, &conv.id, "alice", "hi again", Some("n-2"))
        .await
        .unwrap();
    assert_eq!(log_of(&pool, &conv.id).await.len(), 2);
    assert_eq!(wallet_of(&pool, "alice").await, 3);
}

#[tokio::test]
async fn every_send_moves_the_version_token() {
    let pool = pool().await;
    add_user(&pool, "alice", 5).await;
    add_user(&pool, "bob", 5).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    assert_eq!(conv.version, 0);

    ledger::send_message(&pool, &conv.id, "alice", "one", None)
        .await
        .unwrap();
    ledger::send_message(&pool, &conv.id, "bob", "two", None)
        .await
        .unwrap();

    let conv = ledger::find(&pool, "alice", "bob").await.unwrap().unwrap();
    assert_eq!(conv.version, 2);
}

#[tokio::test]
async fn strangers_and_ghosts_get_not_found() {
    let pool = pool().await;
    add_user(&pool, "alice", 5).await;
    add_user(&pool, "bob", 5).await;
    add_user(&pool, "mallory", 5).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();

    let err = ledger::send_message(&pool, &conv.id, "mallory", "let me in", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound));

    let err = ledger::send_message(&pool, "no-such-conversation", "alice", "hi", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound));

    let err = ledger::delete_conversation(&pool, "no-such-conversation")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound));
}

#[tokio::test]
async fn a_party_cannot_route_to_itself() {
    let pool = pool().await;
    add_user(&pool, "alice", 5).await;

    let err = ledger::open_or_route(&pool, "alice", "alice").await.unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn log_pages_walk_backwards_in_chronological_chunks() {
    let pool = pool().await;
    add_user(&pool, "alice", 10).await;
    add_user(&pool, "bob", 10).await;

    let conv = ledger::open_or_route(&pool, "alice", "bob").await.unwrap();
    for body in ["1", "2", "3", "4", "5"] {
        ledger::send_message(&pool, &conv.id, "alice", body, None)
            .await
            .unwrap();
    }

    let newest = ledger::messages(&pool, &conv.id, 2, None).await.unwrap();
    let bodies: Vec<&str> = newest.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["4", "5"]);

    let older = ledger::messages(&pool, &conv.id, 2, Some(newest[0].id.as_str()))
        .await
        .unwrap();
    let bodies: Vec<&str> = older.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["2", "3"]);
}
