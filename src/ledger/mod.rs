//! Two-party conversation ledger.
//!
//! Owns the conversation records and their append-only message log. Handlers
//! resolve the acting user themselves and pass party ids in explicitly; this
//! module never touches sessions, requests, or markup.

mod conversation;
mod error;
mod message;

pub use conversation::{
    Conversation, UnreadSummary, canonical_pair, conversations_for, delete_conversation, find,
    open_or_route, unread_summary,
};
pub use error::LedgerError;
pub use message::{Message, messages, send_message};
