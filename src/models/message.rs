//! Message and staff comment models

use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Client,
    Operator,
}

/// Author of an outgoing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    /// Anonymous customer
    Client,
    /// Signed-in staff member (user id)
    Staff(i64),
}

impl Author {
    pub fn sender_type(&self) -> SenderType {
        match self {
            Author::Client => SenderType::Client,
            Author::Staff(_) => SenderType::Operator,
        }
    }

    pub fn sender_id(&self) -> Option<i64> {
        match self {
            Author::Client => None,
            Author::Staff(id) => Some(*id),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender_type: SenderType,
    /// Null for client senders.
    pub sender_id: Option<i64>,
    pub message: String,
    pub created_at: Option<String>,
}

/// Internal staff note attached to a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub created_at: Option<String>,
    /// Author name; null when the author account is gone.
    pub username: Option<String>,
}

/// Format a gateway timestamp for display as `dd.mm HH:MM`.
///
/// The gateway emits naive ISO-8601 (`2024-05-01T10:00:00.123456`); RFC 3339
/// is accepted too. Unparseable input is shown as-is.
pub fn display_time(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d.%m %H:%M").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%d.%m %H:%M").to_string();
    }
    raw.to_string()
}
