//! Chat-related models

use serde::{Deserialize, Serialize};

use super::{Comment, Message};

/// Chat lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Active,
    /// Created while no operator was online; nobody is assigned yet.
    Waiting,
    Closed,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Waiting => "waiting",
            ChatStatus::Closed => "closed",
        }
    }
}

/// Outcome recorded when a chat is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Resolved,
    Unresolved,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Resolved => "resolved",
            Resolution::Unresolved => "unresolved",
        }
    }
}

impl std::str::FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resolved" => Ok(Resolution::Resolved),
            "unresolved" => Ok(Resolution::Unresolved),
            other => Err(format!(
                "Unknown resolution: {}. Use: resolved, unresolved",
                other
            )),
        }
    }
}

/// Support chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    pub status: ChatStatus,
    pub assigned_operator_id: Option<i64>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub closed_at: Option<String>,
    /// Only present on single-chat reads.
    #[serde(default)]
    pub operator_name: Option<String>,
}

impl Chat {
    pub fn is_closed(&self) -> bool {
        self.status == ChatStatus::Closed
    }
}

/// Everything the gateway returns for one chat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatThread {
    pub chat: Option<Chat>,
    pub messages: Vec<Message>,
    pub comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_list_entry_without_optional_fields() {
        let json = r#"{"id": 3, "client_name": "Ivan", "client_email": "ivan@example.com",
                       "status": "waiting", "assigned_operator_id": null,
                       "created_at": "2024-05-01T10:00:00.123456", "resolution": null}"#;
        let chat: Chat = serde_json::from_str(json).unwrap();
        assert_eq!(chat.status, ChatStatus::Waiting);
        assert_eq!(chat.assigned_operator_id, None);
        assert_eq!(chat.resolution, None);
        assert_eq!(chat.closed_at, None);
        assert!(!chat.is_closed());
    }

    #[test]
    fn test_closed_chat_carries_resolution() {
        let json = r#"{"id": 4, "client_name": "Olga", "client_email": "",
                       "status": "closed", "assigned_operator_id": 2,
                       "created_at": null, "resolution": "unresolved",
                       "closed_at": "2024-05-02T08:00:00", "operator_name": "anna"}"#;
        let chat: Chat = serde_json::from_str(json).unwrap();
        assert!(chat.is_closed());
        assert_eq!(chat.resolution, Some(Resolution::Unresolved));
        assert_eq!(chat.operator_name.as_deref(), Some("anna"));
    }

    #[test]
    fn test_resolution_from_str() {
        assert_eq!("Resolved".parse::<Resolution>(), Ok(Resolution::Resolved));
        assert!("maybe".parse::<Resolution>().is_err());
    }
}
