//! Chats resource: chat lists, threads, and the `action` writes

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

use super::client::{typed_list, GatewayClient};
use super::GatewayError;
use crate::config::Config;
use crate::models::{display_time, Author, Chat, ChatThread, Resolution, SenderType};

/// Filter for chat list reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatQuery {
    /// Every chat that is not closed
    Open,
    /// Every chat, closed ones included (`show_archive=true`)
    WithArchive,
    /// Open chats assigned to one operator
    Operator(i64),
}

impl ChatQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            ChatQuery::Open => Vec::new(),
            ChatQuery::WithArchive => vec![("show_archive", "true".to_string())],
            ChatQuery::Operator(id) => vec![("operator_id", id.to_string())],
        }
    }
}

/// POST body; the gateway dispatches on `action`.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ChatAction<'a> {
    CreateChat {
        client_name: &'a str,
        client_email: &'a str,
    },
    SendMessage {
        chat_id: i64,
        message: &'a str,
        sender_type: SenderType,
        sender_id: Option<i64>,
    },
    CloseChat {
        chat_id: i64,
        resolution: Resolution,
    },
    AddComment {
        chat_id: i64,
        comment: &'a str,
        user_id: i64,
    },
}

// ---------------------------------------------------------------------------
// Data-returning functions (used by the sync core through `Gateway`)
// ---------------------------------------------------------------------------

/// Read a chat list. Missing or malformed `chats` yields an empty list.
pub async fn list_chats_data(
    client: &GatewayClient,
    query: ChatQuery,
) -> Result<Vec<Chat>, GatewayError> {
    let payload = client
        .read(&client.endpoints().chats, &query.params())
        .await?;
    Ok(typed_list(&payload, "chats"))
}

/// Read one chat with its messages and comments.
pub async fn read_thread_data(
    client: &GatewayClient,
    chat_id: i64,
) -> Result<ChatThread, GatewayError> {
    let payload = client
        .read(&client.endpoints().chats, &[("chat_id", chat_id.to_string())])
        .await?;

    let chat = payload
        .get("chat")
        .filter(|v| !v.is_null())
        .and_then(|v| match serde_json::from_value::<Chat>(v.clone()) {
            Ok(chat) => Some(chat),
            Err(e) => {
                tracing::warn!("Skipping malformed chat {}: {}", chat_id, e);
                None
            }
        });

    Ok(ChatThread {
        chat,
        messages: typed_list(&payload, "messages"),
        comments: typed_list(&payload, "comments"),
    })
}

/// Open a new chat as a client. Returns the new chat id.
pub async fn create_chat_with_client(
    client: &GatewayClient,
    client_name: &str,
    client_email: &str,
) -> Result<i64, GatewayError> {
    let body = ChatAction::CreateChat {
        client_name,
        client_email,
    };
    let payload = client
        .write(reqwest::Method::POST, &client.endpoints().chats, &body)
        .await?;

    payload
        .get("chat_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| GatewayError::business("create_chat response has no chat_id"))
}

/// Append a message to a chat.
pub async fn send_message_with_client(
    client: &GatewayClient,
    chat_id: i64,
    author: Author,
    message: &str,
) -> Result<(), GatewayError> {
    let body = ChatAction::SendMessage {
        chat_id,
        message,
        sender_type: author.sender_type(),
        sender_id: author.sender_id(),
    };
    client
        .write(reqwest::Method::POST, &client.endpoints().chats, &body)
        .await?;
    Ok(())
}

/// Close a chat with a resolution.
pub async fn close_chat_with_client(
    client: &GatewayClient,
    chat_id: i64,
    resolution: Resolution,
) -> Result<(), GatewayError> {
    let body = ChatAction::CloseChat {
        chat_id,
        resolution,
    };
    client
        .write(reqwest::Method::POST, &client.endpoints().chats, &body)
        .await?;
    Ok(())
}

/// Attach a staff comment to a chat.
pub async fn add_comment_with_client(
    client: &GatewayClient,
    chat_id: i64,
    user_id: i64,
    comment: &str,
) -> Result<(), GatewayError> {
    let body = ChatAction::AddComment {
        chat_id,
        comment,
        user_id,
    };
    client
        .write(reqwest::Method::POST, &client.endpoints().chats, &body)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI commands (print to stdout)
// ---------------------------------------------------------------------------

/// List chats (prints to stdout).
pub async fn list_chats(config: &Config, archive: bool, mine: bool) -> Result<()> {
    let query = if mine {
        let me = config
            .session
            .as_ref()
            .context("--mine needs a session. Run 'support-chat login' first.")?;
        ChatQuery::Operator(me.id)
    } else if archive {
        ChatQuery::WithArchive
    } else {
        ChatQuery::Open
    };

    let client = GatewayClient::from_config(config)?;
    let chats = list_chats_data(&client, query).await?;

    println!("\nChats:");
    println!("{:-<60}", "");

    if chats.is_empty() {
        println!("  (no chats found)");
        return Ok(());
    }

    for chat in &chats {
        println!("#{} {} <{}>", chat.id, chat.client_name, chat.client_email);
        print!("  Status: {}", chat.status.as_str());
        if let Some(resolution) = chat.resolution {
            print!(" ({})", resolution.as_str());
        }
        println!();
        match chat.assigned_operator_id {
            Some(op) => println!("  Operator: {}", op),
            None => println!("  Operator: (unassigned)"),
        }
        println!("  Created: {}", display_time(chat.created_at.as_deref()));
        println!();
    }

    Ok(())
}

/// Print one chat thread. Comments are shown only with a staff session.
pub async fn read_thread(config: &Config, chat_id: i64) -> Result<()> {
    let client = GatewayClient::from_config(config)?;
    let thread = read_thread_data(&client, chat_id).await?;

    if let Some(ref chat) = thread.chat {
        println!(
            "Chat #{} with {} [{}]",
            chat.id,
            chat.client_name,
            chat.status.as_str()
        );
    }

    if thread.messages.is_empty() {
        println!("(no messages)");
    }
    for msg in &thread.messages {
        let who = match msg.sender_type {
            SenderType::Client => "client",
            SenderType::Operator => "operator",
        };
        println!(
            "[{}] {}: {}",
            display_time(msg.created_at.as_deref()),
            who,
            msg.message
        );
    }

    if config.session.is_some() && !thread.comments.is_empty() {
        println!("\nComments:");
        for c in &thread.comments {
            println!(
                "  [{}] {}: {}",
                display_time(c.created_at.as_deref()),
                c.username.as_deref().unwrap_or("?"),
                c.comment
            );
        }
    }

    Ok(())
}

/// Open a chat as a client, optionally with a first message.
pub async fn start_chat(
    config: &Config,
    name: &str,
    email: &str,
    first_message: Option<&str>,
) -> Result<()> {
    let client = GatewayClient::from_config(config)?;
    let chat_id = create_chat_with_client(&client, name, email).await?;
    println!("Chat created: #{}", chat_id);

    if let Some(text) = first_message.map(str::trim).filter(|t| !t.is_empty()) {
        send_message_with_client(&client, chat_id, Author::Client, text).await?;
        println!("Message sent.");
    }
    Ok(())
}

/// Send a message; as the stored staff member when signed in, else as a client.
pub async fn send_message(config: &Config, chat_id: i64, message: &str) -> Result<()> {
    let text = message.trim();
    if text.is_empty() {
        bail!("Message is empty");
    }
    let author = match config.session {
        Some(ref me) => Author::Staff(me.id),
        None => Author::Client,
    };

    let client = GatewayClient::from_config(config)?;
    send_message_with_client(&client, chat_id, author, text).await?;
    println!("Message sent.");
    Ok(())
}

/// Close a chat.
pub async fn close_chat(config: &Config, chat_id: i64, resolution: Resolution) -> Result<()> {
    let client = GatewayClient::from_config(config)?;
    close_chat_with_client(&client, chat_id, resolution).await?;
    println!("Chat #{} closed ({}).", chat_id, resolution.as_str());
    Ok(())
}

/// Add a staff comment as the stored identity.
pub async fn add_comment(config: &Config, chat_id: i64, text: &str) -> Result<()> {
    let me = config
        .session
        .as_ref()
        .context("Comments need a session. Run 'support-chat login' first.")?;
    let text = text.trim();
    if text.is_empty() {
        bail!("Comment is empty");
    }

    let client = GatewayClient::from_config(config)?;
    add_comment_with_client(&client, chat_id, me.id, text).await?;
    println!("Comment added.");
    Ok(())
}
