//! Requests the sync core asks for, and the outcomes that come back.

use crate::api::{ChatQuery, GatewayError};
use crate::models::{Author, Chat, ChatThread, Identity, NewEmployee, Presence, Resolution};

/// Who asked for a request. Decides how a failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Explicit user action: failures become notifications.
    User,
    /// Poll tick: failures are only logged.
    Background,
}

/// What a chat list was fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatScope {
    /// Chats assigned to one operator
    Operator(i64),
    /// The admin's full list, with or without closed chats
    All { archive: bool },
}

impl ChatScope {
    pub fn query(&self) -> ChatQuery {
        match *self {
            ChatScope::Operator(id) => ChatQuery::Operator(id),
            ChatScope::All { archive: false } => ChatQuery::Open,
            ChatScope::All { archive: true } => ChatQuery::WithArchive,
        }
    }
}

/// Login form contents
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One gateway call, described but not yet performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadThread {
        chat_id: i64,
    },
    LoadChats(ChatScope),
    LoadEmployees,
    Authenticate(Credentials),
    SetStatus {
        user_id: i64,
        status: Presence,
    },
    CreateChat {
        client_name: String,
        client_email: String,
    },
    SendMessage {
        chat_id: i64,
        author: Author,
        text: String,
    },
    AddComment {
        chat_id: i64,
        user_id: i64,
        text: String,
    },
    CloseChat {
        chat_id: i64,
        resolution: Resolution,
    },
    CreateEmployee(NewEmployee),
}

impl Request {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Request::LoadThread { .. } | Request::LoadChats(_) | Request::LoadEmployees
        )
    }
}

/// Result of a performed [`Request`], tagged with what it was for.
#[derive(Debug)]
pub enum Outcome {
    Authenticated(Result<Identity, GatewayError>),
    StatusSet {
        user_id: i64,
        status: Presence,
        result: Result<(), GatewayError>,
    },
    EmployeesLoaded(Result<Vec<Identity>, GatewayError>),
    EmployeeCreated {
        username: String,
        result: Result<(), GatewayError>,
    },
    ChatsLoaded {
        scope: ChatScope,
        result: Result<Vec<Chat>, GatewayError>,
    },
    ThreadLoaded {
        chat_id: i64,
        result: Result<ChatThread, GatewayError>,
    },
    ChatCreated(Result<i64, GatewayError>),
    MessageSent {
        chat_id: i64,
        result: Result<(), GatewayError>,
    },
    CommentAdded {
        chat_id: i64,
        result: Result<(), GatewayError>,
    },
    ChatClosed {
        chat_id: i64,
        result: Result<(), GatewayError>,
    },
}

/// Command sent from the event loop to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    pub origin: Origin,
    pub request: Request,
}

impl BackendCommand {
    pub fn user(request: Request) -> Self {
        Self {
            origin: Origin::User,
            request,
        }
    }

    pub fn background(request: Request) -> Self {
        Self {
            origin: Origin::Background,
            request,
        }
    }
}

/// Response from the backend to the event loop.
#[derive(Debug)]
pub struct BackendResponse {
    pub origin: Origin,
    pub outcome: Outcome,
}
