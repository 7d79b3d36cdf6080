//! Gateway client for the support chat service
//!
//! Three JSON-over-HTTP resources: Auth, Users and Chats. The sync core only
//! sees them through the [`Gateway`] trait.

mod auth;
pub mod chats;
pub mod client;
mod error;
pub mod users;

use async_trait::async_trait;

pub use chats::ChatQuery;
pub use client::GatewayClient;
pub use error::{FailureKind, GatewayError};

use crate::models::{Author, Chat, ChatThread, Identity, NewEmployee, Presence, Resolution};

/// Remote data gateway contract.
///
/// Reads return typed lists that are empty when the payload is malformed;
/// writes fail with [`GatewayError::Business`] when the gateway does not
/// confirm `success: true`.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Identity, GatewayError>;

    async fn list_users(&self) -> Result<Vec<Identity>, GatewayError>;

    async fn create_employee(&self, employee: &NewEmployee) -> Result<(), GatewayError>;

    async fn update_status(&self, user_id: i64, status: Presence) -> Result<(), GatewayError>;

    async fn list_chats(&self, query: ChatQuery) -> Result<Vec<Chat>, GatewayError>;

    async fn read_thread(&self, chat_id: i64) -> Result<ChatThread, GatewayError>;

    async fn create_chat(&self, client_name: &str, client_email: &str)
        -> Result<i64, GatewayError>;

    async fn send_message(
        &self,
        chat_id: i64,
        author: Author,
        message: &str,
    ) -> Result<(), GatewayError>;

    async fn close_chat(&self, chat_id: i64, resolution: Resolution) -> Result<(), GatewayError>;

    async fn add_comment(
        &self,
        chat_id: i64,
        user_id: i64,
        comment: &str,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
impl Gateway for GatewayClient {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, GatewayError> {
        auth::authenticate_with_client(self, username, password).await
    }

    async fn list_users(&self) -> Result<Vec<Identity>, GatewayError> {
        users::list_users_data(self).await
    }

    async fn create_employee(&self, employee: &NewEmployee) -> Result<(), GatewayError> {
        users::create_employee_with_client(self, employee).await
    }

    async fn update_status(&self, user_id: i64, status: Presence) -> Result<(), GatewayError> {
        users::update_status_with_client(self, user_id, status).await
    }

    async fn list_chats(&self, query: ChatQuery) -> Result<Vec<Chat>, GatewayError> {
        chats::list_chats_data(self, query).await
    }

    async fn read_thread(&self, chat_id: i64) -> Result<ChatThread, GatewayError> {
        chats::read_thread_data(self, chat_id).await
    }

    async fn create_chat(
        &self,
        client_name: &str,
        client_email: &str,
    ) -> Result<i64, GatewayError> {
        chats::create_chat_with_client(self, client_name, client_email).await
    }

    async fn send_message(
        &self,
        chat_id: i64,
        author: Author,
        message: &str,
    ) -> Result<(), GatewayError> {
        chats::send_message_with_client(self, chat_id, author, message).await
    }

    async fn close_chat(&self, chat_id: i64, resolution: Resolution) -> Result<(), GatewayError> {
        chats::close_chat_with_client(self, chat_id, resolution).await
    }

    async fn add_comment(
        &self,
        chat_id: i64,
        user_id: i64,
        comment: &str,
    ) -> Result<(), GatewayError> {
        chats::add_comment_with_client(self, chat_id, user_id, comment).await
    }
}
