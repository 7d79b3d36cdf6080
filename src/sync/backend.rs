//! Async backend: bridges the event loop with gateway calls.
//!
//! Uses an mpsc channel pair. The event loop sends `BackendCommand` values,
//! and a background tokio task executes them and sends `BackendResponse`
//! values back. Each command runs in its own task so a slow call never
//! holds up the loop or the calls queued behind it.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::request::{BackendCommand, BackendResponse, Outcome, Request};
use crate::api::{Gateway, GatewayError};

/// Handle for interacting with the backend from the event loop side.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Start the backend. Spawns a tokio task that processes commands.
    pub fn start(gateway: Arc<dyn Gateway>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(gateway, cmd_rx, resp_tx));

        Self { cmd_tx, resp_rx }
    }

    /// Send a command to the backend (non-blocking).
    pub fn send(&self, cmd: BackendCommand) {
        tracing::debug!("Backend <- {:?} {:?}", cmd.origin, cmd.request);
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("Backend channel closed, command dropped");
        }
    }

    pub fn send_all(&self, cmds: impl IntoIterator<Item = BackendCommand>) {
        for cmd in cmds {
            self.send(cmd);
        }
    }

    /// Receive a response from the backend.
    ///
    /// Suspends until a response is available. Returns `None` only when the
    /// backend channel is permanently closed. Cancel-safe, for use inside
    /// `tokio::select!`.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }

    /// Wait for the status write for `user_id` to finish, discarding any
    /// other response that lands first. `None` if the channel closed.
    pub async fn recv_status(&mut self, user_id: i64) -> Option<Result<(), GatewayError>> {
        while let Some(resp) = self.recv().await {
            match resp.outcome {
                Outcome::StatusSet {
                    user_id: id,
                    result,
                    ..
                } if id == user_id => return Some(result),
                other => tracing::debug!("Discarding {:?} while waiting for status write", other),
            }
        }
        None
    }
}

async fn backend_loop(
    gateway: Arc<dyn Gateway>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    while let Some(BackendCommand { origin, request }) = cmd_rx.recv().await {
        let gateway = Arc::clone(&gateway);
        let resp_tx = resp_tx.clone();

        tokio::spawn(async move {
            let outcome = execute(gateway.as_ref(), request).await;
            let _ = resp_tx.send(BackendResponse { origin, outcome });
        });
    }
}

/// Perform one request against the gateway.
pub async fn execute(gateway: &dyn Gateway, request: Request) -> Outcome {
    match request {
        Request::LoadThread { chat_id } => Outcome::ThreadLoaded {
            chat_id,
            result: gateway.read_thread(chat_id).await,
        },
        Request::LoadChats(scope) => Outcome::ChatsLoaded {
            scope,
            result: gateway.list_chats(scope.query()).await,
        },
        Request::LoadEmployees => Outcome::EmployeesLoaded(gateway.list_users().await),
        Request::Authenticate(creds) => {
            Outcome::Authenticated(gateway.authenticate(&creds.username, &creds.password).await)
        }
        Request::SetStatus { user_id, status } => Outcome::StatusSet {
            user_id,
            status,
            result: gateway.update_status(user_id, status).await,
        },
        Request::CreateChat {
            client_name,
            client_email,
        } => Outcome::ChatCreated(gateway.create_chat(&client_name, &client_email).await),
        Request::SendMessage {
            chat_id,
            author,
            text,
        } => Outcome::MessageSent {
            chat_id,
            result: gateway.send_message(chat_id, author, &text).await,
        },
        Request::AddComment {
            chat_id,
            user_id,
            text,
        } => Outcome::CommentAdded {
            chat_id,
            result: gateway.add_comment(chat_id, user_id, &text).await,
        },
        Request::CloseChat {
            chat_id,
            resolution,
        } => Outcome::ChatClosed {
            chat_id,
            result: gateway.close_chat(chat_id, resolution).await,
        },
        Request::CreateEmployee(employee) => {
            let username = employee.username.clone();
            Outcome::EmployeeCreated {
                username,
                result: gateway.create_employee(&employee).await,
            }
        }
    }
}
