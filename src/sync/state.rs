//! The client-side state object and its transitions.
//!
//! `SyncCore` never talks to the network. User intents and backend outcomes
//! go in, [`BackendCommand`]s come out. Writes are never applied locally:
//! a confirmed write is followed by a re-read, and only reads replace
//! cached data.

use std::time::{Duration, Instant};

use super::notify::Notifications;
use super::request::{
    BackendCommand, BackendResponse, ChatScope, Credentials, Origin, Outcome, Request,
};
use super::scheduler::PollKey;
use super::session::{AnonymousScreen, Session, View};
use crate::api::GatewayError;
use crate::models::{
    Author, Chat, Comment, Identity, Message, NewEmployee, Presence, Resolution, Role,
};

/// Name used when a client starts a chat without one.
const ANONYMOUS_CLIENT: &str = "Anonymous";

/// All client-side state, owned by the event loop.
#[derive(Debug)]
pub struct SyncCore {
    session: Session,
    screen: AnonymousScreen,
    /// The one chat whose thread is cached
    focus: Option<i64>,
    focused_chat: Option<Chat>,
    messages: Vec<Message>,
    comments: Vec<Comment>,
    chats: Vec<Chat>,
    employees: Vec<Identity>,
    /// Admin toggle: include closed chats in list reads
    archive: bool,
    notifications: Notifications,
}

impl SyncCore {
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            session: Session::Anonymous,
            screen: AnonymousScreen::Client,
            focus: None,
            focused_chat: None,
            messages: Vec::new(),
            comments: Vec::new(),
            chats: Vec::new(),
            employees: Vec::new(),
            archive: false,
            notifications: Notifications::new(notification_ttl),
        }
    }

    // -- Read access for the renderer --

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    pub fn view(&self) -> View {
        View::resolve(&self.session, self.screen)
    }

    pub fn focus(&self) -> Option<i64> {
        self.focus
    }

    /// The focused chat's record, from the thread read or the list.
    pub fn focused_chat(&self) -> Option<&Chat> {
        let id = self.focus?;
        self.focused_chat
            .as_ref()
            .filter(|c| c.id == id)
            .or_else(|| self.chats.iter().find(|c| c.id == id))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    /// Closed chats out of the fetched list.
    pub fn archived_chats(&self) -> impl Iterator<Item = &Chat> {
        self.chats.iter().filter(|c| c.is_closed())
    }

    pub fn employees(&self) -> &[Identity] {
        &self.employees
    }

    pub fn archive(&self) -> bool {
        self.archive
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn expire_notifications(&mut self, now: Instant) {
        self.notifications.expire(now);
    }

    /// Which list read the current session polls, if any.
    pub fn chat_scope(&self) -> Option<ChatScope> {
        match &self.session {
            Session::Operator(me) => Some(ChatScope::Operator(me.id)),
            Session::Admin(_) => Some(ChatScope::All {
                archive: self.archive,
            }),
            _ => None,
        }
    }

    /// What the poll timer depends on; a change restarts it.
    pub fn poll_key(&self) -> PollKey {
        PollKey {
            focus: self.focus,
            identity: self.identity().map(|me| (me.id, me.role)),
        }
    }

    // -- Polling --

    /// Refreshes for one poll tick, computed from the state right now.
    pub fn poll(&self) -> Vec<BackendCommand> {
        let mut cmds = Vec::new();
        if let Some(chat_id) = self.focus {
            cmds.push(BackendCommand::background(Request::LoadThread { chat_id }));
        }
        if let Some(scope) = self.chat_scope() {
            cmds.push(BackendCommand::background(Request::LoadChats(scope)));
        }
        cmds
    }

    // -- Anonymous intents --

    pub fn show_login(&mut self) {
        if matches!(self.session, Session::Anonymous) {
            self.screen = AnonymousScreen::Login;
        }
    }

    pub fn show_client(&mut self) {
        if matches!(self.session, Session::Anonymous) {
            self.screen = AnonymousScreen::Client;
        }
    }

    /// Submit staff credentials.
    pub fn submit_login(&mut self, username: &str, password: &str) -> Vec<BackendCommand> {
        if !matches!(self.session, Session::Anonymous) {
            tracing::debug!("Ignoring sign-in while {:?}", self.session);
            return Vec::new();
        }
        let username = username.trim();
        if username.is_empty() {
            self.notifications.error("Enter a username");
            return Vec::new();
        }

        tracing::info!("Signing in as {}", username);
        self.screen = AnonymousScreen::Login;
        self.session = Session::Authenticating {
            username: username.to_string(),
        };
        vec![BackendCommand::user(Request::Authenticate(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }))]
    }

    /// Open a chat as an anonymous client.
    pub fn start_chat(&mut self, name: &str, email: &str) -> Vec<BackendCommand> {
        if !matches!(self.session, Session::Anonymous) || self.focus.is_some() {
            return Vec::new();
        }
        let name = match name.trim() {
            "" => ANONYMOUS_CLIENT,
            n => n,
        };
        vec![BackendCommand::user(Request::CreateChat {
            client_name: name.to_string(),
            client_email: email.trim().to_string(),
        })]
    }

    // -- Focus --

    /// Focus a chat. A different chat discards the cached thread first.
    pub fn focus_chat(&mut self, chat_id: i64) -> Vec<BackendCommand> {
        if self.focus != Some(chat_id) {
            self.clear_focus();
            self.focus = Some(chat_id);
        }
        vec![BackendCommand::user(Request::LoadThread { chat_id })]
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
        self.focused_chat = None;
        self.messages.clear();
        self.comments.clear();
    }

    // -- Writes --

    /// Send into the focused chat. No focus or blank text: no request.
    pub fn send_message(&mut self, text: &str) -> Vec<BackendCommand> {
        let text = text.trim();
        let Some(chat_id) = self.focus else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }
        // Admins read and annotate chats; replies come from operators.
        let author = match &self.session {
            Session::Operator(me) => Author::Staff(me.id),
            Session::Anonymous => Author::Client,
            _ => return Vec::new(),
        };
        vec![BackendCommand::user(Request::SendMessage {
            chat_id,
            author,
            text: text.to_string(),
        })]
    }

    /// Staff-only note on the focused chat.
    pub fn add_comment(&mut self, text: &str) -> Vec<BackendCommand> {
        let text = text.trim();
        let (Some(chat_id), Some(me)) = (self.focus, self.identity()) else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }
        vec![BackendCommand::user(Request::AddComment {
            chat_id,
            user_id: me.id,
            text: text.to_string(),
        })]
    }

    /// Close the focused chat. A chat that is already closed keeps its
    /// resolution.
    pub fn close_chat(&mut self, resolution: Resolution) -> Vec<BackendCommand> {
        if !self.can_close_focused() {
            return Vec::new();
        }
        match (self.focus, self.session.is_staff()) {
            (Some(chat_id), true) => vec![BackendCommand::user(Request::CloseChat {
                chat_id,
                resolution,
            })],
            _ => Vec::new(),
        }
    }

    /// Staff with an open chat focused.
    pub fn can_close_focused(&self) -> bool {
        self.focus.is_some()
            && self.session.is_staff()
            && !self.focused_chat().is_some_and(Chat::is_closed)
    }

    /// Admin: include or exclude closed chats. Re-reads the list.
    pub fn toggle_archive(&mut self) -> Vec<BackendCommand> {
        if !matches!(self.session, Session::Admin(_)) {
            return Vec::new();
        }
        self.archive = !self.archive;
        vec![BackendCommand::user(Request::LoadChats(ChatScope::All {
            archive: self.archive,
        }))]
    }

    /// Flip a staff member's presence. Anyone may flip their own; an admin
    /// may flip any operator's.
    pub fn toggle_status(&mut self, user_id: i64) -> Vec<BackendCommand> {
        let Some(me) = self.identity() else {
            return Vec::new();
        };

        let current = if me.id == user_id {
            me.status
        } else if me.is_admin() {
            match self.employees.iter().find(|e| e.id == user_id) {
                Some(e) if e.role == Role::Operator => e.status,
                _ => return Vec::new(),
            }
        } else {
            return Vec::new();
        };

        vec![BackendCommand::user(Request::SetStatus {
            user_id,
            status: current.toggled(),
        })]
    }

    /// Admin: create an employee account.
    pub fn create_employee(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Vec<BackendCommand> {
        if !matches!(self.session, Session::Admin(_)) {
            return Vec::new();
        }
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            self.notifications.error("Username and password are required");
            return Vec::new();
        }
        vec![BackendCommand::user(Request::CreateEmployee(NewEmployee {
            username: username.to_string(),
            password: password.to_string(),
            role,
        }))]
    }

    /// Sign out: mark offline and drop everything the identity could see.
    pub fn logout(&mut self) -> Vec<BackendCommand> {
        let Some(me) = self.identity() else {
            return Vec::new();
        };
        let user_id = me.id;
        tracing::info!("Signing out {}", me.username);

        self.session = Session::Anonymous;
        self.screen = AnonymousScreen::Client;
        self.reset_caches();
        self.notifications.info("Signed out");

        // Nobody is left to show a failure to.
        vec![BackendCommand::background(Request::SetStatus {
            user_id,
            status: Presence::Offline,
        })]
    }

    fn reset_caches(&mut self) {
        self.clear_focus();
        self.chats.clear();
        self.employees.clear();
        self.archive = false;
    }

    // -- Outcomes --

    /// Fold a backend response into state. Returns follow-up reads.
    pub fn apply(&mut self, response: BackendResponse) -> Vec<BackendCommand> {
        let origin = response.origin;
        let follow_up = |request| BackendCommand { origin, request };

        match response.outcome {
            Outcome::Authenticated(Ok(identity)) => {
                if !self.session.is_authenticating() {
                    tracing::debug!("Dropping late sign-in result for {}", identity.username);
                    return Vec::new();
                }
                tracing::info!(
                    "Signed in as {} ({})",
                    identity.username,
                    identity.role.as_str()
                );
                let user_id = identity.id;
                let role = identity.role;
                self.notifications
                    .info(format!("Signed in as {}", identity.username));
                self.reset_caches();
                self.screen = AnonymousScreen::Client;
                self.session = Session::authenticated(identity);

                let mut cmds = vec![follow_up(Request::SetStatus {
                    user_id,
                    status: Presence::Online,
                })];
                match role {
                    Role::Operator => {
                        cmds.push(follow_up(Request::LoadChats(ChatScope::Operator(user_id))))
                    }
                    Role::SuperAdmin => {
                        cmds.push(follow_up(Request::LoadEmployees));
                        cmds.push(follow_up(Request::LoadChats(ChatScope::All {
                            archive: self.archive,
                        })));
                    }
                }
                cmds
            }
            Outcome::Authenticated(Err(e)) => {
                if self.session.is_authenticating() {
                    self.session = Session::Anonymous;
                    self.screen = AnonymousScreen::Login;
                }
                // Sign-in is always an explicit action.
                self.report(Origin::User, "Sign-in failed", &e);
                Vec::new()
            }

            Outcome::StatusSet {
                user_id,
                status,
                result: Ok(()),
            } => {
                tracing::info!("User {} is now {}", user_id, status.as_str());
                if self.session.is_staff() {
                    vec![follow_up(Request::LoadEmployees)]
                } else {
                    Vec::new()
                }
            }
            Outcome::StatusSet {
                result: Err(e), ..
            } => {
                self.report(origin, "Could not update status", &e);
                Vec::new()
            }

            Outcome::EmployeesLoaded(Ok(users)) => {
                if !self.session.is_staff() {
                    return Vec::new();
                }
                if let Some(me) = self.session.identity_mut() {
                    if let Some(fresh) = users.iter().find(|u| u.id == me.id) {
                        me.status = fresh.status;
                    }
                }
                self.employees = users;
                Vec::new()
            }
            Outcome::EmployeesLoaded(Err(e)) => {
                self.report(origin, "Could not load employees", &e);
                Vec::new()
            }

            Outcome::EmployeeCreated {
                username,
                result: Ok(()),
            } => {
                self.notifications
                    .info(format!("Employee {} added", username));
                vec![follow_up(Request::LoadEmployees)]
            }
            Outcome::EmployeeCreated {
                result: Err(e), ..
            } => {
                self.report(origin, "Could not add employee", &e);
                Vec::new()
            }

            Outcome::ChatsLoaded {
                scope,
                result: Ok(chats),
            } => {
                if self.chat_scope() == Some(scope) {
                    self.chats = chats;
                } else {
                    tracing::debug!("Dropping chat list for stale scope {:?}", scope);
                }
                Vec::new()
            }
            Outcome::ChatsLoaded {
                result: Err(e), ..
            } => {
                self.report(origin, "Could not load chats", &e);
                Vec::new()
            }

            Outcome::ThreadLoaded {
                chat_id,
                result: Ok(thread),
            } => {
                if self.focus != Some(chat_id) {
                    tracing::debug!("Dropping thread for unfocused chat {}", chat_id);
                    return Vec::new();
                }
                self.messages = thread.messages;
                self.comments = if self.session.is_staff() {
                    thread.comments
                } else {
                    Vec::new()
                };
                if thread.chat.is_some() {
                    self.focused_chat = thread.chat;
                }
                Vec::new()
            }
            Outcome::ThreadLoaded {
                result: Err(e), ..
            } => {
                self.report(origin, "Could not load messages", &e);
                Vec::new()
            }

            Outcome::ChatCreated(Ok(chat_id)) => {
                if !matches!(self.session, Session::Anonymous) || self.focus.is_some() {
                    return Vec::new();
                }
                self.notifications.info("Chat created");
                self.focus = Some(chat_id);
                vec![follow_up(Request::LoadThread { chat_id })]
            }
            Outcome::ChatCreated(Err(e)) => {
                self.report(origin, "Could not start chat", &e);
                Vec::new()
            }

            Outcome::MessageSent {
                chat_id,
                result: Ok(()),
            } => self.refetch_thread(chat_id, origin),
            Outcome::MessageSent {
                result: Err(e), ..
            } => {
                self.report(origin, "Message not sent", &e);
                Vec::new()
            }

            Outcome::CommentAdded {
                chat_id,
                result: Ok(()),
            } => {
                self.notifications.info("Comment added");
                self.refetch_thread(chat_id, origin)
            }
            Outcome::CommentAdded {
                result: Err(e), ..
            } => {
                self.report(origin, "Comment not added", &e);
                Vec::new()
            }

            Outcome::ChatClosed {
                chat_id,
                result: Ok(()),
            } => {
                self.notifications.info(format!("Chat #{} closed", chat_id));
                if self.focus == Some(chat_id) {
                    self.clear_focus();
                }
                self.chat_scope()
                    .map(|scope| vec![follow_up(Request::LoadChats(scope))])
                    .unwrap_or_default()
            }
            Outcome::ChatClosed {
                result: Err(e), ..
            } => {
                self.report(origin, "Could not close chat", &e);
                Vec::new()
            }
        }
    }

    fn refetch_thread(&self, chat_id: i64, origin: Origin) -> Vec<BackendCommand> {
        if self.focus == Some(chat_id) {
            vec![BackendCommand {
                origin,
                request: Request::LoadThread { chat_id },
            }]
        } else {
            Vec::new()
        }
    }

    /// Single failure policy: notify for user actions, log for polls.
    fn report(&mut self, origin: Origin, what: &str, err: &GatewayError) {
        match origin {
            Origin::User => {
                tracing::warn!("{}: {}", what, err);
                self.notifications.error(format!("{}: {}", what, err));
            }
            Origin::Background => {
                tracing::warn!("Background refresh failed ({:?}). {}: {}", err.kind(), what, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatStatus, ChatThread, SenderType};
    use crate::sync::notify::Level;

    fn identity(id: i64, role: Role) -> Identity {
        Identity {
            id,
            username: format!("user{}", id),
            role,
            status: Presence::Offline,
            created_at: None,
        }
    }

    fn chat(id: i64, status: ChatStatus) -> Chat {
        Chat {
            id,
            client_name: format!("client {}", id),
            client_email: String::new(),
            status,
            assigned_operator_id: Some(2),
            created_at: None,
            resolution: None,
            closed_at: None,
            operator_name: None,
        }
    }

    fn message(id: i64, text: &str) -> Message {
        Message {
            id,
            sender_type: SenderType::Client,
            sender_id: None,
            message: text.to_string(),
            created_at: None,
        }
    }

    fn respond(core: &mut SyncCore, origin: Origin, outcome: Outcome) -> Vec<BackendCommand> {
        core.apply(BackendResponse { origin, outcome })
    }

    fn signed_in(role: Role) -> SyncCore {
        let mut core = SyncCore::new(Duration::from_secs(5));
        core.submit_login("user2", "pw");
        respond(
            &mut core,
            Origin::User,
            Outcome::Authenticated(Ok(identity(2, role))),
        );
        core.notifications_mut().dismiss();
        core
    }

    fn requests(cmds: &[BackendCommand]) -> Vec<&Request> {
        cmds.iter().map(|c| &c.request).collect()
    }

    #[test]
    fn test_operator_login_marks_online_and_loads_own_chats() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        core.show_login();
        let cmds = core.submit_login(" user2 ", "pw");
        assert_eq!(cmds.len(), 1);
        assert!(matches!(
            &cmds[0].request,
            Request::Authenticate(c) if c.username == "user2"
        ));
        assert!(core.session().is_authenticating());
        assert_eq!(core.view(), View::Login);

        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::Authenticated(Ok(identity(2, Role::Operator))),
        );

        assert_eq!(core.view(), View::Operator);
        assert!(matches!(core.session(), Session::Operator(_)));

        let writes: Vec<_> = cmds.iter().filter(|c| c.request.is_write()).collect();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].request,
            Request::SetStatus {
                user_id: 2,
                status: Presence::Online
            }
        );

        let list_reads: Vec<_> = cmds
            .iter()
            .filter(|c| matches!(c.request, Request::LoadChats(_)))
            .collect();
        assert_eq!(list_reads.len(), 1);
        assert_eq!(
            list_reads[0].request,
            Request::LoadChats(ChatScope::Operator(2))
        );
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn test_admin_login_loads_employees_and_all_chats() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        core.submit_login("root", "pw");
        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::Authenticated(Ok(identity(1, Role::SuperAdmin))),
        );

        assert_eq!(core.view(), View::Admin);
        assert_eq!(
            requests(&cmds),
            vec![
                &Request::SetStatus {
                    user_id: 1,
                    status: Presence::Online
                },
                &Request::LoadEmployees,
                &Request::LoadChats(ChatScope::All { archive: false }),
            ]
        );
    }

    #[test]
    fn test_failed_login_stays_anonymous_and_notifies() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        core.show_login();
        core.submit_login("user2", "wrong");

        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::Authenticated(Err(GatewayError::business("Invalid username or password"))),
        );

        assert!(cmds.is_empty());
        assert_eq!(core.session(), &Session::Anonymous);
        assert_eq!(core.view(), View::Login);
        let note = core.notifications().current().unwrap();
        assert_eq!(note.level, Level::Error);
        assert!(note.text.contains("Invalid username or password"));
    }

    #[test]
    fn test_login_ignored_while_authenticating_or_blank() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        assert!(core.submit_login("   ", "pw").is_empty());
        assert_eq!(core.notifications().len(), 1);

        assert_eq!(core.submit_login("anna", "pw").len(), 1);
        assert!(core.submit_login("anna", "pw").is_empty());
    }

    #[test]
    fn test_send_without_focus_is_noop() {
        let mut core = signed_in(Role::Operator);
        assert!(core.send_message("hello").is_empty());

        let mut anon = SyncCore::new(Duration::from_secs(5));
        assert!(anon.send_message("hello").is_empty());
    }

    #[test]
    fn test_admin_does_not_send_messages() {
        let mut core = signed_in(Role::SuperAdmin);
        core.focus_chat(3);
        assert!(core.send_message("hello").is_empty());
        assert_eq!(core.add_comment("note").len(), 1);
    }

    #[test]
    fn test_send_refetches_instead_of_appending() {
        let mut core = signed_in(Role::Operator);
        core.focus_chat(7);
        respond(
            &mut core,
            Origin::User,
            Outcome::ThreadLoaded {
                chat_id: 7,
                result: Ok(ChatThread {
                    chat: None,
                    messages: vec![message(1, "hi")],
                    comments: vec![],
                }),
            },
        );

        let cmds = core.send_message("  how can I help?  ");
        assert_eq!(
            requests(&cmds),
            vec![&Request::SendMessage {
                chat_id: 7,
                author: Author::Staff(2),
                text: "how can I help?".into()
            }]
        );
        assert_eq!(core.messages().len(), 1);

        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::MessageSent {
                chat_id: 7,
                result: Ok(()),
            },
        );
        assert_eq!(requests(&cmds), vec![&Request::LoadThread { chat_id: 7 }]);
        // Confirmed but not yet re-read: still the old list.
        assert_eq!(core.messages().len(), 1);

        respond(
            &mut core,
            Origin::User,
            Outcome::ThreadLoaded {
                chat_id: 7,
                result: Ok(ChatThread {
                    chat: None,
                    messages: vec![message(1, "hi"), message(2, "how can I help?")],
                    comments: vec![],
                }),
            },
        );
        assert_eq!(core.messages().len(), 2);
        assert_eq!(core.messages()[1].message, "how can I help?");
    }

    #[test]
    fn test_failed_send_leaves_state_and_notifies() {
        let mut core = signed_in(Role::Operator);
        core.focus_chat(7);
        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::MessageSent {
                chat_id: 7,
                result: Err(GatewayError::business("HTTP 500")),
            },
        );
        assert!(cmds.is_empty());
        assert_eq!(core.focus(), Some(7));
        assert_eq!(
            core.notifications().current().map(|n| n.level),
            Some(Level::Error)
        );
    }

    #[test]
    fn test_archive_toggle_changes_query_and_list() {
        let mut core = signed_in(Role::SuperAdmin);
        respond(
            &mut core,
            Origin::Background,
            Outcome::ChatsLoaded {
                scope: ChatScope::All { archive: false },
                result: Ok(vec![chat(1, ChatStatus::Active)]),
            },
        );
        assert_eq!(core.archived_chats().count(), 0);

        let cmds = core.toggle_archive();
        assert_eq!(
            requests(&cmds),
            vec![&Request::LoadChats(ChatScope::All { archive: true })]
        );
        respond(
            &mut core,
            Origin::User,
            Outcome::ChatsLoaded {
                scope: ChatScope::All { archive: true },
                result: Ok(vec![chat(1, ChatStatus::Active), chat(2, ChatStatus::Closed)]),
            },
        );
        assert_eq!(core.chats().len(), 2);
        assert_eq!(
            core.archived_chats().map(|c| c.id).collect::<Vec<_>>(),
            vec![2]
        );

        let cmds = core.toggle_archive();
        assert_eq!(
            requests(&cmds),
            vec![&Request::LoadChats(ChatScope::All { archive: false })]
        );
        respond(
            &mut core,
            Origin::User,
            Outcome::ChatsLoaded {
                scope: ChatScope::All { archive: false },
                result: Ok(vec![chat(1, ChatStatus::Active)]),
            },
        );
        assert_eq!(core.archived_chats().count(), 0);
    }

    #[test]
    fn test_late_list_for_old_archive_flag_is_dropped() {
        let mut core = signed_in(Role::SuperAdmin);
        core.toggle_archive();
        respond(
            &mut core,
            Origin::Background,
            Outcome::ChatsLoaded {
                scope: ChatScope::All { archive: false },
                result: Ok(vec![chat(1, ChatStatus::Active)]),
            },
        );
        assert!(core.chats().is_empty());
    }

    #[test]
    fn test_close_clears_focus_and_refreshes_role_list() {
        let mut op = signed_in(Role::Operator);
        op.focus_chat(7);
        assert_eq!(
            requests(&op.close_chat(Resolution::Resolved)),
            vec![&Request::CloseChat {
                chat_id: 7,
                resolution: Resolution::Resolved
            }]
        );
        let cmds = respond(
            &mut op,
            Origin::User,
            Outcome::ChatClosed {
                chat_id: 7,
                result: Ok(()),
            },
        );
        assert_eq!(op.focus(), None);
        assert_eq!(
            requests(&cmds),
            vec![&Request::LoadChats(ChatScope::Operator(2))]
        );

        let mut admin = signed_in(Role::SuperAdmin);
        admin.focus_chat(9);
        admin.close_chat(Resolution::Resolved);
        let cmds = respond(
            &mut admin,
            Origin::User,
            Outcome::ChatClosed {
                chat_id: 9,
                result: Ok(()),
            },
        );
        assert_eq!(admin.focus(), None);
        assert_eq!(
            requests(&cmds),
            vec![&Request::LoadChats(ChatScope::All { archive: false })]
        );
    }

    #[test]
    fn test_failed_close_keeps_focus() {
        let mut op = signed_in(Role::Operator);
        op.focus_chat(7);
        let cmds = respond(
            &mut op,
            Origin::User,
            Outcome::ChatClosed {
                chat_id: 7,
                result: Err(GatewayError::business("request rejected")),
            },
        );
        assert!(cmds.is_empty());
        assert_eq!(op.focus(), Some(7));
    }

    #[test]
    fn test_poll_reads_current_state() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        assert!(core.poll().is_empty());

        core = signed_in(Role::Operator);
        assert_eq!(
            requests(&core.poll()),
            vec![&Request::LoadChats(ChatScope::Operator(2))]
        );

        core.focus_chat(3);
        let cmds = core.poll();
        assert!(cmds.iter().all(|c| c.origin == Origin::Background));
        assert_eq!(
            requests(&cmds),
            vec![
                &Request::LoadThread { chat_id: 3 },
                &Request::LoadChats(ChatScope::Operator(2))
            ]
        );

        core.focus_chat(4);
        assert_eq!(
            requests(&core.poll())[0],
            &Request::LoadThread { chat_id: 4 }
        );
    }

    #[test]
    fn test_switching_focus_discards_thread_and_drops_late_response() {
        let mut core = signed_in(Role::Operator);
        core.focus_chat(3);
        respond(
            &mut core,
            Origin::User,
            Outcome::ThreadLoaded {
                chat_id: 3,
                result: Ok(ChatThread {
                    chat: Some(chat(3, ChatStatus::Active)),
                    messages: vec![message(1, "from chat 3")],
                    comments: vec![],
                }),
            },
        );
        assert_eq!(core.focused_chat().map(|c| c.id), Some(3));

        core.focus_chat(4);
        assert!(core.messages().is_empty());
        assert!(core.focused_chat().is_none());

        respond(
            &mut core,
            Origin::Background,
            Outcome::ThreadLoaded {
                chat_id: 3,
                result: Ok(ChatThread {
                    chat: None,
                    messages: vec![message(1, "from chat 3")],
                    comments: vec![],
                }),
            },
        );
        assert!(core.messages().is_empty());
    }

    #[test]
    fn test_background_failure_is_silent() {
        let mut core = signed_in(Role::Operator);
        core.focus_chat(3);
        respond(
            &mut core,
            Origin::Background,
            Outcome::ThreadLoaded {
                chat_id: 3,
                result: Err(GatewayError::business("HTTP 502")),
            },
        );
        respond(
            &mut core,
            Origin::Background,
            Outcome::ChatsLoaded {
                scope: ChatScope::Operator(2),
                result: Err(GatewayError::business("HTTP 502")),
            },
        );
        assert!(core.notifications().is_empty());

        respond(
            &mut core,
            Origin::User,
            Outcome::ThreadLoaded {
                chat_id: 3,
                result: Err(GatewayError::business("HTTP 502")),
            },
        );
        assert_eq!(core.notifications().len(), 1);
    }

    #[test]
    fn test_client_chat_flow_hides_comments() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        let cmds = core.start_chat("  ", "ivan@example.com");
        assert_eq!(
            requests(&cmds),
            vec![&Request::CreateChat {
                client_name: "Anonymous".into(),
                client_email: "ivan@example.com".into()
            }]
        );

        let cmds = respond(&mut core, Origin::User, Outcome::ChatCreated(Ok(11)));
        assert_eq!(core.focus(), Some(11));
        assert_eq!(requests(&cmds), vec![&Request::LoadThread { chat_id: 11 }]);
        assert!(core.start_chat("Ivan", "").is_empty());

        respond(
            &mut core,
            Origin::Background,
            Outcome::ThreadLoaded {
                chat_id: 11,
                result: Ok(ChatThread {
                    chat: None,
                    messages: vec![message(1, "hello")],
                    comments: vec![Comment {
                        id: 1,
                        comment: "internal".into(),
                        created_at: None,
                        username: Some("anna".into()),
                    }],
                }),
            },
        );
        assert_eq!(core.messages().len(), 1);
        assert!(core.comments().is_empty());

        let cmds = core.send_message("thanks");
        assert_eq!(
            requests(&cmds),
            vec![&Request::SendMessage {
                chat_id: 11,
                author: Author::Client,
                text: "thanks".into()
            }]
        );
    }

    #[test]
    fn test_comment_needs_staff_and_refetches() {
        let mut anon = SyncCore::new(Duration::from_secs(5));
        anon.focus_chat(3);
        assert!(anon.add_comment("note").is_empty());

        let mut core = signed_in(Role::Operator);
        core.focus_chat(3);
        assert!(core.add_comment("  ").is_empty());
        assert_eq!(
            requests(&core.add_comment("vip client")),
            vec![&Request::AddComment {
                chat_id: 3,
                user_id: 2,
                text: "vip client".into()
            }]
        );
        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::CommentAdded {
                chat_id: 3,
                result: Ok(()),
            },
        );
        assert_eq!(requests(&cmds), vec![&Request::LoadThread { chat_id: 3 }]);
    }

    #[test]
    fn test_status_toggle_refetches_and_updates_identity() {
        let mut core = signed_in(Role::Operator);
        let cmds = core.toggle_status(2);
        assert_eq!(
            requests(&cmds),
            vec![&Request::SetStatus {
                user_id: 2,
                status: Presence::Online
            }]
        );
        // Not applied locally.
        assert_eq!(core.identity().map(|me| me.status), Some(Presence::Offline));

        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::StatusSet {
                user_id: 2,
                status: Presence::Online,
                result: Ok(()),
            },
        );
        assert_eq!(requests(&cmds), vec![&Request::LoadEmployees]);

        let mut fresh = identity(2, Role::Operator);
        fresh.status = Presence::Online;
        respond(&mut core, Origin::User, Outcome::EmployeesLoaded(Ok(vec![fresh])));
        assert_eq!(core.identity().map(|me| me.status), Some(Presence::Online));

        // Operators cannot flip someone else.
        assert!(core.toggle_status(5).is_empty());
    }

    #[test]
    fn test_admin_toggles_operator_but_not_admin() {
        let mut core = signed_in(Role::SuperAdmin);
        respond(
            &mut core,
            Origin::User,
            Outcome::EmployeesLoaded(Ok(vec![
                identity(2, Role::SuperAdmin),
                identity(5, Role::Operator),
                identity(6, Role::SuperAdmin),
            ])),
        );
        assert_eq!(
            requests(&core.toggle_status(5)),
            vec![&Request::SetStatus {
                user_id: 5,
                status: Presence::Online
            }]
        );
        assert!(core.toggle_status(6).is_empty());
        assert!(core.toggle_status(99).is_empty());
    }

    #[test]
    fn test_create_employee_validates_and_refetches() {
        let mut core = signed_in(Role::SuperAdmin);
        assert!(core.create_employee("bob", "", Role::Operator).is_empty());
        assert_eq!(core.notifications().len(), 1);

        let cmds = core.create_employee(" bob ", "pw", Role::Operator);
        assert!(matches!(
            &cmds[0].request,
            Request::CreateEmployee(e) if e.username == "bob"
        ));

        let cmds = respond(
            &mut core,
            Origin::User,
            Outcome::EmployeeCreated {
                username: "bob".into(),
                result: Ok(()),
            },
        );
        assert_eq!(requests(&cmds), vec![&Request::LoadEmployees]);

        let mut op = signed_in(Role::Operator);
        assert!(op.create_employee("bob", "pw", Role::Operator).is_empty());
    }

    #[test]
    fn test_logout_marks_offline_and_clears_caches() {
        let mut core = signed_in(Role::SuperAdmin);
        core.toggle_archive();
        core.focus_chat(3);
        respond(
            &mut core,
            Origin::User,
            Outcome::ChatsLoaded {
                scope: ChatScope::All { archive: true },
                result: Ok(vec![chat(3, ChatStatus::Closed)]),
            },
        );

        let cmds = core.logout();
        assert_eq!(
            requests(&cmds),
            vec![&Request::SetStatus {
                user_id: 2,
                status: Presence::Offline
            }]
        );
        assert_eq!(core.session(), &Session::Anonymous);
        assert_eq!(core.view(), View::Client);
        assert_eq!(core.focus(), None);
        assert!(core.chats().is_empty());
        assert!(!core.archive());
        assert!(core.poll().is_empty());
        assert!(cmds.iter().all(|c| c.origin == Origin::Background));

        // The offline write confirming after logout triggers nothing.
        let cmds = respond(
            &mut core,
            Origin::Background,
            Outcome::StatusSet {
                user_id: 2,
                status: Presence::Offline,
                result: Ok(()),
            },
        );
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_poll_key_tracks_focus_and_identity() {
        let mut core = SyncCore::new(Duration::from_secs(5));
        let anon_key = core.poll_key();

        core = signed_in(Role::Operator);
        let op_key = core.poll_key();
        assert_ne!(anon_key, op_key);

        core.focus_chat(3);
        assert_ne!(core.poll_key(), op_key);
        core.clear_focus();
        assert_eq!(core.poll_key(), op_key);
    }

    #[test]
    fn test_failed_offline_write_after_logout_is_silent() {
        let mut core = signed_in(Role::Operator);
        let cmds = core.logout();
        core.notifications_mut().dismiss();

        let origin = cmds[0].origin;
        respond(
            &mut core,
            origin,
            Outcome::StatusSet {
                user_id: 2,
                status: Presence::Offline,
                result: Err(GatewayError::business("HTTP 500")),
            },
        );
        assert!(core.notifications().is_empty());
    }

    #[test]
    fn test_closed_chat_cannot_be_closed_again() {
        let mut core = signed_in(Role::SuperAdmin);
        core.toggle_archive();
        core.focus_chat(9);
        let mut closed = chat(9, ChatStatus::Closed);
        closed.resolution = Some(Resolution::Resolved);
        respond(
            &mut core,
            Origin::User,
            Outcome::ThreadLoaded {
                chat_id: 9,
                result: Ok(ChatThread {
                    chat: Some(closed),
                    messages: vec![message(1, "bye")],
                    comments: Vec::new(),
                }),
            },
        );

        assert!(!core.can_close_focused());
        assert!(core.close_chat(Resolution::Unresolved).is_empty());
        assert_eq!(core.focus(), Some(9));
    }

    #[test]
    fn test_open_chat_can_be_closed_by_admin() {
        let mut core = signed_in(Role::SuperAdmin);
        respond(
            &mut core,
            Origin::User,
            Outcome::ChatsLoaded {
                scope: ChatScope::All { archive: false },
                result: Ok(vec![chat(4, ChatStatus::Active)]),
            },
        );
        core.focus_chat(4);
        assert!(core.can_close_focused());
        assert_eq!(
            requests(&core.close_chat(Resolution::Unresolved)),
            vec![&Request::CloseChat {
                chat_id: 4,
                resolution: Resolution::Unresolved
            }]
        );
    }
}
