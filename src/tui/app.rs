//! TUI application state and main event loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;

use super::dialog::Dialog;
use super::forms::{EmployeeForm, LoginForm, StartChatForm};
use super::input::InputField;
use super::log_view::{LogBuffer, LogPane};
use super::sidebar::ListCursor;
use super::ui;
use crate::api::{Gateway, GatewayClient};
use crate::config::Config;
use crate::models::{Chat, Resolution};
use crate::sync::{Backend, BackendCommand, BackendResponse, PollScheduler, SyncCore, View};

/// Upper bound between redraws when nothing else happens.
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// How long to wait for the sign-out write on exit.
const FAREWELL_TIMEOUT: Duration = Duration::from_secs(2);

/// Active pane in staff views
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    #[default]
    List,
    Compose,
    Comment,
}

impl Pane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pane::List => "list",
            Pane::Compose => "reply",
            Pane::Comment => "comment",
        }
    }
}

/// Which list the admin view shows
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Chats,
    Archive,
    Employees,
}

/// Application state
pub struct App {
    pub core: SyncCore,
    pub pane: Pane,
    pub admin_tab: AdminTab,
    pub chat_cursor: ListCursor,
    pub employee_cursor: ListCursor,
    pub compose: InputField,
    pub comment: InputField,
    pub login: LoginForm,
    pub start: StartChatForm,
    pub dialog: Option<Dialog>,
    pub show_help: bool,
    pub log: Option<LogPane>,
    pub should_exit: bool,
    last_view: View,
}

/// Apply an editing key to a text field. Returns false if the key is not
/// an editing key.
fn edit(field: &mut InputField, key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => field.clear(),
        KeyCode::Char(c) if !ctrl => field.insert_char(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.move_home(),
        KeyCode::End => field.move_end(),
        _ => return false,
    }
    true
}

fn ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

impl App {
    pub fn new(notification_ttl: Duration, log: Option<LogPane>) -> Self {
        let core = SyncCore::new(notification_ttl);
        let last_view = core.view();
        Self {
            core,
            pane: Pane::List,
            admin_tab: AdminTab::Chats,
            chat_cursor: ListCursor::default(),
            employee_cursor: ListCursor::default(),
            compose: InputField::default(),
            comment: InputField::default(),
            login: LoginForm::default(),
            start: StartChatForm::default(),
            dialog: None,
            show_help: false,
            log,
            should_exit: false,
            last_view,
        }
    }

    /// Chats shown in the current list, in display order.
    pub fn listed_chats(&self) -> Vec<&Chat> {
        match (self.core.view(), self.admin_tab) {
            (View::Admin, AdminTab::Archive) => self.core.archived_chats().collect(),
            (View::Admin, AdminTab::Employees) => Vec::new(),
            _ => self.core.chats().iter().collect(),
        }
    }

    /// Per-iteration housekeeping: expiry, log drain, cursor bounds.
    pub fn tick(&mut self, now: Instant) {
        self.core.expire_notifications(now);
        if let Some(log) = self.log.as_mut() {
            log.refresh();
        }
        let chats = self.listed_chats().len();
        self.chat_cursor.clamp(chats);
        self.employee_cursor.clamp(self.core.employees().len());

        let view = self.core.view();
        if view != self.last_view {
            tracing::debug!("View {:?} -> {:?}", self.last_view, view);
            self.last_view = view;
            self.pane = Pane::List;
            self.admin_tab = AdminTab::Chats;
            self.dialog = None;
            self.chat_cursor = ListCursor::default();
            self.employee_cursor = ListCursor::default();
        }
    }

    pub fn apply(&mut self, response: BackendResponse) -> Vec<BackendCommand> {
        self.core.apply(response)
    }

    /// Handle one key press. Returns the requests it triggered.
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        if ctrl(&key, 'c') || ctrl(&key, 'q') {
            self.should_exit = true;
            return Vec::new();
        }
        if self.show_help {
            self.show_help = false;
            return Vec::new();
        }
        match key.code {
            KeyCode::F(1) => {
                self.show_help = true;
                return Vec::new();
            }
            KeyCode::F(2) => {
                if let Some(log) = self.log.as_mut() {
                    log.toggle();
                }
                return Vec::new();
            }
            KeyCode::PageUp | KeyCode::PageDown if self.log_visible() => {
                if let Some(log) = self.log.as_mut() {
                    if key.code == KeyCode::PageUp {
                        log.scroll_up(10);
                    } else {
                        log.scroll_down(10);
                    }
                }
                return Vec::new();
            }
            _ => {}
        }

        if self.dialog.is_some() {
            return self.handle_dialog_key(key);
        }

        if key.code == KeyCode::Esc && self.core.notifications_mut().dismiss() {
            return Vec::new();
        }

        match self.core.view() {
            View::Client => self.handle_client_key(key),
            View::Login => self.handle_login_key(key),
            View::Operator | View::Admin => self.handle_staff_key(key),
        }
    }

    fn log_visible(&self) -> bool {
        self.log.as_ref().is_some_and(|l| l.visible)
    }

    fn handle_client_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        if ctrl(&key, 'l') {
            self.core.show_login();
            return Vec::new();
        }

        if self.core.focus().is_some() {
            if key.code == KeyCode::Enter {
                let text = self.compose.take();
                return self.core.send_message(&text);
            }
            edit(&mut self.compose, &key);
            return Vec::new();
        }

        match key.code {
            KeyCode::Tab => self.start.next_field(),
            KeyCode::Enter => {
                let (name, email) = self.start.submit();
                return self.core.start_chat(&name, &email);
            }
            _ => {
                edit(self.start.active(), &key);
            }
        }
        Vec::new()
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        if self.core.session().is_authenticating() {
            return Vec::new();
        }
        match key.code {
            KeyCode::Esc => self.core.show_client(),
            KeyCode::Tab => self.login.next_field(),
            KeyCode::Enter => {
                let (username, password) = self.login.submit();
                return self.core.submit_login(&username, &password);
            }
            _ => {
                edit(self.login.active(), &key);
            }
        }
        Vec::new()
    }

    fn handle_staff_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        let admin = self.core.view() == View::Admin;

        if ctrl(&key, 'o') {
            return self.core.logout();
        }
        if ctrl(&key, 's') {
            return match self.core.identity().map(|me| me.id) {
                Some(id) => self.core.toggle_status(id),
                None => Vec::new(),
            };
        }
        if ctrl(&key, 'w') {
            match self.core.focus() {
                Some(chat_id) if self.core.can_close_focused() => {
                    self.dialog = Some(Dialog::CloseChat { chat_id });
                }
                Some(_) => self.core.notifications_mut().info("Chat is already closed"),
                None => {}
            }
            return Vec::new();
        }
        if key.code == KeyCode::Tab {
            self.pane = match (self.pane, admin) {
                (Pane::List, false) => Pane::Compose,
                (Pane::List, true) => Pane::Comment,
                (Pane::Compose, _) => Pane::Comment,
                (Pane::Comment, _) => Pane::List,
            };
            return Vec::new();
        }
        if key.code == KeyCode::Esc {
            self.pane = Pane::List;
            return Vec::new();
        }

        match self.pane {
            Pane::List => self.handle_list_key(key, admin),
            Pane::Compose => {
                if key.code == KeyCode::Enter {
                    let text = self.compose.take();
                    return self.core.send_message(&text);
                }
                edit(&mut self.compose, &key);
                Vec::new()
            }
            Pane::Comment => {
                if key.code == KeyCode::Enter {
                    let text = self.comment.take();
                    return self.core.add_comment(&text);
                }
                edit(&mut self.comment, &key);
                Vec::new()
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent, admin: bool) -> Vec<BackendCommand> {
        if admin {
            match key.code {
                KeyCode::Char('1') => {
                    self.admin_tab = AdminTab::Chats;
                    return Vec::new();
                }
                KeyCode::Char('2') => {
                    self.admin_tab = AdminTab::Archive;
                    // The archive view filters the archive-inclusive list.
                    if !self.core.archive() {
                        return self.core.toggle_archive();
                    }
                    return Vec::new();
                }
                KeyCode::Char('3') => {
                    self.admin_tab = AdminTab::Employees;
                    return Vec::new();
                }
                KeyCode::Char('v') => return self.core.toggle_archive(),
                _ => {}
            }
        }

        if key.code == KeyCode::Char('?') {
            self.show_help = true;
            return Vec::new();
        }

        if admin && self.admin_tab == AdminTab::Employees {
            let len = self.core.employees().len();
            match key.code {
                KeyCode::Up => self.employee_cursor.move_up(),
                KeyCode::Down => self.employee_cursor.move_down(len),
                KeyCode::Char('s') => {
                    let id = self
                        .core
                        .employees()
                        .get(self.employee_cursor.selected)
                        .map(|e| e.id);
                    if let Some(id) = id {
                        return self.core.toggle_status(id);
                    }
                }
                KeyCode::Char('a') => {
                    self.dialog = Some(Dialog::AddEmployee(EmployeeForm::default()));
                }
                _ => {}
            }
            return Vec::new();
        }

        let len = self.listed_chats().len();
        match key.code {
            KeyCode::Up => self.chat_cursor.move_up(),
            KeyCode::Down => self.chat_cursor.move_down(len),
            KeyCode::Enter => {
                let id = self
                    .listed_chats()
                    .get(self.chat_cursor.selected)
                    .map(|c| c.id);
                if let Some(id) = id {
                    return self.core.focus_chat(id);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Vec<BackendCommand> {
        if key.code == KeyCode::Esc {
            self.dialog = None;
            return Vec::new();
        }
        match self.dialog.as_mut() {
            Some(Dialog::CloseChat { .. }) => {
                let resolution = match key.code {
                    KeyCode::Char('r') => Resolution::Resolved,
                    KeyCode::Char('u') => Resolution::Unresolved,
                    _ => return Vec::new(),
                };
                self.dialog = None;
                self.core.close_chat(resolution)
            }
            Some(Dialog::AddEmployee(form)) => match key.code {
                KeyCode::Tab => {
                    form.next_field();
                    Vec::new()
                }
                KeyCode::Enter => {
                    let cmds = self.submit_employee();
                    if !cmds.is_empty() {
                        self.dialog = None;
                    }
                    cmds
                }
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right if form.field == 2 => {
                    form.toggle_role();
                    Vec::new()
                }
                _ => {
                    if let Some(field) = form.active() {
                        edit(field, &key);
                    }
                    Vec::new()
                }
            },
            None => Vec::new(),
        }
    }

    fn submit_employee(&mut self) -> Vec<BackendCommand> {
        let Some(Dialog::AddEmployee(form)) = self.dialog.as_mut() else {
            return Vec::new();
        };
        let username = form.username.text().to_string();
        let password = form.password.text().to_string();
        let role = form.role;
        self.core.create_employee(&username, &password, role)
    }
}

/// Run the TUI until the user quits.
///
/// Everything happens on one task: terminal events, backend completions and
/// poll ticks are multiplexed by a single `select!`.
pub async fn run(config: &Config, logs: LogBuffer) -> Result<()> {
    let gateway: Arc<dyn Gateway> =
        Arc::new(GatewayClient::from_config(config).context("building gateway client")?);
    let mut backend = Backend::start(gateway);
    let mut app = App::new(config.notification_ttl(), Some(LogPane::new(logs)));
    let mut scheduler = PollScheduler::new(config.poll_interval(), app.core.poll_key());
    tracing::info!("Polling every {}s", scheduler.period().as_secs());

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &mut app, &mut backend, &mut scheduler).await;
    ratatui::restore();

    // Best effort: do not leave a staff member shown online.
    if let Some(user_id) = app.core.identity().map(|me| me.id) {
        backend.send_all(app.core.logout());
        match tokio::time::timeout(FAREWELL_TIMEOUT, backend.recv_status(user_id)).await {
            Ok(Some(Ok(()))) => tracing::info!("Marked user {} offline", user_id),
            Ok(Some(Err(e))) => tracing::warn!("Could not mark user offline on exit: {}", e),
            Ok(None) => tracing::warn!("Backend closed before the offline write finished"),
            Err(_) => tracing::warn!("Timed out marking user offline on exit"),
        }
    }

    result
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    backend: &mut Backend,
    scheduler: &mut PollScheduler,
) -> Result<()> {
    let mut events = EventStream::new();

    while !app.should_exit {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    backend.send_all(app.handle_key(key));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("reading terminal events"),
                None => break,
            },
            Some(response) = backend.recv() => {
                backend.send_all(app.apply(response));
            }
            _ = scheduler.tick() => {
                backend.send_all(app.core.poll());
            }
            _ = tokio::time::sleep(REDRAW_INTERVAL) => {}
        }

        scheduler.sync_key(app.core.poll_key());
    }

    Ok(())
}
