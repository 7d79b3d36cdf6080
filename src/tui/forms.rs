//! Multi-field forms: staff login, client chat start, new employee.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::input::{self, InputField, INPUT_HEIGHT};
use crate::models::Role;

/// Staff sign-in form
#[derive(Debug)]
pub struct LoginForm {
    pub username: InputField,
    pub password: InputField,
    /// 0 = username, 1 = password
    pub field: usize,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: InputField::default(),
            password: InputField::masked(),
            field: 0,
        }
    }
}

impl LoginForm {
    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % 2;
    }

    pub fn active(&mut self) -> &mut InputField {
        match self.field {
            0 => &mut self.username,
            _ => &mut self.password,
        }
    }

    /// Submit: hand back the credentials and wipe the password.
    pub fn submit(&mut self) -> (String, String) {
        self.field = 0;
        (self.username.text().to_string(), self.password.take())
    }
}

/// Anonymous client's "start a chat" form
#[derive(Debug, Default)]
pub struct StartChatForm {
    pub name: InputField,
    pub email: InputField,
    /// 0 = name, 1 = email
    pub field: usize,
}

impl StartChatForm {
    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % 2;
    }

    pub fn active(&mut self) -> &mut InputField {
        match self.field {
            0 => &mut self.name,
            _ => &mut self.email,
        }
    }

    pub fn submit(&mut self) -> (String, String) {
        self.field = 0;
        (self.name.take(), self.email.take())
    }
}

/// Admin's new employee form. Role is toggled, not typed.
#[derive(Debug)]
pub struct EmployeeForm {
    pub username: InputField,
    pub password: InputField,
    pub role: Role,
    /// 0 = username, 1 = password, 2 = role
    pub field: usize,
}

impl Default for EmployeeForm {
    fn default() -> Self {
        Self {
            username: InputField::default(),
            password: InputField::masked(),
            role: Role::Operator,
            field: 0,
        }
    }
}

impl EmployeeForm {
    pub fn next_field(&mut self) {
        self.field = (self.field + 1) % 3;
    }

    /// The text field under the cursor, or None on the role selector.
    pub fn active(&mut self) -> Option<&mut InputField> {
        match self.field {
            0 => Some(&mut self.username),
            1 => Some(&mut self.password),
            _ => None,
        }
    }

    pub fn toggle_role(&mut self) {
        self.role = match self.role {
            Role::Operator => Role::SuperAdmin,
            Role::SuperAdmin => Role::Operator,
        };
    }
}

fn title_line(text: &str) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
}

fn hint_line(text: &str) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    )))
}

/// Centered column of at most `width` cells.
fn column(area: Rect, width: u16) -> Rect {
    let w = width.min(area.width);
    Rect::new(area.x + (area.width - w) / 2, area.y, w, area.height)
}

pub fn render_login(area: Rect, frame: &mut Frame, form: &LoginForm, busy: bool) {
    let area = column(area, 50);
    let [title, _, user, pass, hint] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(2),
    ])
    .areas(area);

    frame.render_widget(title_line("Staff sign-in"), title);
    input::render(user, frame, &form.username, "Username", "", !busy && form.field == 0);
    input::render(pass, frame, &form.password, "Password", "", !busy && form.field == 1);
    let hint_text = if busy {
        "Signing in..."
    } else {
        "Tab: next field  Enter: sign in  Esc: back to client chat"
    };
    frame.render_widget(hint_line(hint_text), hint);
}

pub fn render_start_chat(area: Rect, frame: &mut Frame, form: &StartChatForm) {
    let area = column(area, 50);
    let [title, _, name, email, hint] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(2),
    ])
    .areas(area);

    frame.render_widget(title_line("Contact support"), title);
    input::render(name, frame, &form.name, "Your name", "Anonymous", form.field == 0);
    input::render(email, frame, &form.email, "Email", "optional", form.field == 1);
    frame.render_widget(
        hint_line("Tab: next field  Enter: start chat  Ctrl+L: staff sign-in"),
        hint,
    );
}

/// Body of the add-employee dialog.
pub fn render_employee(area: Rect, frame: &mut Frame, form: &EmployeeForm) {
    let [user, pass, role, hint] = Layout::vertical([
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    input::render(user, frame, &form.username, "Username", "", form.field == 0);
    input::render(pass, frame, &form.password, "Password", "", form.field == 1);

    let selector_style = if form.field == 2 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" Role: "),
            Span::styled(format!("< {} >", form.role.label()), selector_style),
        ])),
        role,
    );
    frame.render_widget(
        hint_line(" Tab: next  Space: change role  Enter: create"),
        hint,
    );
}
