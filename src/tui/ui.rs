//! UI rendering for the TUI
//!
//! One entry point dispatches on the core's [`View`].

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{AdminTab, App, Pane};
use super::dialog;
use super::forms;
use super::help;
use super::input::{self, INPUT_HEIGHT};
use super::log_view;
use super::messages::{self, ThreadView, Viewer};
use super::sidebar;
use crate::models::Presence;
use crate::sync::{Level, Session, View};

/// Width of the list column in staff views.
const LIST_WIDTH: u16 = 34;

/// Height of the debug log pane when visible.
const LOG_HEIGHT: u16 = 10;

fn presence_indicator(status: Presence) -> (&'static str, Color) {
    match status {
        Presence::Online => ("\u{25CF} online", Color::Green),
        Presence::Offline => ("\u{25CB} offline", Color::Red),
    }
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let log_visible = app.log.as_ref().is_some_and(|l| l.visible);
    let [header_area, main_area, log_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(if log_visible { LOG_HEIGHT } else { 0 }),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(header_area, frame.buffer_mut(), app);

    match app.core.view() {
        View::Client => render_client(main_area, frame, app),
        View::Login => forms::render_login(
            pad_top(main_area, 2),
            frame,
            &app.login,
            app.core.session().is_authenticating(),
        ),
        View::Operator | View::Admin => render_staff(main_area, frame, app),
    }

    if let Some(log) = app.log.as_ref().filter(|l| l.visible) {
        log_view::render(log_area, frame.buffer_mut(), log);
    }

    render_status(status_area, frame.buffer_mut(), app);

    if let Some(d) = &app.dialog {
        dialog::render(frame, d);
    }
    if app.show_help {
        help::render_help_popup(frame);
    }
}

fn pad_top(area: Rect, n: u16) -> Rect {
    Rect::new(
        area.x,
        area.y + n.min(area.height),
        area.width,
        area.height.saturating_sub(n),
    )
}

fn render_header(area: Rect, buf: &mut Buffer, app: &App) {
    let title = " Support Chat";
    let mut right: Vec<Span> = vec![Span::styled("[F1] Help ", Style::default().fg(Color::Gray))];

    match app.core.session() {
        Session::Operator(me) | Session::Admin(me) => {
            let (symbol, color) = presence_indicator(me.status);
            right.push(Span::styled(format!(" {} ", symbol), Style::default().fg(color)));
            right.push(Span::styled(
                format!(" {} ({}) ", me.username, me.role.label()),
                Style::default().fg(Color::Cyan),
            ));
        }
        Session::Authenticating { username } => right.push(Span::styled(
            format!(" signing in as {}... ", username),
            Style::default().fg(Color::Yellow),
        )),
        Session::Anonymous => right.push(Span::styled(
            " guest ",
            Style::default().fg(Color::Gray),
        )),
    }

    let right_width: usize = right.iter().map(|s| s.content.width()).sum();
    let padding = (area.width as usize).saturating_sub(title.len() + right_width);

    let mut spans = vec![
        Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
    ];
    spans.extend(right);

    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

fn render_status(area: Rect, buf: &mut Buffer, app: &App) {
    if let Some(note) = app.core.notifications().current() {
        let fg = match note.level {
            Level::Info => Color::Green,
            Level::Error => Color::Red,
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", note.text), Style::default().fg(fg)),
            Span::styled(" (Esc)", Style::default().fg(Color::Gray)),
        ]))
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
        return;
    }

    let sep = Span::styled(" | ", Style::default().fg(Color::Gray));
    let mut spans = Vec::new();
    match app.core.view() {
        View::Operator | View::Admin => {
            let focus = match app.core.focus() {
                Some(id) => format!(" chat #{} ", id),
                None => " no chat ".to_string(),
            };
            spans.push(Span::styled(focus, Style::default().fg(Color::Yellow)));
            spans.push(sep.clone());
            spans.push(Span::styled(
                format!("Tab: {}", app.pane.as_str()),
                Style::default().fg(Color::Cyan),
            ));
            if app.core.view() == View::Admin {
                spans.push(sep.clone());
                spans.push(Span::styled(
                    if app.core.archive() { "archive: on" } else { "archive: off" },
                    Style::default().fg(Color::Gray),
                ));
            }
            spans.push(sep.clone());
            spans.push(Span::styled(
                "C-w: close  C-s: status  C-o: sign out",
                Style::default().fg(Color::Gray),
            ));
        }
        View::Client | View::Login => {
            spans.push(Span::styled(
                " Ctrl+L: staff sign-in",
                Style::default().fg(Color::Gray),
            ));
        }
    }
    spans.push(sep);
    spans.push(Span::styled("F2: log  C-c: quit", Style::default().fg(Color::Gray)));

    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray))
        .render(area, buf);
}

fn render_client(area: Rect, frame: &mut Frame, app: &App) {
    if app.core.focus().is_none() {
        forms::render_start_chat(pad_top(area, 2), frame, &app.start);
        return;
    }

    let [thread_area, compose_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(INPUT_HEIGHT)]).areas(area);
    let view = ThreadView {
        chat: app.core.focused_chat(),
        chat_id: app.core.focus(),
        messages: app.core.messages(),
        comments: &[],
        viewer: Viewer::Client,
        with_comments: false,
    };
    messages::render(thread_area, frame.buffer_mut(), &view, false);
    input::render(
        compose_area,
        frame,
        &app.compose,
        "Message",
        "Type a message and press Enter",
        true,
    );
}

fn render_staff(area: Rect, frame: &mut Frame, app: &App) {
    let admin = app.core.view() == View::Admin;
    let [list_area, content_area] =
        Layout::horizontal([Constraint::Length(LIST_WIDTH), Constraint::Fill(1)]).areas(area);

    let list_focused = app.pane == Pane::List && app.dialog.is_none();
    if admin {
        let [tabs_area, list_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(list_area);
        render_tabs(tabs_area, frame.buffer_mut(), app.admin_tab);
        match app.admin_tab {
            AdminTab::Employees => sidebar::render_employees(
                list_area,
                frame.buffer_mut(),
                app.core.employees(),
                app.employee_cursor,
                app.core.identity().map(|me| me.id),
                list_focused,
            ),
            tab => sidebar::render_chats(
                list_area,
                frame.buffer_mut(),
                if tab == AdminTab::Archive { "Archive" } else { "All chats" },
                app.listed_chats().into_iter(),
                app.chat_cursor,
                app.core.focus(),
                list_focused,
            ),
        }
    } else {
        sidebar::render_chats(
            list_area,
            frame.buffer_mut(),
            "My chats",
            app.listed_chats().into_iter(),
            app.chat_cursor,
            app.core.focus(),
            list_focused,
        );
    }

    // Admins annotate but do not reply.
    let mut rows = vec![Constraint::Fill(1)];
    if !admin {
        rows.push(Constraint::Length(INPUT_HEIGHT));
    }
    rows.push(Constraint::Length(INPUT_HEIGHT));
    let areas = Layout::vertical(rows).split(content_area);

    let viewer = match app.core.identity() {
        Some(me) => Viewer::Staff { id: me.id },
        None => Viewer::Client,
    };
    let view = ThreadView {
        chat: app.core.focused_chat(),
        chat_id: app.core.focus(),
        messages: app.core.messages(),
        comments: app.core.comments(),
        viewer,
        with_comments: app.core.focus().is_some(),
    };
    messages::render(areas[0], frame.buffer_mut(), &view, false);

    if !admin {
        input::render(
            areas[1],
            frame,
            &app.compose,
            "Reply",
            "Reply to the client",
            app.pane == Pane::Compose && app.dialog.is_none(),
        );
    }
    input::render(
        areas[areas.len() - 1],
        frame,
        &app.comment,
        "Internal comment",
        "Visible to staff only",
        app.pane == Pane::Comment && app.dialog.is_none(),
    );
}

fn render_tabs(area: Rect, buf: &mut Buffer, active: AdminTab) {
    let tab = |n: &str, label: &str, this: AdminTab| {
        let style = if this == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!(" {} {} ", n, label), style)
    };
    Paragraph::new(Line::from(vec![
        tab("1", "Chats", AdminTab::Chats),
        tab("2", "Archive", AdminTab::Archive),
        tab("3", "Staff", AdminTab::Employees),
    ]))
    .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_anonymous_sees_start_form() {
        let app = App::new(Duration::from_secs(5), None);
        let text = screen_text(&app);
        assert!(text.contains("Contact support"));
        assert!(text.contains("guest"));
    }

    #[test]
    fn test_notification_replaces_status_bar() {
        let mut app = App::new(Duration::from_secs(5), None);
        app.core.notifications_mut().error("Sign-in failed: nope");
        let text = screen_text(&app);
        assert!(text.contains("Sign-in failed: nope"));
    }

    #[test]
    fn test_help_popup_renders() {
        let mut app = App::new(Duration::from_secs(5), None);
        app.show_help = true;
        assert!(screen_text(&app).contains("HELP"));
    }
}
