//! List panes: chats and employees.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::models::{Chat, ChatStatus, Identity, Presence, Resolution};

/// Selection cursor over a list whose length changes under it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListCursor {
    pub selected: usize,
}

impl ListCursor {
    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    /// Keep the cursor inside a list that may have shrunk after a refresh.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// Simple scroll offset: keep selected row visible.
fn scroll_offset(selected: usize, height: usize, total: usize) -> usize {
    if total <= height || selected < height {
        return 0;
    }
    selected
        .saturating_sub(height - 1)
        .min(total.saturating_sub(height))
}

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn status_badge(chat: &Chat) -> (&'static str, Color) {
    match (chat.status, chat.resolution) {
        (ChatStatus::Active, _) => ("active", Color::Green),
        (ChatStatus::Waiting, _) => ("waiting", Color::Yellow),
        (ChatStatus::Closed, Some(Resolution::Resolved)) => ("resolved", Color::DarkGray),
        (ChatStatus::Closed, Some(Resolution::Unresolved)) => ("unresolved", Color::Red),
        (ChatStatus::Closed, None) => ("closed", Color::DarkGray),
    }
}

/// Truncate to `width` display columns.
fn fit(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('\u{2026}');
    out
}

/// Write one row: label on the left, badge right-aligned.
fn render_row(buf: &mut Buffer, area: Rect, label: &str, badge: Span<'_>, selected: bool) {
    let w = area.width as usize;
    let badge_w = badge.content.width();
    let label = fit(label, w.saturating_sub(badge_w + 1));
    let pad = w.saturating_sub(label.width() + badge_w);
    let style = row_style(selected);

    let badge = if selected {
        badge.patch_style(Style::default().bg(Color::DarkGray))
    } else {
        badge
    };

    Paragraph::new(Line::from(vec![
        Span::styled(label, style),
        Span::styled(" ".repeat(pad), style),
        badge,
    ]))
    .render(area, buf);
}

fn render_placeholder(buf: &mut Buffer, inner: Rect, text: &str) {
    if inner.height == 0 || inner.width == 0 {
        return;
    }
    Paragraph::new(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(Color::DarkGray),
    )))
    .render(Rect::new(inner.x, inner.y, inner.width, 1), buf);
}

/// Render a chat list. `focus` marks the chat whose thread is open.
pub fn render_chats<'a>(
    area: Rect,
    buf: &mut Buffer,
    title: &str,
    chats: impl Iterator<Item = &'a Chat>,
    cursor: ListCursor,
    focus: Option<i64>,
    focused: bool,
) {
    let block = pane_block(title, focused);
    let inner = block.inner(area);
    block.render(area, buf);

    let chats: Vec<&Chat> = chats.collect();
    if chats.is_empty() {
        render_placeholder(buf, inner, "No chats");
        return;
    }

    let height = inner.height as usize;
    let offset = scroll_offset(cursor.selected, height, chats.len());
    for (row, idx) in (offset..chats.len()).take(height).enumerate() {
        let chat = chats[idx];
        let selected = idx == cursor.selected && focused;
        let marker = if focus == Some(chat.id) { "\u{25BA}" } else { " " };
        let label = format!("{}#{} {}", marker, chat.id, chat.client_name);
        let (badge, color) = status_badge(chat);
        render_row(
            buf,
            Rect::new(inner.x, inner.y + row as u16, inner.width, 1),
            &label,
            Span::styled(format!("{} ", badge), Style::default().fg(color)),
            selected,
        );
    }
}

/// Render the employee list. `me` is the signed-in user's id.
pub fn render_employees(
    area: Rect,
    buf: &mut Buffer,
    employees: &[Identity],
    cursor: ListCursor,
    me: Option<i64>,
    focused: bool,
) {
    let block = pane_block("Employees", focused);
    let inner = block.inner(area);
    block.render(area, buf);

    if employees.is_empty() {
        render_placeholder(buf, inner, "Loading...");
        return;
    }

    let height = inner.height as usize;
    let offset = scroll_offset(cursor.selected, height, employees.len());
    for (row, idx) in (offset..employees.len()).take(height).enumerate() {
        let user = &employees[idx];
        let (dot, color) = match user.status {
            Presence::Online => ("\u{25CF} online ", Color::Green),
            Presence::Offline => ("\u{25CB} offline ", Color::DarkGray),
        };
        let you = if me == Some(user.id) { " (you)" } else { "" };
        let label = format!(" {}{} \u{00B7} {}", user.username, you, user.role.label());
        render_row(
            buf,
            Rect::new(inner.x, inner.y + row as u16, inner.width, 1),
            &label,
            Span::styled(dot, Style::default().fg(color)),
            idx == cursor.selected && focused,
        );
    }
}
