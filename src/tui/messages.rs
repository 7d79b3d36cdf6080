//! Thread pane: the focused chat's messages, with staff comments below.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::models::{display_time, Chat, Comment, Message, SenderType};

/// Whose eyes the thread is rendered for. Decides labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Client,
    Staff { id: i64 },
}

/// Everything the thread pane shows.
pub struct ThreadView<'a> {
    pub chat: Option<&'a Chat>,
    pub chat_id: Option<i64>,
    pub messages: &'a [Message],
    pub comments: &'a [Comment],
    pub viewer: Viewer,
    /// Show the comments section (staff only)
    pub with_comments: bool,
}

fn sender_label(msg: &Message, viewer: Viewer) -> (String, Color) {
    match (msg.sender_type, viewer) {
        (SenderType::Client, Viewer::Client) => ("You".into(), Color::Cyan),
        (SenderType::Client, Viewer::Staff { .. }) => ("Client".into(), Color::Yellow),
        (SenderType::Operator, Viewer::Staff { id }) if msg.sender_id == Some(id) => {
            ("You".into(), Color::Cyan)
        }
        (SenderType::Operator, _) => ("Operator".into(), Color::Green),
    }
}

fn message_lines(view: &ThreadView<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for msg in view.messages {
        let (who, color) = sender_label(msg, view.viewer);
        lines.push(Line::from(vec![
            Span::styled(
                who,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", display_time(msg.created_at.as_deref())),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for text in msg.message.lines() {
            lines.push(Line::from(Span::raw(format!("  {}", text))));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn comment_lines(comments: &[Comment]) -> Vec<Line<'static>> {
    comments
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled(
                    c.username.clone().unwrap_or_else(|| "staff".into()),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", display_time(c.created_at.as_deref())),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(c.comment.clone()),
            ])
        })
        .collect()
}

fn header_text(view: &ThreadView<'_>) -> String {
    match (view.chat, view.chat_id) {
        (Some(chat), _) => {
            let mut s = format!("#{} {}", chat.id, chat.client_name);
            if !chat.client_email.is_empty() {
                s.push_str(&format!(" <{}>", chat.client_email));
            }
            if let Some(op) = &chat.operator_name {
                s.push_str(&format!(" \u{00B7} {}", op));
            }
            if let Some(res) = chat.resolution {
                s.push_str(&format!(" \u{00B7} closed ({})", res.as_str()));
            }
            s
        }
        (None, Some(id)) => format!("#{}", id),
        (None, None) => "No chat selected".into(),
    }
}

/// Number of wrapped rows `lines` occupy at `width`, roughly.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = width.max(1) as usize;
    lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(width) as u16)
        .sum()
}

/// Render the thread, scrolled to the newest message.
pub fn render(area: Rect, buf: &mut Buffer, view: &ThreadView<'_>, focused: bool) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style);

    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height < 2 || inner.width == 0 {
        return;
    }

    let [header_area, body_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    Paragraph::new(Line::from(Span::styled(
        format!(" {} ", header_text(view)),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(Color::DarkGray))
    .render(header_area, buf);

    let (messages_area, comments_area) = if view.with_comments {
        let [m, c] =
            Layout::vertical([Constraint::Fill(2), Constraint::Fill(1)]).areas(body_area);
        (m, Some(c))
    } else {
        (body_area, None)
    };

    let lines = message_lines(view);
    if lines.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            if view.chat_id.is_some() {
                " No messages yet"
            } else {
                " Select a chat"
            },
            Style::default().fg(Color::DarkGray),
        )))
        .render(messages_area, buf);
    } else {
        let total = wrapped_height(&lines, messages_area.width);
        let scroll = total.saturating_sub(messages_area.height);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(messages_area, buf);
    }

    if let Some(area) = comments_area {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                format!(" Comments ({}) ", view.comments.len()),
                Style::default().fg(Color::Magenta),
            ));
        let inner = block.inner(area);
        block.render(area, buf);
        let lines = comment_lines(view.comments);
        let total = wrapped_height(&lines, inner.width);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((total.saturating_sub(inner.height), 0))
            .render(inner, buf);
    }
}
