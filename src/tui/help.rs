//! Help popup overlay: keyboard shortcuts grouped by category.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::dialog::centered_rect;

const POPUP_WIDTH: u16 = 80;
const POPUP_HEIGHT: u16 = 24;

/// (key, description)
type Shortcut = (&'static str, &'static str);

struct Category {
    title: &'static str,
    shortcuts: &'static [Shortcut],
}

const GENERAL: Category = Category {
    title: "GENERAL",
    shortcuts: &[
        ("F1 / ?", "Toggle this help"),
        ("F2", "Toggle debug log"),
        ("Esc", "Dismiss notification / back"),
        ("Ctrl+C", "Quit"),
    ],
};

const NAVIGATION: Category = Category {
    title: "NAVIGATION",
    shortcuts: &[
        ("Tab", "Next pane or field"),
        ("Up/Down", "Move in list"),
        ("Enter", "Open chat / submit"),
        ("1 2 3", "Admin: chats, archive, employees"),
    ],
};

const CHAT: Category = Category {
    title: "CHAT",
    shortcuts: &[
        ("Enter", "Send message or comment"),
        ("Ctrl+W", "Close chat (resolution)"),
        ("Ctrl+U", "Clear input"),
    ],
};

const ACCOUNT: Category = Category {
    title: "ACCOUNT",
    shortcuts: &[
        ("Ctrl+L", "Staff sign-in screen"),
        ("Ctrl+S", "Toggle own online status"),
        ("Ctrl+O", "Sign out"),
        ("v", "Admin: toggle archive"),
        ("s", "Admin: toggle employee status"),
        ("a", "Admin: add employee"),
    ],
};

fn column_lines(categories: &[&Category]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, cat) in categories.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            cat.title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "\u{2500}".repeat(34),
            Style::default().fg(Color::DarkGray),
        )));
        for (key, desc) in cat.shortcuts {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", key), Style::default().fg(Color::Yellow)),
                Span::styled(*desc, Style::default().fg(Color::Gray)),
            ]));
        }
    }
    lines
}

/// Inset a rect by one cell on every side.
fn inset(area: Rect) -> Rect {
    Rect::new(
        area.x + 1,
        area.y + 1,
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

pub fn render_help_popup(frame: &mut Frame) {
    let popup = centered_rect(POPUP_WIDTH, POPUP_HEIGHT, frame.area());
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " HELP ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            " Press any key to close ",
            Style::default().fg(Color::Gray),
        )));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
    frame.render_widget(
        Paragraph::new(column_lines(&[&GENERAL, &NAVIGATION])),
        inset(left),
    );
    frame.render_widget(Paragraph::new(column_lines(&[&CHAT, &ACCOUNT])), inset(right));
}
