//! Modal dialogs drawn over the main view.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::forms::{self, EmployeeForm};

#[derive(Debug)]
pub enum Dialog {
    /// Pick a resolution for the focused chat.
    CloseChat { chat_id: i64 },
    AddEmployee(EmployeeForm),
}

/// Return a centered sub-rect of the given size within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn popup_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            " Esc to cancel ",
            Style::default().fg(Color::Gray),
        )))
}

pub fn render(frame: &mut Frame, dialog: &Dialog) {
    match dialog {
        Dialog::CloseChat { chat_id } => {
            let area = centered_rect(44, 7, frame.area());
            frame.render_widget(Clear, area);
            let block = popup_block(&format!("Close chat #{}", chat_id));
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let key = Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD);
            let lines = vec![
                Line::from(" How did it end?"),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  r ", key),
                    Span::raw("resolved"),
                ]),
                Line::from(vec![
                    Span::styled("  u ", key),
                    Span::raw("unresolved"),
                ]),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
        }
        Dialog::AddEmployee(form) => {
            let area = centered_rect(50, 12, frame.area());
            frame.render_widget(Clear, area);
            let block = popup_block("Add employee");
            let inner = block.inner(area);
            frame.render_widget(block, area);
            forms::render_employee(inner, frame, form);
        }
    }
}
