//! Single-line text input used by the compose box and every form field.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Height of a bordered input: border + text + border.
pub const INPUT_HEIGHT: u16 = 3;

/// Editable text with a character-based cursor.
#[derive(Debug, Default, Clone)]
pub struct InputField {
    text: String,
    /// Cursor position (character offset into `text`).
    cursor: usize,
    /// Render as bullets (passwords).
    masked: bool,
}

impl InputField {
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let end = self.byte_offset(self.cursor);
        let start = self.byte_offset(self.cursor - 1);
        self.text.drain(start..end);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let start = self.byte_offset(self.cursor);
            let end = self.byte_offset(self.cursor + 1);
            self.text.drain(start..end);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Take the contents and leave the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn byte_offset(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Characters as shown on screen.
    fn shown(&self) -> Vec<char> {
        if self.masked {
            vec!['\u{2022}'; self.text.chars().count()]
        } else {
            self.text.chars().collect()
        }
    }
}

/// Visible slice of a field and the cursor column within it.
struct Visible {
    text: String,
    cursor_col: usize,
}

/// Scroll horizontally so the cursor stays inside `width` columns.
fn visible_window(chars: &[char], cursor: usize, width: usize) -> Visible {
    if width == 0 {
        return Visible {
            text: String::new(),
            cursor_col: 0,
        };
    }

    let col = |c: &char| c.width().unwrap_or(0);
    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(col).sum();
    while cursor_col >= width && start < cursor {
        cursor_col -= col(&chars[start]);
        start += 1;
    }

    let mut used = 0;
    let mut text = String::new();
    for c in &chars[start..] {
        let w = col(c);
        if used + w > width {
            break;
        }
        used += w;
        text.push(*c);
    }

    Visible { text, cursor_col }
}

/// Render a bordered input box titled `label`.
///
/// Sets the terminal cursor when `focused`.
pub fn render(
    area: Rect,
    frame: &mut Frame,
    field: &InputField,
    label: &str,
    placeholder: &str,
    focused: bool,
) {
    let (border_style, border_type) = if focused {
        (Style::default().fg(Color::Yellow), BorderType::Double)
    } else {
        (Style::default().fg(Color::DarkGray), BorderType::Plain)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", label), border_style));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width < 2 {
        return;
    }

    let line_area = Rect::new(inner.x, inner.y, inner.width, 1);
    let avail = inner.width.saturating_sub(1) as usize;

    if field.text.is_empty() {
        let hint: String = placeholder.chars().take(avail).collect();
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", hint),
                Style::default().fg(Color::DarkGray),
            ))),
            line_area,
        );
        if focused {
            frame.set_cursor_position((line_area.x + 1, line_area.y));
        }
        return;
    }

    let chars = field.shown();
    let visible = visible_window(&chars, field.cursor, avail);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", visible.text),
            Style::default().fg(Color::White),
        ))),
        line_area,
    );
    if focused {
        frame.set_cursor_position((line_area.x + 1 + visible.cursor_col as u16, line_area.y));
    }
}
