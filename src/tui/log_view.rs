//! In-memory log sink and the F2 pane that shows it.
//!
//! While the alternate screen is up, `tracing` output goes into a
//! [`LogBuffer`] instead of stderr. The pane drains it each loop iteration.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tracing_subscriber::fmt::MakeWriter;

/// Lines held between drains. Oldest are dropped beyond this.
const SINK_CAPACITY: usize = 500;

/// Scrollback kept by the pane.
const HISTORY: usize = 1000;

/// Shared, bounded line sink. Cloning shares the storage.
#[derive(Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: String) {
        // A poisoned lock still holds usable lines.
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() >= SINK_CAPACITY {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Take everything buffered so far, oldest first.
    pub fn drain(&self) -> Vec<String> {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.drain(..).collect()
    }
}

/// Per-event writer handed out to the fmt layer. Splits on newlines.
pub struct LineWriter {
    sink: LogBuffer,
    partial: Vec<u8>,
}

impl LineWriter {
    fn emit_complete_lines(&mut self) {
        while let Some(nl) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=nl).collect();
            self.sink
                .push(String::from_utf8_lossy(&line[..nl]).into_owned());
        }
    }
}

impl Write for LineWriter {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.partial.extend_from_slice(bytes);
        self.emit_complete_lines();
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.partial.is_empty() {
            let rest = std::mem::take(&mut self.partial);
            self.sink.push(String::from_utf8_lossy(&rest).into_owned());
        }
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            sink: self.clone(),
            partial: Vec::new(),
        }
    }
}

/// Debug log pane state
pub struct LogPane {
    sink: LogBuffer,
    history: VecDeque<String>,
    pub visible: bool,
    /// Lines scrolled up from the bottom; 0 follows the tail.
    scroll: usize,
}

impl LogPane {
    pub fn new(sink: LogBuffer) -> Self {
        Self {
            sink,
            history: VecDeque::new(),
            visible: false,
            scroll: 0,
        }
    }

    /// Pull new lines out of the sink.
    pub fn refresh(&mut self) {
        for line in self.sink.drain() {
            if self.history.len() >= HISTORY {
                self.history.pop_front();
                self.scroll = self.scroll.saturating_sub(1);
            }
            self.history.push_back(line);
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.scroll = 0;
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scroll = (self.scroll + n).min(self.history.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll = self.scroll.saturating_sub(n);
    }
}

fn level_color(line: &str) -> Color {
    if line.contains("ERROR") {
        Color::Red
    } else if line.contains(" WARN ") {
        Color::Yellow
    } else if line.contains(" INFO ") {
        Color::Green
    } else if line.contains("DEBUG") || line.contains("TRACE") {
        Color::DarkGray
    } else {
        Color::White
    }
}

pub fn render(area: Rect, buf: &mut Buffer, pane: &LogPane) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Debug Log ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    let end = pane.history.len().saturating_sub(pane.scroll);
    let start = end.saturating_sub(inner.height as usize);
    let lines: Vec<Line> = pane
        .history
        .range(start..end)
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(level_color(l)))))
        .collect();
    Paragraph::new(lines).render(inner, buf);
}
