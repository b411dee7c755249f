//! Scrollable view over the in-memory log buffer (F5)

use crate::utils::logging::{get_log_buffer, LogEntry};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const MAX_VISIBLE_ENTRIES: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub enum LogViewAction {
    None,
    Exit,
}

#[derive(Default)]
pub struct LogView {
    scroll_offset: u16,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> LogViewAction {
        match key.code {
            KeyCode::Esc | KeyCode::F(5) | KeyCode::Char('q') => LogViewAction::Exit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                LogViewAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                LogViewAction::None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                LogViewAction::None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                LogViewAction::None
            }
            KeyCode::End => {
                self.scroll_offset = 0;
                LogViewAction::None
            }
            _ => LogViewAction::None,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let entries = get_log_buffer()
            .map(|buffer| buffer.get_recent(MAX_VISIBLE_ENTRIES))
            .unwrap_or_default();

        let lines: Vec<Line> = entries.iter().map(entry_line).collect();

        // Offset counts back from the newest entry
        let visible = area.height.saturating_sub(2);
        let total = lines.len() as u16;
        let bottom = total.saturating_sub(visible);
        let scroll = bottom.saturating_sub(self.scroll_offset);

        let title = format!("Logs ({} entries) - Esc to close", entries.len());
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((scroll, 0));
        f.render_widget(paragraph, area);
    }
}

fn entry_line(entry: &LogEntry) -> Line<'_> {
    let color = match entry.level.as_str() {
        "ERROR" => Color::Red,
        "WARN" => Color::Yellow,
        "INFO" => Color::Green,
        _ => Color::DarkGray,
    };
    Line::from(vec![
        Span::styled(entry.timestamp.as_str(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(format!("{:5}", entry.level), Style::default().fg(color)),
        Span::styled(format!(" [{}] ", entry.target), Style::default().fg(Color::Cyan)),
        Span::raw(entry.message.as_str()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_scroll_is_clamped_at_newest() {
        let mut view = LogView::new();
        view.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(view.scroll_offset, 0);
        view.handle_key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
        assert_eq!(view.scroll_offset, 10);
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            LogViewAction::Exit
        );
    }
}
