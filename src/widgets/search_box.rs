//! Ticker search box
//!
//! Wraps a tui_input field and translates keys into actions. The debounce
//! timer itself lives in the search controller so it can be driven by an
//! explicit clock in tests.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

/// Result of handling a key in the search box
#[derive(Debug, Clone, PartialEq)]
pub enum SearchBoxAction {
    /// Nothing changed
    Continue,
    /// Text changed; hand it to the controller
    InputChanged(String),
    /// Enter pressed
    Confirm,
    /// Esc pressed
    Cancel,
    HighlightNext,
    HighlightPrev,
    /// Not ours; let the app handle it
    PassThrough,
}

#[derive(Debug, Clone)]
pub struct SearchBoxConfig {
    pub title: String,
    pub placeholder: String,
    pub style: Style,
    pub show_typing_indicator: bool,
}

impl Default for SearchBoxConfig {
    fn default() -> Self {
        Self {
            title: "Search NSE/BSE".to_string(),
            placeholder: "Type a company name or ticker...".to_string(),
            style: Style::default().fg(Color::Yellow),
            show_typing_indicator: true,
        }
    }
}

pub struct SearchBox {
    input: Input,
    config: SearchBoxConfig,
    focused: bool,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self::with_config(SearchBoxConfig::default())
    }

    pub fn with_config(config: SearchBoxConfig) -> Self {
        Self {
            input: Input::default(),
            config,
            focused: true,
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Replace the text, e.g. with the chosen company name
    pub fn set_value(&mut self, value: &str) {
        self.input = Input::default().with_value(value.to_string());
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SearchBoxAction {
        if !self.focused {
            return SearchBoxAction::PassThrough;
        }

        match key.code {
            KeyCode::Esc => SearchBoxAction::Cancel,
            KeyCode::Enter => SearchBoxAction::Confirm,
            KeyCode::Down => SearchBoxAction::HighlightNext,
            KeyCode::Up => SearchBoxAction::HighlightPrev,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::F(_) => SearchBoxAction::PassThrough,
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                // Ctrl-U clears, every other chord belongs to the app
                if key.code == KeyCode::Char('u') {
                    self.input.reset();
                    return SearchBoxAction::InputChanged(String::new());
                }
                SearchBoxAction::PassThrough
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() != before {
                    SearchBoxAction::InputChanged(self.input.value().to_string())
                } else {
                    SearchBoxAction::Continue
                }
            }
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, searching: bool) {
        let title = if self.config.show_typing_indicator && searching {
            format!("{} (searching...)", self.config.title)
        } else {
            self.config.title.clone()
        };

        let border_style = if self.focused {
            self.config.style
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let content = if self.input.value().is_empty() && !self.focused {
            Line::from(Span::styled(
                self.config.placeholder.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
        } else {
            Line::from(self.input.value().to_string())
        };

        f.render_widget(Paragraph::new(content).block(block), area);

        if self.focused {
            let width = area.width.saturating_sub(2);
            let cursor = (self.input.visual_cursor() as u16).min(width.saturating_sub(1));
            f.set_cursor_position((area.x + cursor + 1, area.y + 1));
        }
    }
}
