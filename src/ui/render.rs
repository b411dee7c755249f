use super::app::{AppMode, DashboardApp, Focus};
use crate::controller::SearchPhase;
use crate::widgets::{chart_view, news_view, panels_view, suggestions};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

impl DashboardApp {
    pub(super) fn ui(&mut self, f: &mut Frame) {
        let screen = f.area();
        self.layout.screen = screen;

        if self.mode == AppMode::Logs {
            self.layout.dropdown = None;
            self.log_view.render(f, screen);
            return;
        }

        let footer_height = if self.config.display.show_key_hints { 2 } else { 1 };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Search + quote header
                Constraint::Min(0),                // Dashboard body
                Constraint::Length(footer_height), // Status
            ])
            .split(screen);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[0]);

        let searching = self.controller.is_debounce_pending()
            || (self.controller.phase() == SearchPhase::Typing && !self.controller.dropdown_visible());
        self.search_box.render(f, header[0], searching);
        self.layout.search = header[0];
        self.render_quote_header(f, header[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(body[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(self.watchlist_height()), Constraint::Min(0)])
            .split(body[1]);

        chart_view::render(
            f,
            left[0],
            self.orchestrator.chart(),
            self.orchestrator.chart_placeholder(),
        );
        panels_view::render_panels(
            f,
            left[1],
            &self.board,
            self.orchestrator.render_trigger_available(),
        );
        panels_view::render_watchlist(f, right[0], &self.watchlist);
        news_view::render(f, right[1], self.news_feed.as_ref());

        self.render_status(f, rows[2]);

        // Dropdown last so it overlays the body
        self.layout.dropdown = if self.controller.dropdown_visible() {
            let candidates = self.controller.candidates();
            let area = suggestions::dropdown_area(header[0], screen, candidates.len());
            suggestions::render(f, area, candidates, self.controller.highlighted());
            Some(area)
        } else {
            None
        };
    }

    fn watchlist_height(&self) -> u16 {
        // Borders plus header row
        (self.watchlist.len() as u16).saturating_add(3).min(12)
    }

    fn render_quote_header(&self, f: &mut Frame, area: Rect) {
        let glyphs = self.config.display.use_glyphs;
        let content = match self.controller.selection() {
            Some(selection) => {
                let mut spans = vec![
                    Span::styled(
                        selection.display_name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(" {}  ", selection.symbol.prefixed())),
                    Span::styled(self.price_text.clone(), Style::default().fg(Color::Green)),
                ];
                if let Some((abs, pct)) = self.quote_detail.as_ref().and_then(|d| d.change()) {
                    let (color, marker) = match (abs >= 0.0, glyphs) {
                        (true, true) => (Color::Green, "▲"),
                        (false, true) => (Color::Red, "▼"),
                        (true, false) => (Color::Green, "+"),
                        (false, false) => (Color::Red, "-"),
                    };
                    spans.push(Span::styled(
                        format!("  {} {:.2} ({:.2}%)", marker, abs.abs(), pct.abs()),
                        Style::default().fg(color),
                    ));
                }
                let mut lines = vec![Line::from(spans)];
                if let Some(detail) = &self.quote_detail {
                    lines.push(Line::from(Span::styled(
                        detail.summary(),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                lines
            }
            None => vec![Line::from(Span::styled(
                "No ticker selected",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT | Borders::TOP)
                .title("Quote"),
        );
        f.render_widget(paragraph, area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let focus = match self.focus {
            Focus::Search => "SEARCH",
            Focus::Panels => "PANELS",
        };
        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!(" {} ", focus),
                Style::default().bg(Color::Blue).fg(Color::White),
            ),
            Span::raw(" "),
            Span::raw(self.status.as_str()),
        ])];

        if self.config.display.show_key_hints {
            let hints = match self.focus {
                Focus::Search => "Type to search | Up/Down: pick | Enter: select | Tab: panels | F5: logs | Ctrl-C: quit",
                Focus::Panels => "j/k: move | y: copy URL | s: copy share link | r: refresh | /: search | F5: logs | q: quit",
            };
            lines.push(Line::from(Span::styled(
                hints,
                Style::default().fg(Color::DarkGray),
            )));
        }

        f.render_widget(Paragraph::new(lines), area);
    }
}
