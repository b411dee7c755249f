//! Suggestion dropdown under the search box

use crate::quote::format_price;
use crate::resolver::Candidate;
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

/// Where the dropdown lands for `count` rows anchored under `search_area`
pub fn dropdown_area(search_area: Rect, bounds: Rect, count: usize) -> Rect {
    let height = (count as u16).saturating_add(2);
    let y = search_area.y.saturating_add(search_area.height);
    let available = bounds.y.saturating_add(bounds.height).saturating_sub(y);
    Rect {
        x: search_area.x,
        y,
        width: search_area.width,
        height: height.min(available),
    }
}

/// True when a click at (column, row) lands inside `area`
pub fn hit(area: Rect, column: u16, row: u16) -> bool {
    area.contains(Position { x: column, y: row })
}

/// Row index under a click, if it hit a visible candidate line
pub fn row_at(area: Rect, row: u16, count: usize) -> Option<usize> {
    let first = area.y.checked_add(1)?;
    if row < first {
        return None;
    }
    let index = usize::from(row - first);
    let visible = usize::from(area.height.saturating_sub(2));
    (index < count && index < visible).then_some(index)
}

pub fn render(f: &mut Frame, area: Rect, candidates: &[Candidate], highlighted: usize) {
    let items: Vec<ListItem> = candidates
        .iter()
        .map(|candidate| {
            let price_style = if candidate.price.is_available() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    candidate.display_name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  ({})  ", candidate.symbol)),
                Span::styled(format_price(candidate.price), price_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Suggestions")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(highlighted.min(candidates.len().saturating_sub(1))));

    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdown_area_is_clipped_to_bounds() {
        let bounds = Rect::new(0, 0, 80, 10);
        let search = Rect::new(0, 3, 40, 3);
        let area = dropdown_area(search, bounds, 5);
        assert_eq!(area.y, 6);
        assert_eq!(area.height, 4);
    }

    #[test]
    fn test_row_at_skips_border() {
        let area = Rect::new(0, 6, 40, 7);
        assert_eq!(row_at(area, 6, 5), None);
        assert_eq!(row_at(area, 7, 5), Some(0));
        assert_eq!(row_at(area, 11, 5), Some(4));
        assert_eq!(row_at(area, 12, 5), None);
        assert!(hit(area, 3, 8));
        assert!(!hit(area, 50, 8));
    }

    #[test]
    fn test_row_at_ignores_bottom_border_of_clipped_list() {
        let bounds = Rect::new(0, 0, 80, 10);
        let search = Rect::new(0, 3, 40, 3);
        let area = dropdown_area(search, bounds, 5);

        assert_eq!(row_at(area, 7, 5), Some(0));
        assert_eq!(row_at(area, 8, 5), Some(1));
        assert_eq!(row_at(area, 9, 5), None);
    }
}
