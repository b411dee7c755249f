//! Analysis panel board and watchlist table

use crate::orchestrator::panels::PanelBoard;
use crate::quote::format_price;
use crate::watchlist::WatchRow;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Row, Table},
    Frame,
};

pub fn render_panels(f: &mut Frame, area: Rect, board: &PanelBoard, render_trigger: bool) {
    let items: Vec<ListItem> = board
        .panels()
        .iter()
        .enumerate()
        .map(|(index, panel)| {
            let marker = if index == board.focused_index() { "> " } else { "  " };
            let status = match (&panel.url, panel.pending_render) {
                (None, _) => Span::styled("empty", Style::default().fg(Color::DarkGray)),
                (Some(_), true) => Span::styled("awaiting render", Style::default().fg(Color::Yellow)),
                (Some(_), false) => Span::styled("ready", Style::default().fg(Color::Green)),
            };
            let url = panel.url.as_deref().unwrap_or("-");
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(panel.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    status,
                ]),
                Line::from(Span::styled(
                    format!("    {url}"),
                    Style::default().fg(Color::Blue),
                )),
            ])
        })
        .collect();

    let title = if render_trigger {
        "Analysis Panels (Tab: focus, y: copy URL)"
    } else {
        "Analysis Panels (embed library offline)"
    };
    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

pub fn render_watchlist(f: &mut Frame, area: Rect, rows: &[WatchRow]) {
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let price_style = if row.price.is_available() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(row.symbol.prefixed()),
                Cell::from(format_price(row.price)).style(price_style),
            ])
        })
        .collect();

    let table = Table::new(table_rows, [Constraint::Percentage(55), Constraint::Percentage(45)])
        .header(
            Row::new(vec!["Symbol", "Price"])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Watchlist"));
    f.render_widget(table, area);
}
