//! Intraday line chart for the live chart instance

use crate::orchestrator::chart::{ChartInstance, ChartSnapshot};
use chrono::{Local, TimeZone};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

/// Min and max of the series, padded so a flat line stays visible
pub fn value_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (min, max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (_, y)| {
        (lo.min(*y), hi.max(*y))
    });
    if min > max {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.05).max(max.abs() * 0.001).max(0.01);
    [min - pad, max + pad]
}

fn time_label(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn render(f: &mut Frame, area: Rect, chart: Option<&dyn ChartInstance>, placeholder: Option<&str>) {
    let Some(chart) = chart else {
        let message = placeholder.unwrap_or("Select a ticker to load its chart");
        render_message(f, area, "Chart", message);
        return;
    };

    let title = format!("Chart {} [{}]", chart.symbol(), chart.container_id());
    match chart.snapshot() {
        ChartSnapshot::Loading => render_message(f, area, &title, "Loading chart data..."),
        ChartSnapshot::Failed(reason) => render_message(f, area, &title, &reason),
        ChartSnapshot::Ready(series) if series.is_empty() => {
            render_message(f, area, &title, "No intraday data yet")
        }
        ChartSnapshot::Ready(series) => {
            let points: Vec<(f64, f64)> = series.iter().map(|(t, v)| (*t as f64, *v)).collect();
            let first = series.first().map(|(t, _)| *t).unwrap_or_default();
            let last = series.last().map(|(t, _)| *t).unwrap_or_default();
            let [lo, hi] = value_bounds(&points);

            let rising = series.last().map(|(_, v)| *v) >= series.first().map(|(_, v)| *v);
            let color = if rising { Color::Green } else { Color::Red };

            let dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(&points);

            let widget = Chart::new(vec![dataset])
                .block(Block::default().borders(Borders::ALL).title(title))
                .x_axis(
                    Axis::default()
                        .bounds([first as f64, (last.max(first + 1)) as f64])
                        .labels(vec![Span::raw(time_label(first)), Span::raw(time_label(last))]),
                )
                .y_axis(
                    Axis::default()
                        .bounds([lo, hi])
                        .labels(vec![Span::raw(format!("{lo:.2}")), Span::raw(format!("{hi:.2}"))]),
                );
            f.render_widget(widget, area);
        }
    }
}

fn render_message(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
