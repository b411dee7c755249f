use crate::news::{Article, NewsFeed};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Headline pane: trending on top, market below
pub fn render(f: &mut Frame, area: Rect, feed: Option<&NewsFeed>) {
    let Some(feed) = feed else {
        render_notice(f, area, "Loading headlines...");
        return;
    };
    if feed.is_empty() {
        let notice = feed.notice.as_deref().unwrap_or("No news available.");
        render_notice(f, area, notice);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    f.render_widget(article_list("Trending", &feed.trending), chunks[0]);
    f.render_widget(article_list("Market News", &feed.market), chunks[1]);
}

fn article_list<'a>(title: &'a str, articles: &'a [Article]) -> List<'a> {
    let items: Vec<ListItem> = articles
        .iter()
        .map(|article| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    article.title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(article.source.as_str(), Style::default().fg(Color::Cyan)),
                    Span::raw("  "),
                    Span::styled(article.published_label(), Style::default().fg(Color::DarkGray)),
                ]),
            ])
        })
        .collect();

    List::new(items).block(Block::default().borders(Borders::ALL).title(title))
}

fn render_notice(f: &mut Frame, area: Rect, notice: &str) {
    let paragraph = Paragraph::new(notice.to_string())
        .block(Block::default().borders(Borders::ALL).title("News"))
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
