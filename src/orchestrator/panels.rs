//! Analysis panels and the display surface they are mounted on

use crate::symbol::Symbol;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const TRENDLYNE_COLORS: &str = "?posCol=00A25B&primaryCol=006AFF&negCol=EB3B00&neuCol=F7941E";

/// One embed panel: where it points and whether it refreshes itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub id: String,
    pub title: String,
    /// `{bare}`, `{symbol}` and `{exchange}` are substituted on selection
    pub url_template: String,
    /// Panels that don't auto-refresh need the embed library's render trigger
    #[serde(default)]
    pub auto_refresh: bool,
}

impl PanelSpec {
    pub fn new(id: &str, title: &str, url_template: &str, auto_refresh: bool) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            url_template: url_template.to_string(),
            auto_refresh,
        }
    }

    pub fn defaults() -> Vec<Self> {
        let trendlyne = |kind: &str| {
            format!("https://trendlyne.com/web-widget/{kind}-widget/Poppins/{{bare}}/{TRENDLYNE_COLORS}")
        };
        vec![
            Self::new("swot", "SWOT Analysis", &trendlyne("swot"), false),
            Self::new("qvt", "QVT Score", &trendlyne("qvt"), false),
            Self::new("technical", "Technical Analysis", &trendlyne("technical"), false),
            Self::new("checklist", "Checklist", &trendlyne("checklist"), false),
            Self::new(
                "tradingview",
                "TradingView",
                "https://www.tradingview.com/symbols/{exchange}-{bare}/",
                true,
            ),
        ]
    }

    /// Panel URL for a symbol, with the symbol parts URL-encoded
    pub fn render_url(&self, symbol: &Symbol) -> String {
        self.url_template
            .replace("{bare}", &urlencoding::encode(symbol.bare()))
            .replace("{symbol}", &urlencoding::encode(symbol.as_str()))
            .replace("{exchange}", symbol.exchange().code())
    }
}

/// The display surface the orchestrator writes into
pub trait PanelHost {
    /// Point a panel at a new URL
    fn set_panel_source(&mut self, panel_id: &str, url: &str) -> Result<()>;

    /// Re-render panels that don't refresh on their own
    fn trigger_render(&mut self) -> Result<()>;

    /// Replace the chart container with a fresh one, returning its id
    fn mount_chart_container(&mut self, bare_symbol: &str) -> Result<String>;

    /// Show a static message where the chart would be
    fn show_chart_placeholder(&mut self, message: &str);
}

/// What the dashboard shows for one panel
#[derive(Debug, Clone)]
pub struct PanelView {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub auto_refresh: bool,
    /// Source changed but the render trigger has not run yet
    pub pending_render: bool,
}

/// Dashboard-side panel state; the TUI implementation of [`PanelHost`]
#[derive(Debug, Clone)]
pub struct PanelBoard {
    panels: Vec<PanelView>,
    chart_container: Option<String>,
    chart_placeholder: Option<String>,
    next_container: u64,
    render_passes: u64,
    focused: usize,
}

impl PanelBoard {
    pub fn new(specs: &[PanelSpec]) -> Self {
        Self {
            panels: specs
                .iter()
                .map(|spec| PanelView {
                    id: spec.id.clone(),
                    title: spec.title.clone(),
                    url: None,
                    auto_refresh: spec.auto_refresh,
                    pending_render: false,
                })
                .collect(),
            chart_container: None,
            chart_placeholder: None,
            next_container: 0,
            render_passes: 0,
            focused: 0,
        }
    }

    pub fn panels(&self) -> &[PanelView] {
        &self.panels
    }

    pub fn panel(&self, id: &str) -> Option<&PanelView> {
        self.panels.iter().find(|p| p.id == id)
    }

    pub fn chart_container(&self) -> Option<&str> {
        self.chart_container.as_deref()
    }

    pub fn chart_placeholder(&self) -> Option<&str> {
        self.chart_placeholder.as_deref()
    }

    pub fn render_passes(&self) -> u64 {
        self.render_passes
    }

    pub fn focused(&self) -> Option<&PanelView> {
        self.panels.get(self.focused)
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focus_next(&mut self) {
        if !self.panels.is_empty() {
            self.focused = (self.focused + 1) % self.panels.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.panels.is_empty() {
            self.focused = (self.focused + self.panels.len() - 1) % self.panels.len();
        }
    }
}

impl PanelHost for PanelBoard {
    fn set_panel_source(&mut self, panel_id: &str, url: &str) -> Result<()> {
        let panel = self
            .panels
            .iter_mut()
            .find(|p| p.id == panel_id)
            .ok_or_else(|| anyhow!("No panel '{}' on the board", panel_id))?;
        panel.url = Some(url.to_string());
        panel.pending_render = !panel.auto_refresh;
        Ok(())
    }

    fn trigger_render(&mut self) -> Result<()> {
        self.render_passes += 1;
        for panel in &mut self.panels {
            panel.pending_render = false;
        }
        debug!(target: "orchestrator", "Render pass {}", self.render_passes);
        Ok(())
    }

    fn mount_chart_container(&mut self, bare_symbol: &str) -> Result<String> {
        self.next_container += 1;
        let id = format!("chart_{}_{}", bare_symbol, self.next_container);
        self.chart_container = Some(id.clone());
        self.chart_placeholder = None;
        Ok(id)
    }

    fn show_chart_placeholder(&mut self, message: &str) {
        self.chart_placeholder = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_url_uses_bare_symbol() {
        let swot = &PanelSpec::defaults()[0];
        let url = swot.render_url(&Symbol::parse("TCS.NS").unwrap());
        assert_eq!(
            url,
            "https://trendlyne.com/web-widget/swot-widget/Poppins/TCS/?posCol=00A25B&primaryCol=006AFF&negCol=EB3B00&neuCol=F7941E"
        );
    }

    #[test]
    fn test_render_url_encodes_and_prefixes() {
        let spec = PanelSpec::new("x", "X", "https://e/{exchange}-{bare}/{symbol}", true);
        let url = spec.render_url(&Symbol::parse("M&M.BO").unwrap());
        assert_eq!(url, "https://e/BSE-M%26M/M%26M.BO");
    }

    #[test]
    fn test_board_pending_render_only_for_manual_panels() {
        let mut board = PanelBoard::new(&PanelSpec::defaults());
        board.set_panel_source("swot", "https://a").unwrap();
        board.set_panel_source("tradingview", "https://b").unwrap();
        assert!(board.panel("swot").unwrap().pending_render);
        assert!(!board.panel("tradingview").unwrap().pending_render);

        board.trigger_render().unwrap();
        assert!(!board.panel("swot").unwrap().pending_render);
        assert_eq!(board.render_passes(), 1);

        assert!(board.set_panel_source("missing", "https://c").is_err());
    }

    #[test]
    fn test_mount_replaces_container() {
        let mut board = PanelBoard::new(&[]);
        board.show_chart_placeholder("Chart unavailable");
        let first = board.mount_chart_container("TCS").unwrap();
        let second = board.mount_chart_container("TCS").unwrap();
        assert_ne!(first, second);
        assert_eq!(board.chart_container(), Some(second.as_str()));
        assert!(board.chart_placeholder().is_none());
    }

    #[test]
    fn test_focus_wraps() {
        let mut board = PanelBoard::new(&PanelSpec::defaults());
        board.focus_prev();
        assert_eq!(board.focused().unwrap().id, "tradingview");
        board.focus_next();
        assert_eq!(board.focused_index(), 0);
    }
}
