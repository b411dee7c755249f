//! Re-points the display panels and the chart at a selected symbol
//!
//! The orchestrator never looks panels up by itself: the caller hands it the
//! [`PanelHost`] to write into. It exclusively owns the chart slot, so the
//! release-before-create rule lives in one place.

pub mod chart;
pub mod panels;
pub mod script_loader;
pub mod terminal_chart;

use crate::config::config::ChartSettings;
use crate::symbol::Symbol;
use chart::{ChartConfig, ChartFactory, ChartInstance, ChartSlot};
use panels::{PanelHost, PanelSpec};
use tracing::{info, warn};

pub use script_loader::ScriptLoader;
pub use terminal_chart::TerminalChartFactory;

pub struct WidgetOrchestrator {
    panels: Vec<PanelSpec>,
    chart_settings: ChartSettings,
    factory: Box<dyn ChartFactory>,
    slot: ChartSlot,
    render_trigger_available: bool,
    current: Option<Symbol>,
}

impl WidgetOrchestrator {
    pub fn new(
        panels: Vec<PanelSpec>,
        chart_settings: ChartSettings,
        factory: Box<dyn ChartFactory>,
    ) -> Self {
        Self {
            panels,
            chart_settings,
            factory,
            slot: ChartSlot::Empty,
            render_trigger_available: false,
            current: None,
        }
    }

    /// Enabled once the embed library that exposes the render trigger has loaded
    pub fn set_render_trigger_available(&mut self, available: bool) {
        self.render_trigger_available = available;
    }

    pub fn render_trigger_available(&self) -> bool {
        self.render_trigger_available
    }

    pub fn panels(&self) -> &[PanelSpec] {
        &self.panels
    }

    pub fn current(&self) -> Option<&Symbol> {
        self.current.as_ref()
    }

    /// Point every panel and the chart at `symbol`. Each step is best-effort;
    /// a failing panel or chart never stops the others.
    pub fn show(&mut self, symbol: &Symbol, host: &mut dyn PanelHost) {
        let bare = symbol.bare().to_string();
        info!(target: "orchestrator", "Showing {} (bare {})", symbol, bare);

        self.update_panels(symbol, host);

        self.slot.release();

        let container_id = match host.mount_chart_container(&bare) {
            Ok(id) => id,
            Err(e) => {
                warn!(target: "orchestrator", "No chart container for {}: {:#}", bare, e);
                let message = format!("Chart unavailable for {}", bare);
                host.show_chart_placeholder(&message);
                self.slot = ChartSlot::Placeholder(message);
                self.current = Some(symbol.clone());
                return;
            }
        };

        let config = ChartConfig::new(symbol, &container_id, &self.chart_settings);
        if self.slot.replace(self.factory.as_ref(), &config).is_err() {
            if let Some(message) = self.slot.placeholder() {
                host.show_chart_placeholder(message);
            }
        }
        self.current = Some(symbol.clone());
    }

    fn update_panels(&self, symbol: &Symbol, host: &mut dyn PanelHost) {
        let mut needs_trigger = false;
        for panel in &self.panels {
            let url = panel.render_url(symbol);
            match host.set_panel_source(&panel.id, &url) {
                Ok(()) => needs_trigger |= !panel.auto_refresh,
                Err(e) => warn!(target: "orchestrator", "Panel {} not updated: {:#}", panel.id, e),
            }
        }

        if needs_trigger && self.render_trigger_available {
            if let Err(e) = host.trigger_render() {
                warn!(target: "orchestrator", "Render trigger failed: {:#}", e);
            }
        }
    }

    /// Re-run the render trigger for the panels already showing `current`,
    /// leaving the chart alone. Returns true when a pass was issued.
    pub fn trigger_render(&self, host: &mut dyn PanelHost) -> bool {
        if !self.render_trigger_available || self.current.is_none() {
            return false;
        }
        if self.panels.iter().all(|panel| panel.auto_refresh) {
            return false;
        }
        match host.trigger_render() {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "orchestrator", "Render trigger failed: {:#}", e);
                false
            }
        }
    }

    pub fn chart(&self) -> Option<&dyn ChartInstance> {
        self.slot.live()
    }

    pub fn chart_placeholder(&self) -> Option<&str> {
        self.slot.placeholder()
    }

    pub fn live_chart_count(&self) -> usize {
        usize::from(self.slot.live().is_some())
    }

    /// Tear down the chart, e.g. on shutdown
    pub fn release_chart(&mut self) {
        self.slot.release();
    }
}

impl Drop for WidgetOrchestrator {
    fn drop(&mut self) {
        self.slot.release();
    }
}
