//! The charting widget seam and its single-instance slot

use crate::config::config::ChartSettings;
use crate::symbol::{Exchange, Symbol};
use anyhow::Result;
use std::fmt;
use tracing::{debug, warn};

/// Everything a chart needs to bind itself to a container
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Bare symbol, e.g. `TCS`
    pub symbol: String,
    pub exchange: Exchange,
    pub interval: String,
    pub range: String,
    pub locale: String,
    pub theme: String,
    pub container_id: String,
    pub width: String,
    pub height: String,
}

impl ChartConfig {
    pub fn new(symbol: &Symbol, container_id: &str, settings: &ChartSettings) -> Self {
        Self {
            symbol: symbol.bare().to_string(),
            exchange: symbol.exchange(),
            interval: settings.interval.clone(),
            range: settings.range.clone(),
            locale: settings.locale.clone(),
            theme: settings.theme.clone(),
            container_id: container_id.to_string(),
            width: settings.width.clone(),
            height: settings.height.clone(),
        }
    }

    /// The symbol with its exchange suffix put back, for data lookups
    pub fn qualified_symbol(&self) -> String {
        self.exchange.qualify(&self.symbol)
    }
}

/// What a chart currently has to draw
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSnapshot {
    Loading,
    Ready(Vec<(i64, f64)>),
    Failed(String),
}

/// A live charting widget
pub trait ChartInstance: Send {
    fn container_id(&self) -> &str;

    /// Bare symbol the chart is bound to
    fn symbol(&self) -> &str;

    fn snapshot(&self) -> ChartSnapshot;

    /// Tear the instance down; it must not be used afterwards
    fn release(&mut self);
}

pub trait ChartFactory: Send {
    fn create(&self, config: &ChartConfig) -> Result<Box<dyn ChartInstance>>;
}

/// Arena of one: at most a single chart instance is ever live
#[derive(Default)]
pub enum ChartSlot {
    #[default]
    Empty,
    Live(Box<dyn ChartInstance>),
    Placeholder(String),
}

impl ChartSlot {
    /// Release whatever is live, leaving the slot empty
    pub fn release(&mut self) -> bool {
        match std::mem::take(self) {
            ChartSlot::Live(mut chart) => {
                debug!(target: "orchestrator", "Releasing chart {}", chart.container_id());
                chart.release();
                true
            }
            _ => false,
        }
    }

    /// Release the current chart, then build a replacement. On failure the
    /// slot holds a placeholder message and nothing is live.
    pub fn replace(&mut self, factory: &dyn ChartFactory, config: &ChartConfig) -> Result<()> {
        self.release();
        match factory.create(config) {
            Ok(chart) => {
                *self = ChartSlot::Live(chart);
                Ok(())
            }
            Err(e) => {
                warn!(target: "orchestrator", "Chart creation for {} failed: {:#}", config.symbol, e);
                *self = ChartSlot::Placeholder(format!("Chart unavailable for {}", config.symbol));
                Err(e)
            }
        }
    }

    pub fn live(&self) -> Option<&dyn ChartInstance> {
        match self {
            ChartSlot::Live(chart) => Some(chart.as_ref()),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            ChartSlot::Placeholder(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Debug for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartSlot::Empty => write!(f, "Empty"),
            ChartSlot::Live(chart) => write!(f, "Live({})", chart.container_id()),
            ChartSlot::Placeholder(message) => write!(f, "Placeholder({message})"),
        }
    }
}
