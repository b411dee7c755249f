use crate::api::MarketApi;
use crate::orchestrator::chart::{ChartConfig, ChartFactory, ChartInstance, ChartSnapshot};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Builds in-terminal intraday charts backed by the market API
pub struct TerminalChartFactory {
    api: Arc<dyn MarketApi>,
    runtime: Handle,
}

impl TerminalChartFactory {
    pub fn new(api: Arc<dyn MarketApi>, runtime: Handle) -> Self {
        Self { api, runtime }
    }
}

impl ChartFactory for TerminalChartFactory {
    fn create(&self, config: &ChartConfig) -> Result<Box<dyn ChartInstance>> {
        if config.symbol.is_empty() || config.container_id.is_empty() {
            return Err(anyhow!("Chart needs a symbol and a container"));
        }

        let state = Arc::new(Mutex::new(ChartSnapshot::Loading));
        let api = self.api.clone();
        let qualified = config.qualified_symbol();
        let interval = config.interval.clone();
        let range = config.range.clone();
        let task_state = state.clone();

        let task = self.runtime.spawn(async move {
            let snapshot = match api.chart(&qualified, &interval, &range).await {
                Ok(response) => match response.first().map(|r| r.close_series()) {
                    Some(series) if !series.is_empty() => ChartSnapshot::Ready(series),
                    _ => ChartSnapshot::Failed(format!("No intraday data for {qualified}")),
                },
                Err(e) => {
                    warn!(target: "orchestrator", "Chart data for {} failed: {:#}", qualified, e);
                    ChartSnapshot::Failed(format!("Chart data unavailable for {qualified}"))
                }
            };
            if let Ok(mut state) = task_state.lock() {
                *state = snapshot;
            }
        });

        debug!(target: "orchestrator", "Chart {} created for {}", config.container_id, config.symbol);
        Ok(Box::new(TerminalChart {
            config: config.clone(),
            state,
            task: Some(task),
        }))
    }
}

pub struct TerminalChart {
    config: ChartConfig,
    state: Arc<Mutex<ChartSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl ChartInstance for TerminalChart {
    fn container_id(&self) -> &str {
        &self.config.container_id
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn snapshot(&self) -> ChartSnapshot {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|_| ChartSnapshot::Failed("Chart state poisoned".to_string()))
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Ok(mut state) = self.state.lock() {
            *state = ChartSnapshot::Loading;
        }
    }
}

impl Drop for TerminalChart {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
