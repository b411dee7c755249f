//! Memoized loading of third-party embed scripts
//!
//! Each URL is fetched at most once per session. Concurrent callers for the
//! same URL share the in-flight load and every caller sees the same outcome.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;
use tracing::{info, warn};

#[async_trait]
pub trait ScriptFetch: Send + Sync {
    async fn fetch_script(&self, url: &str) -> Result<()>;
}

#[async_trait]
impl ScriptFetch for reqwest::Client {
    async fn fetch_script(&self, url: &str) -> Result<()> {
        let response = self.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {} loading {}", response.status(), url));
        }
        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(anyhow!("Empty script body from {}", url));
        }
        Ok(())
    }
}

type LoadOutcome = Result<(), String>;

pub struct ScriptLoader {
    fetcher: Arc<dyn ScriptFetch>,
    loads: Mutex<HashMap<String, Arc<OnceCell<LoadOutcome>>>>,
}

static GLOBAL_LOADER: OnceLock<Arc<ScriptLoader>> = OnceLock::new();

impl ScriptLoader {
    pub fn new(fetcher: Arc<dyn ScriptFetch>) -> Self {
        Self {
            fetcher,
            loads: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide loader backed by a plain HTTP client
    pub fn global() -> Arc<ScriptLoader> {
        GLOBAL_LOADER
            .get_or_init(|| Arc::new(ScriptLoader::new(Arc::new(reqwest::Client::new()))))
            .clone()
    }

    fn cell_for(&self, url: &str) -> Arc<OnceCell<LoadOutcome>> {
        let mut loads = match self.loads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        loads.entry(url.to_string()).or_default().clone()
    }

    /// Load `url` once; later calls return the memoized outcome
    pub async fn ensure_loaded(&self, url: &str) -> Result<()> {
        let cell = self.cell_for(url);
        let outcome = cell
            .get_or_init(|| async {
                match self.fetcher.fetch_script(url).await {
                    Ok(()) => {
                        info!(target: "orchestrator", "Loaded embed script {}", url);
                        Ok(())
                    }
                    Err(e) => {
                        warn!(target: "orchestrator", "Embed script {} failed: {:#}", url, e);
                        Err(format!("{e:#}"))
                    }
                }
            })
            .await;
        outcome.clone().map_err(|e| anyhow!(e))
    }

    /// True once `url` has loaded successfully
    pub fn is_loaded(&self, url: &str) -> bool {
        let loads = match self.loads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        loads
            .get(url)
            .and_then(|cell| cell.get())
            .map(|outcome| outcome.is_ok())
            .unwrap_or(false)
    }
}
