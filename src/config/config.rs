use crate::orchestrator::panels::PanelSpec;
use crate::utils::app_paths::AppPaths;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub widgets: WidgetsConfig,
    pub chart: ChartSettings,
    pub news: NewsConfig,
    pub watchlist: WatchlistConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the search/chart API
    pub yahoo_base: String,

    /// Region the ticker search is scoped to
    pub region: String,

    /// Language tag sent with chart requests
    pub lang: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching
    pub debounce_ms: u64,

    /// Maximum suggestions shown in the dropdown
    pub max_results: usize,

    /// Upper bound on concurrent per-candidate price lookups
    pub max_concurrent_quotes: usize,

    /// Look up a price for every suggestion
    pub fetch_prices: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetsConfig {
    /// Embed library whose render trigger refreshes non auto-refreshing panels
    pub embed_script_url: String,

    /// Analysis panels re-pointed on every selection
    pub panels: Vec<PanelSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub interval: String,
    pub range: String,
    pub locale: String,
    pub theme: String,
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub enabled: bool,

    /// NewsAPI key; the NEWSAPI_KEY environment variable takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub base_url: String,
    pub country: String,
    pub category: String,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlistConfig {
    pub enabled: bool,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Restore the last selected symbol on startup
    pub restore_last: bool,

    /// Base URL used when building shareable links
    pub share_base_url: String,

    /// Symbol shown when nothing else is selected
    pub default_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the key hint line at the bottom of the screen
    pub show_key_hints: bool,

    /// Use Unicode glyphs for status markers
    pub use_glyphs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            yahoo_base: "https://query1.finance.yahoo.com".to_string(),
            region: "IN".to_string(),
            lang: "en-IN".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_results: 5,
            max_concurrent_quotes: 5,
            fetch_prices: true,
        }
    }
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            embed_script_url: "https://cdn-static.trendlyne.com/static/js/webwidgets/tl-widgets.js"
                .to_string(),
            panels: PanelSpec::defaults(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            interval: "5m".to_string(),
            range: "1d".to_string(),
            locale: "in".to_string(),
            theme: "light".to_string(),
            width: "100%".to_string(),
            height: "600".to_string(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://newsapi.org/v2".to_string(),
            country: "in".to_string(),
            category: "business".to_string(),
            page_size: 20,
        }
    }
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            symbols: ["RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ITC.NS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restore_last: true,
            share_base_url: "https://ticker-dash.local/".to_string(),
            default_symbol: "LTFOODS.NS".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_key_hints: true,
            use_glyphs: true,
        }
    }
}

impl NewsConfig {
    /// Key from the environment, falling back to the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("NEWSAPI_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from a specific file, writing defaults if it is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(config_path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.normalize();
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        Ok(AppPaths::config_dir()?.join("config.toml"))
    }

    /// Clamp values that would break the search fan-out
    fn normalize(&mut self) {
        self.search.max_results = self.search.max_results.clamp(1, 5);
        self.search.max_concurrent_quotes = self.search.max_concurrent_quotes.clamp(1, 5);
        if self.widgets.panels.is_empty() {
            self.widgets.panels = PanelSpec::defaults();
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# ticker-dash configuration file
# Location: ~/.config/ticker-dash/config.toml (Linux)
#           ~/Library/Application Support/ticker-dash/config.toml (macOS)
#           %APPDATA%\ticker-dash\config.toml (Windows)

[api]
yahoo_base = "https://query1.finance.yahoo.com"
# Region the ticker search is scoped to
region = "IN"
lang = "en-IN"
timeout_secs = 10

[search]
# Milliseconds of quiet typing before a search is issued
debounce_ms = 300
# Suggestions shown in the dropdown (1-5)
max_results = 5
# Concurrent price lookups per suggestion batch (1-5)
max_concurrent_quotes = 5
fetch_prices = true

[widgets]
embed_script_url = "https://cdn-static.trendlyne.com/static/js/webwidgets/tl-widgets.js"

# Each panel's URL is rewritten on selection.
# Placeholders: {bare} = TCS, {symbol} = TCS.NS, {exchange} = NSE
[[widgets.panels]]
id = "swot"
title = "SWOT Analysis"
url_template = "https://trendlyne.com/web-widget/swot-widget/Poppins/{bare}/?posCol=00A25B&primaryCol=006AFF&negCol=EB3B00&neuCol=F7941E"
auto_refresh = false

[[widgets.panels]]
id = "tradingview"
title = "TradingView"
url_template = "https://www.tradingview.com/symbols/{exchange}-{bare}/"
auto_refresh = true

[chart]
interval = "5m"
range = "1d"
locale = "in"
theme = "light"

[news]
enabled = true
# api_key = "..."   (or set NEWSAPI_KEY)
country = "in"
category = "business"
page_size = 20

[watchlist]
enabled = true
symbols = ["RELIANCE.NS", "TCS.NS", "HDFCBANK.NS", "INFY.NS", "ITC.NS"]

[session]
restore_last = true
share_base_url = "https://ticker-dash.local/"
default_symbol = "LTFOODS.NS"

[display]
show_key_hints = true
use_glyphs = true
"#
        .to_string()
    }
}
