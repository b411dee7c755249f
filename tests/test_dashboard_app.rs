mod common;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use common::{FakeMarketApi, RecordingChartFactory};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use ticker_dash::config::Config;
use ticker_dash::controller::SearchPhase;
use ticker_dash::orchestrator::script_loader::ScriptFetch;
use ticker_dash::orchestrator::ScriptLoader;
use ticker_dash::session::SessionStore;
use ticker_dash::symbol::Symbol;
use ticker_dash::ui::{AppServices, DashboardApp};

struct OfflineScripts;

#[async_trait]
impl ScriptFetch for OfflineScripts {
    async fn fetch_script(&self, _url: &str) -> Result<()> {
        Err(anyhow!("offline"))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.search.debounce_ms = 0;
    config.search.fetch_prices = false;
    config.watchlist.enabled = false;
    config.widgets.embed_script_url = String::new();
    config
}

fn app(api: Arc<FakeMarketApi>, session: Option<SessionStore>) -> DashboardApp {
    DashboardApp::new(
        test_config(),
        AppServices {
            api,
            chart_factory: Box::new(RecordingChartFactory::new()),
            script_loader: Arc::new(ScriptLoader::new(Arc::new(OfflineScripts))),
            news: None,
            session,
        },
        tokio::runtime::Handle::current(),
    )
}

/// Let background tasks run until `done` holds
async fn pump_until(app: &mut DashboardApp, done: impl Fn(&DashboardApp) -> bool) -> Result<()> {
    for _ in 0..200 {
        app.drain_messages();
        if done(app) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Err(anyhow!("condition never reached"))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[tokio::test]
async fn test_typing_and_enter_selects_tcs() -> Result<()> {
    let api = Arc::new(
        FakeMarketApi::new()
            .with_search("TCS", &[("Tata Consultancy Services", "TCS.NS")])
            .with_price("TCS.NS", 3912.5),
    );
    let dir = tempdir()?;
    let store = SessionStore::new(dir.path().join("session.json"));
    let mut app = app(api.clone(), Some(store));

    for c in "TCS".chars() {
        app.handle_key(key(KeyCode::Char(c)))?;
    }
    app.tick(Instant::now() + Duration::from_millis(10));
    pump_until(&mut app, |a| a.controller().dropdown_visible()).await?;

    assert!(!app.handle_key(key(KeyCode::Enter))?);
    assert_eq!(app.controller().phase(), SearchPhase::Selected);
    assert_eq!(app.orchestrator().chart().map(|c| c.symbol()), Some("TCS"));

    pump_until(&mut app, |a| a.price_text() == "₹3912.50").await?;
    assert_eq!(api.search_calls(), vec!["TCS".to_string()]);
    assert_eq!(api.chart_calls(), vec!["TCS.NS".to_string()]);

    let saved = SessionStore::new(dir.path().join("session.json")).load();
    assert_eq!(saved.symbol, Symbol::parse("TCS.NS"));
    Ok(())
}

#[tokio::test]
async fn test_quote_failure_shows_sentinel() -> Result<()> {
    let api = Arc::new(FakeMarketApi::new().with_server_error("TCS.NS"));
    let mut app = app(api, None);

    app.queue_restore(Symbol::parse("TCS.NS").unwrap(), None);
    app.apply_pending_restore();

    pump_until(&mut app, |a| a.price_text() == "Price not available").await?;
    assert!(!app.controller().dropdown_visible());
    Ok(())
}

#[tokio::test]
async fn test_quote_for_previous_selection_is_dropped() -> Result<()> {
    let api = Arc::new(
        FakeMarketApi::new()
            .with_price("TCS.NS", 3912.5)
            .with_price("ITC.NS", 410.0)
            .with_symbol_delay("TCS.NS", 60),
    );
    let mut app = app(api.clone(), None);

    app.queue_restore(Symbol::parse("TCS.NS").unwrap(), None);
    app.apply_pending_restore();
    app.queue_restore(Symbol::parse("ITC.NS").unwrap(), None);
    app.apply_pending_restore();

    pump_until(&mut app, |a| a.price_text() == "₹410.00").await?;

    // TCS answers after ITC; its quote must not repaint the header
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        app.drain_messages();
        assert_ne!(app.price_text(), "₹3912.50");
    }
    assert_eq!(app.price_text(), "₹410.00");
    let calls = api.chart_calls();
    assert!(calls.contains(&"TCS.NS".to_string()), "{calls:?}");
    assert!(calls.contains(&"ITC.NS".to_string()), "{calls:?}");
    assert_eq!(app.orchestrator().live_chart_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_input_never_searches() -> Result<()> {
    let api = Arc::new(FakeMarketApi::new());
    let mut app = app(api.clone(), None);

    app.handle_key(key(KeyCode::Char(' ')))?;
    app.tick(Instant::now() + Duration::from_secs(1));
    tokio::time::sleep(Duration::from_millis(20)).await;
    app.drain_messages();

    assert!(api.search_calls().is_empty());
    assert_eq!(app.controller().phase(), SearchPhase::Idle);
    Ok(())
}
