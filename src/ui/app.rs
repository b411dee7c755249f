use crate::api::{MarketApi, YahooClient};
use crate::config::Config;
use crate::controller::{SearchController, SearchPhase, Selection};
use crate::news::{NewsFeed, NewsService};
use crate::orchestrator::chart::{ChartFactory, ChartSnapshot};
use crate::orchestrator::panels::PanelBoard;
use crate::orchestrator::{ScriptLoader, TerminalChartFactory, WidgetOrchestrator};
use crate::quote::{present, Price, QuoteDetail, QuoteFetcher};
use crate::resolver::{Candidate, TickerResolver};
use crate::session::{self, SessionState, SessionStore};
use crate::symbol::Symbol;
use crate::watchlist::{self, WatchRow};
use crate::widgets::log_view::{LogView, LogViewAction};
use crate::widgets::search_box::{SearchBox, SearchBoxAction, SearchBoxConfig};
use crate::widgets::suggestions;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Results coming back from background work
#[derive(Debug)]
pub enum AppMessage {
    Suggestions { token: u64, candidates: Vec<Candidate> },
    Quote { symbol: Symbol, detail: Option<QuoteDetail> },
    News(NewsFeed),
    Watchlist(Vec<WatchRow>),
    EmbedScript { url: String, loaded: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Dashboard,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Panels,
}

/// Everything the dashboard talks to outside the UI thread
pub struct AppServices {
    pub api: Arc<dyn MarketApi>,
    pub chart_factory: Box<dyn ChartFactory>,
    pub script_loader: Arc<ScriptLoader>,
    pub news: Option<Arc<NewsService>>,
    pub session: Option<SessionStore>,
}

/// Screen regions remembered from the last frame for mouse hit tests
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct FrameLayout {
    pub(super) screen: Rect,
    pub(super) search: Rect,
    pub(super) dropdown: Option<Rect>,
}

/// Pick the symbol shown at startup: explicit choice, then last session, then the default
pub fn initial_selection(
    config: &Config,
    explicit: Option<Symbol>,
    saved: &SessionState,
) -> Option<(Symbol, Option<String>)> {
    if let Some(symbol) = explicit {
        return Some((symbol, None));
    }
    if config.session.restore_last {
        if let Some(symbol) = saved.symbol.clone() {
            return Some((symbol, saved.display_name.clone()));
        }
    }
    Symbol::parse(&config.session.default_symbol).map(|symbol| (symbol, None))
}

pub struct DashboardApp {
    pub(super) config: Config,
    runtime: Handle,
    tx: UnboundedSender<AppMessage>,
    rx: UnboundedReceiver<AppMessage>,
    resolver: TickerResolver,
    quotes: QuoteFetcher,
    news: Option<Arc<NewsService>>,
    script_loader: Arc<ScriptLoader>,
    session: Option<SessionStore>,
    watch_symbols: Vec<Symbol>,

    pub(super) controller: SearchController,
    pub(super) search_box: SearchBox,
    pub(super) orchestrator: WidgetOrchestrator,
    pub(super) board: PanelBoard,
    pub(super) price_text: String,
    pub(super) quote_detail: Option<QuoteDetail>,
    pub(super) news_feed: Option<NewsFeed>,
    pub(super) watchlist: Vec<WatchRow>,
    pub(super) log_view: LogView,
    pub(super) mode: AppMode,
    pub(super) focus: Focus,
    pub(super) status: String,
    pub(super) layout: FrameLayout,

    pending_restore: Option<(Symbol, Option<String>)>,
    chart_was_loading: bool,
}

impl DashboardApp {
    pub fn new(config: Config, services: AppServices, runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        let panels = config.widgets.panels.clone();
        let watch_symbols = if config.watchlist.enabled {
            watchlist::parse_symbols(&config.watchlist.symbols)
        } else {
            Vec::new()
        };

        Self {
            resolver: TickerResolver::new(services.api.clone(), &config.api.region, &config.search),
            quotes: QuoteFetcher::new(services.api.clone()),
            news: services.news,
            script_loader: services.script_loader,
            session: services.session,
            controller: SearchController::new(config.search.debounce_ms),
            search_box: SearchBox::with_config(SearchBoxConfig::default()),
            board: PanelBoard::new(&panels),
            orchestrator: WidgetOrchestrator::new(
                panels,
                config.chart.clone(),
                services.chart_factory,
            ),
            price_text: String::new(),
            quote_detail: None,
            news_feed: None,
            watchlist: watch_symbols
                .iter()
                .map(|symbol| WatchRow {
                    symbol: symbol.clone(),
                    price: Price::Unavailable,
                })
                .collect(),
            watch_symbols,
            log_view: LogView::new(),
            mode: AppMode::Dashboard,
            focus: Focus::Search,
            status: "Type to search NSE/BSE listings".to_string(),
            layout: FrameLayout::default(),
            pending_restore: None,
            chart_was_loading: false,
            config,
            runtime,
            tx,
            rx,
        }
    }

    /// Wire up the live Yahoo client, terminal charts, news and session store
    pub fn from_config(config: Config, runtime: Handle) -> Result<Self> {
        let api: Arc<dyn MarketApi> = Arc::new(YahooClient::new(&config.api)?);
        let chart_factory = Box::new(TerminalChartFactory::new(api.clone(), runtime.clone()));
        let news = Arc::new(NewsService::new(&config.news, config.api.timeout_secs)?);
        let session = match SessionStore::default_location() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(target: "session", "Session persistence disabled: {:#}", e);
                None
            }
        };

        Ok(Self::new(
            config,
            AppServices {
                api,
                chart_factory,
                script_loader: ScriptLoader::global(),
                news: Some(news),
                session,
            },
            runtime,
        ))
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn orchestrator(&self) -> &WidgetOrchestrator {
        &self.orchestrator
    }

    pub fn board(&self) -> &PanelBoard {
        &self.board
    }

    pub fn price_text(&self) -> &str {
        &self.price_text
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(|store| store.load())
            .unwrap_or_default()
    }

    /// Restore a selection once the first frame exists
    pub fn queue_restore(&mut self, symbol: Symbol, display_name: Option<String>) {
        self.pending_restore = Some((symbol, display_name));
    }

    pub fn apply_pending_restore(&mut self) {
        if let Some((symbol, display_name)) = self.pending_restore.take() {
            let selection = self.controller.restore(symbol, display_name);
            self.search_box.set_value(self.controller.input());
            self.on_selected(selection);
        }
    }

    /// Kick off the one-shot startup loads
    pub fn start_background(&mut self) {
        let url = self.config.widgets.embed_script_url.clone();
        if !url.is_empty() {
            let loader = self.script_loader.clone();
            let tx = self.tx.clone();
            self.runtime.spawn(async move {
                let loaded = loader.ensure_loaded(&url).await.is_ok();
                let _ = tx.send(AppMessage::EmbedScript { url, loaded });
            });
        }

        self.refresh_news();
        self.refresh_watchlist();
    }

    fn refresh_news(&mut self) {
        let Some(news) = self.news.clone() else {
            self.news_feed = Some(NewsFeed::empty("News is disabled."));
            return;
        };
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let feed = news.get_news().await;
            let _ = tx.send(AppMessage::News(feed));
        });
    }

    fn refresh_watchlist(&mut self) {
        if self.watch_symbols.is_empty() {
            return;
        }
        let quotes = self.quotes.clone();
        let symbols = self.watch_symbols.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let rows = watchlist::refresh(&quotes, &symbols).await;
            let _ = tx.send(AppMessage::Watchlist(rows));
        });
    }

    /// Feed new search text to the controller
    pub fn on_search_input(&mut self, text: &str, now: Instant) {
        self.controller.on_input_changed(text, now);
        if self.controller.phase() == SearchPhase::Idle {
            self.status = "Type to search NSE/BSE listings".to_string();
        }
    }

    /// Run a search if the debounce window has closed
    pub fn tick(&mut self, now: Instant) {
        let Some(request) = self.controller.poll_debounce(now) else {
            return;
        };
        self.status = format!("Searching for '{}'...", request.query);

        let resolver = self.resolver.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let candidates = resolver.resolve(&request.query).await;
            let _ = tx.send(AppMessage::Suggestions {
                token: request.token,
                candidates,
            });
        });
    }

    /// Apply every message that has arrived; returns how many were handled
    pub fn drain_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Suggestions { token, candidates } => {
                let count = candidates.len();
                if self.controller.on_results(token, candidates) {
                    self.status = if count == 0 {
                        "No NSE/BSE matches".to_string()
                    } else {
                        format!("{} matches (Up/Down, Enter to select)", count)
                    };
                }
            }
            AppMessage::Quote { symbol, detail } => {
                let current = self.controller.selection().map(|s| &s.symbol);
                if current != Some(&symbol) {
                    debug!(target: "quote", "Dropping quote for {} (no longer selected)", symbol);
                    return;
                }
                let price = detail.as_ref().map(|d| d.price).unwrap_or(Price::Unavailable);
                present(price, &mut self.price_text);
                self.quote_detail = detail;
            }
            AppMessage::News(feed) => self.news_feed = Some(feed),
            AppMessage::Watchlist(rows) => self.watchlist = rows,
            AppMessage::EmbedScript { url, loaded } => {
                self.orchestrator.set_render_trigger_available(loaded);
                if loaded {
                    info!(target: "orchestrator", "Render trigger enabled by {}", url);
                    self.orchestrator.trigger_render(&mut self.board);
                }
            }
        }
    }

    /// Side effects of a new Selection: quote, panels and chart, session
    fn on_selected(&mut self, selection: Selection) {
        let symbol = selection.symbol.clone();
        self.status = format!("Showing {} ({})", selection.display_name, symbol.prefixed());

        self.price_text = "Fetching price...".to_string();
        self.quote_detail = None;
        let quotes = self.quotes.clone();
        let tx = self.tx.clone();
        let requested = symbol.clone();
        self.runtime.spawn(async move {
            let detail = quotes.fetch_detail(&requested).await;
            let _ = tx.send(AppMessage::Quote {
                symbol: requested,
                detail,
            });
        });

        self.orchestrator.show(&symbol, &mut self.board);

        if let Some(store) = &self.session {
            let state = SessionState {
                symbol: Some(symbol),
                display_name: Some(selection.display_name),
            };
            if let Err(e) = store.save(&state) {
                warn!(target: "session", "Could not save session: {:#}", e);
            }
        }
    }

    fn select_candidate(&mut self, index: usize) {
        if let Some(selection) = self.controller.select(index) {
            self.search_box.set_value(self.controller.input());
            self.on_selected(selection);
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::Search => {
                self.search_box.focus();
                self.controller.reopen_dropdown();
            }
            Focus::Panels => {
                self.search_box.blur();
                self.controller.on_pointer_outside();
            }
        }
    }

    /// Handle a key press; returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            return Ok(true);
        }

        if self.mode == AppMode::Logs {
            if self.log_view.handle_key(key) == LogViewAction::Exit {
                self.mode = AppMode::Dashboard;
            }
            return Ok(false);
        }
        if key.code == KeyCode::F(5) {
            self.log_view.reset();
            self.mode = AppMode::Logs;
            return Ok(false);
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Panels => self.handle_panels_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.search_box.handle_key(key) {
            SearchBoxAction::InputChanged(text) => self.on_search_input(&text, Instant::now()),
            SearchBoxAction::Confirm => {
                let index = self.controller.highlighted();
                self.select_candidate(index);
            }
            SearchBoxAction::Cancel => {
                if self.controller.dropdown_visible() {
                    self.controller.on_pointer_outside();
                } else if !self.search_box.value().is_empty() {
                    self.search_box.clear();
                    self.controller.clear();
                } else {
                    self.set_focus(Focus::Panels);
                }
            }
            SearchBoxAction::HighlightNext => {
                if self.controller.dropdown_visible() {
                    self.controller.highlight_next();
                } else {
                    self.controller.reopen_dropdown();
                }
            }
            SearchBoxAction::HighlightPrev => self.controller.highlight_prev(),
            SearchBoxAction::PassThrough => {
                if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
                    self.set_focus(Focus::Panels);
                }
            }
            SearchBoxAction::Continue => {}
        }
        Ok(false)
    }

    fn handle_panels_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc | KeyCode::Char('/') => self.set_focus(Focus::Search),
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => self.board.focus_next(),
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => self.board.focus_prev(),
            KeyCode::Char('y') => self.yank_panel_url(),
            KeyCode::Char('Y') | KeyCode::Char('s') => self.yank_share_link(),
            KeyCode::Char('r') => {
                self.refresh_news();
                self.refresh_watchlist();
                if let Some(selection) = self.controller.selection().cloned() {
                    self.on_selected(selection);
                }
                self.status = "Refreshing...".to_string();
            }
            _ => {}
        }
        Ok(false)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);

        if self.controller.dropdown_visible() {
            if let Some(area) = self.layout.dropdown {
                if suggestions::hit(area, column, row) {
                    if let Some(index) =
                        suggestions::row_at(area, row, self.controller.candidates().len())
                    {
                        self.select_candidate(index);
                    }
                    return;
                }
            }
        }

        if suggestions::hit(self.layout.search, column, row) {
            self.set_focus(Focus::Search);
        } else {
            self.controller.on_pointer_outside();
        }
    }

    fn yank_panel_url(&mut self) {
        match self.board.focused().and_then(|p| p.url.clone()) {
            Some(url) => self.copy_to_clipboard("panel URL", &url),
            None => self.yank_share_link(),
        }
    }

    fn yank_share_link(&mut self) {
        let Some(symbol) = self.controller.selection().map(|s| s.symbol.clone()) else {
            self.status = "Nothing selected to share".to_string();
            return;
        };
        let link = session::share_link(&self.config.session.share_base_url, &symbol);
        self.copy_to_clipboard("share link", &link);
    }

    fn copy_to_clipboard(&mut self, what: &str, text: &str) {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text) {
                Ok(_) => self.status = format!("Copied {} to clipboard: {}", what, text),
                Err(e) => self.status = format!("Failed to copy {}: {}", what, e),
            },
            Err(e) => self.status = format!("Failed to access clipboard: {}", e),
        }
    }

    fn chart_loading(&self) -> bool {
        self.orchestrator
            .chart()
            .map(|chart| chart.snapshot() == ChartSnapshot::Loading)
            .unwrap_or(false)
    }

    pub fn run(mut self) -> Result<()> {
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!(
                "Failed to enable raw mode: {}. Try --search <query> instead.",
                e
            ));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = terminal.show_cursor();
        self.orchestrator.release_chart();

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        // Panels and the chart container only exist after the first frame
        terminal.draw(|f| self.ui(f))?;
        self.apply_pending_restore();
        self.start_background();
        terminal.draw(|f| self.ui(f))?;
        info!(target: "system", "Dashboard ready");

        loop {
            let mut dirty = false;

            self.tick(Instant::now());
            dirty |= self.drain_messages() > 0;

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key)? {
                            break;
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse);
                        dirty = true;
                    }
                    Event::Resize(_, _) => dirty = true,
                    _ => {}
                }
            }

            let loading = self.chart_loading();
            if dirty || loading || self.chart_was_loading || self.controller.is_debounce_pending() {
                terminal.draw(|f| self.ui(f))?;
            }
            self.chart_was_loading = loading;
        }

        info!(target: "system", "Dashboard closed");
        Ok(())
    }
}
