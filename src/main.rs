use anyhow::{anyhow, Result};
use crossterm::style::Stylize;
use std::sync::Arc;
use ticker_dash::api::{MarketApi, YahooClient};
use ticker_dash::config::Config;
use ticker_dash::resolver::TickerResolver;
use ticker_dash::session::parse_share_query;
use ticker_dash::symbol::Symbol;
use ticker_dash::ui::{initial_selection, DashboardApp};
use ticker_dash::utils::dual_logging;
use ticker_dash::utils::logging::init_tracing;
use tracing::{info, warn};

mod table_display;

fn print_help() {
    println!("{}", "ticker-dash - NSE/BSE stock dashboard".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  ticker-dash [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}  - Open the dashboard on a symbol", "--symbol TCS.NS".green());
    println!("  {}     - Open the symbol from a share link", "--link <url>".green());
    println!("  {}  - Print suggestions and exit", "--search <query>".green());
    println!("  {} - Write a commented config file", "--generate-config".green());
    println!("  {}            - Show this help", "--help".green());
    println!();
    println!("{}", "Environment:".yellow());
    println!("  {}   - NewsAPI key for the headlines pane", "NEWSAPI_KEY".green());
    println!("  {}      - Log filter, e.g. search=debug", "RUST_LOG".green());
    println!();
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(|s| s.as_str())
}

/// Symbol given on the command line, via --symbol or --link
fn requested_symbol(args: &[String]) -> Result<Option<Symbol>> {
    if let Some(raw) = flag_value(args, "--symbol") {
        return Symbol::parse(raw)
            .map(Some)
            .ok_or_else(|| anyhow!("'{}' is not an NSE (.NS) or BSE (.BO) symbol", raw));
    }
    if let Some(link) = flag_value(args, "--link") {
        return parse_share_query(link)
            .map(Some)
            .ok_or_else(|| anyhow!("No NSE/BSE symbol found in link '{}'", link));
    }
    Ok(None)
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize panels, news and the watchlist.");
    Ok(())
}

fn run_search(runtime: &tokio::runtime::Runtime, config: &Config, query: &str) -> Result<()> {
    let api: Arc<dyn MarketApi> = Arc::new(YahooClient::new(&config.api)?);
    let resolver = TickerResolver::new(api, &config.api.region, &config.search);
    let candidates = runtime.block_on(resolver.resolve(query));
    table_display::display_candidates(query, &candidates);
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.contains(&"--generate-config".to_string()) {
        if let Err(e) = generate_config() {
            eprintln!("Error writing config file: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    init_tracing();
    if let Some(log_file) = dual_logging::get_log_file() {
        eprintln!("Logs: {}", log_file.path().display());
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(target: "system", "Could not load config, using defaults: {:#}", e);
            Config::default()
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;

    if let Some(query) = flag_value(&args, "--search") {
        return run_search(&runtime, &config, query);
    }

    let explicit = match requested_symbol(&args) {
        Ok(symbol) => symbol,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let mut app = DashboardApp::from_config(config.clone(), runtime.handle().clone())?;
    let saved = app.session_state();
    if let Some((symbol, name)) = initial_selection(&config, explicit, &saved) {
        info!(target: "session", "Opening on {}", symbol);
        app.queue_restore(symbol, name);
    }

    let result = app.run();
    if let Some(log_file) = dual_logging::get_log_file() {
        log_file.flush();
    }
    runtime.shutdown_background();
    result
}
