//! Shareable selection state
//!
//! A Selection can travel as a `?symbol=TCS.NS` link and is remembered
//! between runs so a restart lands on the same instrument.

use crate::symbol::Symbol;
use crate::utils::app_paths::AppPaths;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SYMBOL_PARAM: &str = "symbol";

/// Build a link that reproduces the selection
pub fn share_link(base_url: &str, symbol: &Symbol) -> String {
    let base = base_url.split('?').next().unwrap_or(base_url);
    format!(
        "{}?{}={}",
        base,
        SYMBOL_PARAM,
        urlencoding::encode(symbol.as_str())
    )
}

/// Pull the symbol out of a link or a bare query string
pub fn parse_share_query(link: &str) -> Option<Symbol> {
    let query = match link.split_once('?') {
        Some((_, query)) => query,
        None => link,
    };
    let query = query.split('#').next().unwrap_or(query);

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != SYMBOL_PARAM {
            return None;
        }
        let spaced = value.replace('+', " ");
        let decoded = urlencoding::decode(&spaced).ok()?;
        Symbol::parse(&decoded)
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub symbol: Option<Symbol>,
    pub display_name: Option<String>,
}

/// Persists the last selection as JSON
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::new(AppPaths::session_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield an empty session
    pub fn load(&self) -> SessionState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return SessionState::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                warn!(target: "session", "Ignoring corrupt session file {}: {}", self.path.display(), e);
                SessionState::default()
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        debug!(target: "session", "Saved session to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_share_link_round_trip() {
        let symbol = Symbol::parse("M&M.NS").unwrap();
        let link = share_link("https://dash.example/app?symbol=OLD.NS", &symbol);
        assert_eq!(link, "https://dash.example/app?symbol=M%26M.NS");
        assert_eq!(parse_share_query(&link), Some(symbol));
    }

    #[test]
    fn test_parse_share_query_variants() {
        assert_eq!(
            parse_share_query("theme=dark&symbol=TCS.NS#top").map(|s| s.to_string()),
            Some("TCS.NS".to_string())
        );
        assert!(parse_share_query("https://x/?symbol=AAPL").is_none());
        assert!(parse_share_query("https://x/").is_none());
    }

    #[test]
    fn test_parse_share_query_decodes_escapes() {
        assert_eq!(
            parse_share_query("?symbol=BAJAJ%2DAUTO.NS").map(|s| s.to_string()),
            Some("BAJAJ-AUTO.NS".to_string())
        );
        assert!(parse_share_query("?symbol=%FF%FE").is_none());
    }

    #[test]
    fn test_session_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("sub").join("session.json"));
        assert_eq!(store.load(), SessionState::default());

        let state = SessionState {
            symbol: Symbol::parse("INFY.BO"),
            display_name: Some("Infosys".to_string()),
        };
        store.save(&state).unwrap();
        assert_eq!(store.load(), state);

        fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load(), SessionState::default());
    }
}
