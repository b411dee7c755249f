//! Exchange-qualified ticker symbols
//!
//! Every symbol that flows through search, quotes and the widget panels
//! carries one of the two recognized Indian exchange suffixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The exchanges a symbol can be listed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    Nse,
    Bse,
}

impl Exchange {
    pub const ALL: [Exchange; 2] = [Exchange::Nse, Exchange::Bse];

    /// Yahoo-style ticker suffix
    pub fn suffix(self) -> &'static str {
        match self {
            Exchange::Nse => ".NS",
            Exchange::Bse => ".BO",
        }
    }

    /// Exchange code used by charting and embed providers
    pub fn code(self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
        }
    }

    /// Attach this exchange's suffix to a bare symbol
    pub fn qualify(self, bare: &str) -> String {
        format!("{}{}", bare, self.suffix())
    }
}

/// A ticker that always ends in `.NS` or `.BO`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    raw: String,
    exchange: Exchange,
}

impl Symbol {
    /// Parse an exchange-qualified symbol, returning None for anything
    /// without a recognized suffix or with nothing in front of it
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Exchange::ALL.iter().find_map(|&exchange| {
            let bare = raw.strip_suffix(exchange.suffix())?;
            if bare.is_empty() {
                return None;
            }
            Some(Self {
                raw: raw.to_string(),
                exchange,
            })
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// The symbol with its exchange suffix stripped
    pub fn bare(&self) -> &str {
        &self.raw[..self.raw.len() - self.exchange.suffix().len()]
    }

    /// `NSE:TCS` style form used by charting providers
    pub fn prefixed(&self) -> String {
        format!("{}:{}", self.exchange.code(), self.bare())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value).ok_or_else(|| format!("not an exchange-qualified symbol: {value}"))
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.raw
    }
}
