//! Terminal dashboard for NSE/BSE listed stocks
//!
//! Type a company name, pick one of the suggested listings, and every panel,
//! the intraday chart and the price header follow the selection.

pub mod api;
pub mod config;
pub mod controller;
pub mod news;
pub mod orchestrator;
pub mod quote;
pub mod resolver;
pub mod session;
pub mod symbol;
pub mod ui;
pub mod utils;
pub mod watchlist;
pub mod widgets;
