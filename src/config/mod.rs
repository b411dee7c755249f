//! Configuration module
//!
//! Settings for the market API, search behaviour, widget panels,
//! chart, news feed, watchlist and session restore.

pub mod config;

pub use config::Config;
