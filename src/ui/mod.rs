//! Terminal dashboard: event loop and rendering

pub mod app;
mod render;

pub use app::{initial_selection, AppMessage, AppServices, DashboardApp};
