//! UI widgets for the dashboard
//!
//! Each widget renders one region of the screen; state lives in the app.

pub mod chart_view;
pub mod log_view;
pub mod news_view;
pub mod panels_view;
pub mod search_box;
pub mod suggestions;
