//! Utility functions and helpers
//!
//! Paths, logging and input timing shared by the rest of the application.

pub mod app_paths;
pub mod debouncer;
pub mod dual_logging;
pub mod logging;
