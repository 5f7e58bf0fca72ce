pub use wut_tui::cli;
pub use wut_tui::commands;
pub use wut_tui::config;
pub use wut_tui::logging;
pub use wut_tui::tui;
pub use wut_tui::AppConfig;

pub use wut_core as core;
pub use wut_core::model;
