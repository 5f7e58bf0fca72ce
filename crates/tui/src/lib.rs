pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod tui;

pub use wut_core as core;
pub use wut_core::model;

pub use wut_core::AppConfig;
