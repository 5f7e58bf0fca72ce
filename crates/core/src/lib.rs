pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod ordering;
pub mod patch;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use api::{ClientOptions, HttpTransport, TodoApi, TodoClient, Transport};
pub use commands::{complete_tasks, delete_tasks};
pub use config::AppConfig;
pub use error::ApiError;
pub use model::*;
pub use patch::Patch;
