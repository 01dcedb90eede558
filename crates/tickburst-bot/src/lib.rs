//! Application wiring for the tickburst burst driver.

pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
