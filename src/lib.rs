pub mod config;
pub mod console;
pub mod fetcher;
pub mod models;
pub mod plugins;
pub mod utils;
pub mod watcher;

// Re-export commonly used types
pub use config::{WatchConfig, WatchSettings};
pub use utils::error::AppError;
pub use watcher::{CycleOutcome, PriceWatcher, WatchOutcome};

pub type Result<T> = std::result::Result<T, AppError>;
