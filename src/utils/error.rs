use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page structure error: {message}")]
    Structure { message: String },

    #[error("Invalid selector: {selector}")]
    Selector { selector: String },

    #[error("Notification error: {0}")]
    Notification(String),
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
