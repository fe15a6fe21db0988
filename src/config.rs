use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/104.0.0.0 Safari/537.36";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_TITLE_SELECTOR: &str = "span#productTitle";
pub const DEFAULT_PRICE_SELECTOR: &str = "div#corePriceDisplay_desktop_feature_div";

/// Raw watch options as they come out of files and the environment.
///
/// Everything is optional here; [`WatchConfig::new`] decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchSettings {
    pub url: Option<String>,
    pub budget_price: Option<Decimal>,
    #[serde(rename = "user-agent", alias = "user_agent")]
    pub user_agent: Option<String>,
    /// Seconds to wait between polls.
    pub timeout: Option<u64>,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub receiver_email: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub request_timeout: Option<u64>,
    pub title_selector: Option<String>,
    pub price_selector: Option<String>,
    pub continuous: Option<bool>,
}

impl WatchSettings {
    /// Layers `config/default`, an optional explicit file and `UATU__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("UATU").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Validated, immutable configuration for a single watch.
#[derive(Clone, Validate)]
pub struct WatchConfig {
    #[validate(url(message = "url must be an absolute URL"))]
    url: String,
    budget: Decimal,
    #[validate(length(min = 1, message = "user-agent must not be empty"))]
    user_agent: String,
    poll_interval_secs: u64,
    #[validate(length(min = 1, message = "sender_email must not be empty"))]
    sender_email: String,
    #[validate(length(min = 1, message = "sender_password must not be empty"))]
    sender_password: String,
    #[validate(length(min = 1, message = "receiver_email must not be empty"))]
    receiver_email: String,
    #[validate(length(min = 1, message = "smtp_host must not be empty"))]
    smtp_host: String,
    smtp_port: u16,
    request_timeout_secs: u64,
    title_selector: String,
    price_selector: String,
    continuous: bool,
}

impl WatchConfig {
    pub fn new(settings: WatchSettings) -> Result<Self, ConfigError> {
        let url = required(settings.url, "url")?;
        let budget = settings
            .budget_price
            .ok_or_else(|| ConfigError::Message("budget_price is missing!".into()))?;
        if budget <= Decimal::ZERO {
            return Err(ConfigError::Message("budget_price must be greater than 0".into()));
        }

        let config = WatchConfig {
            url,
            budget,
            user_agent: settings.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            poll_interval_secs: settings.timeout.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            sender_email: required(settings.sender_email, "sender_email")?,
            sender_password: required(settings.sender_password, "sender_password")?,
            receiver_email: required(settings.receiver_email, "receiver_email")?,
            smtp_host: settings.smtp_host.unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: settings.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            request_timeout_secs: settings.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            title_selector: settings
                .title_selector
                .unwrap_or_else(|| DEFAULT_TITLE_SELECTOR.to_string()),
            price_selector: settings
                .price_selector
                .unwrap_or_else(|| DEFAULT_PRICE_SELECTOR.to_string()),
            continuous: settings.continuous.unwrap_or(false),
        };

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Message(format!("Invalid watch configuration: {}", e)))?;

        let scheme = url::Url::parse(&self.url)
            .map(|parsed| parsed.scheme().to_string())
            .map_err(|e| ConfigError::Message(format!("url is not valid: {}", e)))?;
        if scheme != "http" && scheme != "https" {
            return Err(ConfigError::Message(format!(
                "url must use http or https, got '{}'",
                scheme
            )));
        }

        if self.smtp_port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message("request_timeout must be greater than 0".into()));
        }

        for (name, selector) in [
            ("title_selector", &self.title_selector),
            ("price_selector", &self.price_selector),
        ] {
            if scraper::Selector::parse(selector).is_err() {
                return Err(ConfigError::Message(format!(
                    "{} is not a valid CSS selector: {}",
                    name, selector
                )));
            }
        }

        Ok(())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sender_email(&self) -> &str {
        &self.sender_email
    }

    pub(crate) fn sender_password(&self) -> &str {
        &self.sender_password
    }

    pub fn receiver_email(&self) -> &str {
        &self.receiver_email
    }

    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    pub fn title_selector(&self) -> &str {
        &self.title_selector
    }

    pub fn price_selector(&self) -> &str {
        &self.price_selector
    }

    pub fn continuous(&self) -> bool {
        self.continuous
    }
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("url", &self.url)
            .field("budget", &self.budget)
            .field("user_agent", &self.user_agent)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .field("receiver_email", &self.receiver_email)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("title_selector", &self.title_selector)
            .field("price_selector", &self.price_selector)
            .field("continuous", &self.continuous)
            .finish()
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Message(format!("{} is missing!", name))),
    }
}
