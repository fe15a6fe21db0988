use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::WatchConfig;
use crate::models::PriceRecord;
use crate::utils::error::Result;

/// Everything a notifier needs to tell the recipient the price is in budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceAlert {
    pub title: String,
    pub currency_symbol: String,
    pub current_price: Decimal,
    pub budget: Decimal,
    pub url: String,
}

impl PriceAlert {
    pub fn new(record: &PriceRecord, config: &WatchConfig) -> Self {
        Self {
            title: record.title.clone(),
            currency_symbol: record.currency_symbol.clone(),
            current_price: record.amount,
            budget: config.budget(),
            url: config.url().to_string(),
        }
    }

    pub fn formatted_price(&self) -> String {
        format!("{}{}", self.currency_symbol, self.current_price)
    }

    pub fn formatted_budget(&self) -> String {
        format!("{}{}", self.currency_symbol, self.budget)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Trait for delivering a price alert (email, ...).
///
/// Delivery failures are reported through [`NotificationResult::failed`];
/// `Err` is reserved for alerts that could not be turned into a message at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    async fn notify(&self, alert: &PriceAlert) -> Result<NotificationResult>;
}
