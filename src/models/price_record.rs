use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product's title and price as read from one fetch of its page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    pub title: String,
    pub amount: Decimal,
    pub currency_symbol: String,
}

impl PriceRecord {
    pub fn new(title: String, amount: Decimal, currency_symbol: String) -> Self {
        Self {
            title,
            amount,
            currency_symbol,
        }
    }

    pub fn formatted_amount(&self) -> String {
        self.format_value(self.amount)
    }

    /// Formats any amount (e.g. the budget) with this record's currency symbol.
    pub fn format_value(&self, value: Decimal) -> String {
        format!("{}{}", self.currency_symbol, value)
    }

    pub fn is_within(&self, budget: Decimal) -> bool {
        self.amount <= budget
    }
}
