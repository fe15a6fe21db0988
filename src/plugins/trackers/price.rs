use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;

use crate::config::WatchConfig;
use crate::models::PriceRecord;
use crate::utils::error::{AppError, Result};

const SYMBOL_SELECTOR: &str = "span.a-price-symbol";
const WHOLE_SELECTOR: &str = "span.a-price-whole";
const FRACTION_SELECTOR: &str = "span.a-price-fraction";

/// Which of the two top-level page elements could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingElement {
    Title,
    PriceBlock,
}

impl MissingElement {
    pub fn diagnostic(&self) -> &'static str {
        match self {
            MissingElement::Title => "Product title not found!",
            MissingElement::PriceBlock => "Product price not found!",
        }
    }
}

/// Outcome of reading one product page.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(PriceRecord),
    /// The page does not currently show the product (or uses another layout).
    Absent(MissingElement),
    /// The price block exists but not in the shape we know how to read.
    StructuralError(String),
}

impl Extraction {
    pub fn into_record(self) -> Option<PriceRecord> {
        match self {
            Extraction::Found(record) => Some(record),
            _ => None,
        }
    }
}

pub struct PriceExtractor {
    title: Selector,
    price_block: Selector,
    symbol: Selector,
    whole: Selector,
    fraction: Selector,
}

impl PriceExtractor {
    pub fn new(title_selector: &str, price_selector: &str) -> Result<Self> {
        Ok(PriceExtractor {
            title: parse_selector(title_selector)?,
            price_block: parse_selector(price_selector)?,
            symbol: parse_selector(SYMBOL_SELECTOR)?,
            whole: parse_selector(WHOLE_SELECTOR)?,
            fraction: parse_selector(FRACTION_SELECTOR)?,
        })
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(config.title_selector(), config.price_selector())
    }

    pub fn extract(&self, raw_content: &[u8]) -> Extraction {
        let html = String::from_utf8_lossy(raw_content);
        let document = Html::parse_document(&html);

        let Some(title) = document.select(&self.title).next() else {
            return Extraction::Absent(MissingElement::Title);
        };
        let Some(price_block) = document.select(&self.price_block).next() else {
            return Extraction::Absent(MissingElement::PriceBlock);
        };

        let title = element_text(title);
        if title.is_empty() {
            return Extraction::Absent(MissingElement::Title);
        }

        match self.read_price(price_block) {
            Ok((currency_symbol, amount)) => {
                Extraction::Found(PriceRecord::new(title, amount, currency_symbol))
            }
            Err(reason) => Extraction::StructuralError(reason),
        }
    }

    fn read_price(&self, price_block: ElementRef<'_>) -> std::result::Result<(String, Decimal), String> {
        let symbol = required_text(price_block, &self.symbol, SYMBOL_SELECTOR)?;
        let whole = required_text(price_block, &self.whole, WHOLE_SELECTOR)?;
        let fraction = required_text(price_block, &self.fraction, FRACTION_SELECTOR)?;
        Ok((symbol, assemble_amount(&whole, &fraction)?))
    }
}

/// Builds a decimal from the whole and fractional price fragments.
///
/// `"1,499."` and `"00"` give `1499.00`: grouping commas and a trailing
/// decimal point on the whole part are dropped.
pub fn assemble_amount(whole: &str, fraction: &str) -> std::result::Result<Decimal, String> {
    let whole = whole.trim().replace(',', "");
    let whole = whole.trim_end_matches('.');
    let fraction = fraction.trim();

    let text = format!("{}.{}", whole, fraction);
    let amount = Decimal::from_str(&text)
        .map_err(|e| format!("price '{}' is not a decimal number: {}", text, e))?;

    if amount < Decimal::ZERO {
        return Err(format!("price '{}' is negative", text));
    }

    Ok(amount)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| AppError::Selector {
        selector: selector.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn required_text(
    container: ElementRef<'_>,
    selector: &Selector,
    name: &str,
) -> std::result::Result<String, String> {
    container
        .select(selector)
        .next()
        .map(element_text)
        .ok_or_else(|| format!("price block has no '{}' element", name))
}
