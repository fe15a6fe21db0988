use std::time::Duration;

use crate::config::WatchConfig;
use crate::console::Console;
use crate::fetcher::PageFetcher;
use crate::models::{PriceRecord, WatchState};
use crate::plugins::trackers::{Extraction, MissingElement, PriceExtractor};
use crate::plugins::traits::{NotificationResult, NotifierPlugin, PriceAlert};
use crate::utils::error::{AppError, Result};

/// What a single fetch → extract → decide pass ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Absent(MissingElement),
    AboveBudget(PriceRecord),
    Notified(NotificationResult),
    /// Continuous mode: still within budget, and the alert already went out.
    StillWithinBudget(PriceRecord),
}

/// How a (non-continuous) watch finished.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// The price reached the budget and one notification attempt was made.
    Notified(NotificationResult),
    /// The page did not show the product details.
    Unavailable(MissingElement),
}

pub struct PriceWatcher {
    config: WatchConfig,
    fetcher: Box<dyn PageFetcher>,
    extractor: PriceExtractor,
    notifier: Box<dyn NotifierPlugin>,
    console: Console,
    state: WatchState,
    cycles: u64,
}

impl PriceWatcher {
    pub fn new(
        config: WatchConfig,
        fetcher: Box<dyn PageFetcher>,
        notifier: Box<dyn NotifierPlugin>,
    ) -> Result<Self> {
        let extractor = PriceExtractor::from_config(&config)?;

        Ok(Self {
            config,
            fetcher,
            extractor,
            notifier,
            console: Console::stdout(),
            state: WatchState::new(),
            cycles: 0,
        })
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Number of poll cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Polls until the watch is fulfilled.
    ///
    /// Without `continuous`, returns after the first notification attempt
    /// (whether or not it was delivered) or the first cycle that finds no
    /// product details. With `continuous`, only errors end the loop.
    pub async fn run(&mut self) -> Result<WatchOutcome> {
        let continuous = self.config.continuous();

        loop {
            match self.poll_once().await? {
                CycleOutcome::Absent(missing) if !continuous => {
                    return Ok(WatchOutcome::Unavailable(missing));
                }
                CycleOutcome::Notified(result) if !continuous => {
                    return Ok(WatchOutcome::Notified(result));
                }
                _ => {}
            }

            self.wait_for_next_cycle().await;
        }
    }

    /// Runs one cycle. Fetch failures and unreadable price blocks are returned as errors.
    pub async fn poll_once(&mut self) -> Result<CycleOutcome> {
        self.cycles += 1;
        tracing::debug!(cycle = self.cycles, url = self.config.url(), "polling product page");

        let body = self
            .fetcher
            .fetch(self.config.url(), self.config.user_agent())
            .await?;

        let record = match self.extractor.extract(&body) {
            Extraction::Found(record) => record,
            Extraction::Absent(missing) => {
                self.console.line(missing.diagnostic());
                tracing::info!(?missing, "product details not found on page");
                return Ok(CycleOutcome::Absent(missing));
            }
            Extraction::StructuralError(message) => {
                tracing::error!(%message, "price block layout not recognised");
                return Err(AppError::Structure { message });
            }
        };

        self.report_once(&record);

        if record.is_within(self.config.budget()) {
            if self.state.alerted() {
                tracing::debug!(price = %record.amount, "still within budget, already notified");
                return Ok(CycleOutcome::StillWithinBudget(record));
            }

            let result = self.send_alert(&record).await;
            self.state.mark_alerted();
            Ok(CycleOutcome::Notified(result))
        } else {
            self.state.clear_alert();
            self.console.line(&format!(
                "Current price({}) is more than your budget.",
                record.formatted_amount()
            ));
            tracing::info!(price = %record.amount, budget = %self.config.budget(), "price above budget");
            Ok(CycleOutcome::AboveBudget(record))
        }
    }

    fn report_once(&mut self, record: &PriceRecord) {
        if !self.state.claim_first_report() {
            return;
        }

        self.console.line(&format!("Product name  : {}", record.title));
        self.console.line(&format!("Product price : {}", record.formatted_amount()));
        self.console.line(&format!(
            "Your budget   : {}",
            record.format_value(self.config.budget())
        ));
    }

    async fn send_alert(&mut self, record: &PriceRecord) -> NotificationResult {
        let alert = PriceAlert::new(record, &self.config);

        let result = match self.notifier.notify(&alert).await {
            Ok(result) => result,
            Err(e) => NotificationResult::failed(e.to_string()),
        };

        if result.success {
            self.console.line("Email sent successfully.");
            tracing::info!(message_id = ?result.message_id, price = %alert.current_price, "price alert sent");
        } else {
            let reason = result.error.as_deref().unwrap_or("unknown error");
            self.console.line(&format!("An error occured[sending email] : {}", reason));
            tracing::error!(error = reason, "price alert could not be sent");
        }

        result
    }

    async fn wait_for_next_cycle(&mut self) {
        let total = self.config.poll_interval_secs();
        if total == 0 {
            return;
        }

        for remaining in (1..=total).rev() {
            self.console
                .status(&format!("waiting for {} second(s).", remaining));
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        self.console.end_status();
        self.console.line("\nrunning script again");
    }
}
