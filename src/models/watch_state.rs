/// State the watch loop carries from one poll cycle to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    has_reported_once: bool,
    alerted: bool,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_reported_once(&self) -> bool {
        self.has_reported_once
    }

    /// Returns `true` only the first time it is called.
    pub fn claim_first_report(&mut self) -> bool {
        !std::mem::replace(&mut self.has_reported_once, true)
    }

    /// Whether an alert went out and the price has not left the budget since.
    pub fn alerted(&self) -> bool {
        self.alerted
    }

    pub fn mark_alerted(&mut self) {
        self.alerted = true;
    }

    pub fn clear_alert(&mut self) {
        self.alerted = false;
    }
}
