pub mod notifier;

pub use notifier::{NotifierPlugin, NotificationResult, PriceAlert};
