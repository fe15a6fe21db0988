use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use uatu_pricewatch::fetcher::HttpFetcher;
use uatu_pricewatch::plugins::notifiers::{EmailConfig, EmailNotifier};
use uatu_pricewatch::{PriceWatcher, WatchConfig, WatchOutcome, WatchSettings};

#[derive(Parser, Debug)]
#[command(version, about = "Watches a product page and emails you once the price reaches your budget")]
struct Args {
    /// Path to a config file (toml, yaml or json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep watching after a notification instead of exiting
    #[arg(long)]
    continuous: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for the watch output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uatu_pricewatch=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut settings = WatchSettings::load(args.config.as_deref())?;
    if args.continuous {
        settings.continuous = Some(true);
    }
    let config = WatchConfig::new(settings)?;

    info!(url = config.url(), budget = %config.budget(), "Starting Uatu price watch...");

    let fetcher = HttpFetcher::new(config.request_timeout())?;
    let notifier = EmailNotifier::new(EmailConfig::from_watch_config(&config));
    let mut watcher = PriceWatcher::new(config, Box::new(fetcher), Box::new(notifier))?;

    tokio::select! {
        outcome = watcher.run() => {
            match outcome? {
                WatchOutcome::Notified(result) => {
                    info!(delivered = result.success, "Budget reached, watch finished");
                }
                WatchOutcome::Unavailable(missing) => {
                    info!(?missing, "Product details unavailable, watch finished");
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
