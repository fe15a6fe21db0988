// Watch loop against a fake product page server

use super::*;
use rust_decimal_macros::dec;
use uatu_pricewatch::{
    AppError, PriceWatcher, WatchConfig, WatchOutcome,
    fetcher::HttpFetcher,
    plugins::trackers::MissingElement,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn build_watcher(
    config: WatchConfig,
    notifier: &RecordingNotifier,
    console: &CapturedConsole,
) -> PriceWatcher {
    let fetcher = HttpFetcher::new(config.request_timeout()).unwrap();
    PriceWatcher::new(config, Box::new(fetcher), Box::new(notifier.clone()))
        .unwrap()
        .with_console(console.console())
}

async fn product_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), PRODUCT_PATH)
}

#[tokio::test]
async fn test_price_at_budget_notifies_once() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .respond_with(page_response(product_page("449", "00")))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(watch_config(&product_url(&server).await, dec!(449)), &notifier, &console);

    let outcome = watcher.run().await?;

    assert!(matches!(outcome, WatchOutcome::Notified(ref result) if result.success));
    let alerts = notifier.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].current_price, dec!(449));
    assert_eq!(alerts[0].budget, dec!(449));
    assert_eq!(alerts[0].currency_symbol, "₹");
    assert_eq!(alerts[0].title, "boAt Bassheads 242 in Ear Wired Earphones with Mic");
    assert_eq!(alerts[0].url, product_url(&server).await);

    let output = console.contents();
    assert!(output.contains("Product name  : boAt Bassheads 242 in Ear Wired Earphones with Mic"));
    assert!(output.contains("Product price : ₹449.00"));
    assert!(output.contains("Your budget   : ₹449"));
    assert!(output.contains("Email sent successfully."));
    assert!(!output.contains("more than your budget"));
    Ok(())
}

#[tokio::test]
async fn test_above_budget_repolls_and_reports_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .respond_with(page_response(product_page("1,499", "00")))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .respond_with(page_response(product_page("449", "00")))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(watch_config(&product_url(&server).await, dec!(449)), &notifier, &console);

    watcher.run().await.unwrap();

    let output = console.contents();
    assert_eq!(output.matches("Product name  :").count(), 1);
    assert_eq!(output.matches("Your budget   :").count(), 1);
    assert!(output.contains("Product price : ₹1499.00"));
    assert_eq!(
        output.matches("Current price(₹1499.00) is more than your budget.").count(),
        3
    );
    assert_eq!(notifier.alerts().len(), 1);
    assert_eq!(watcher.cycles(), 4);
}

#[tokio::test]
async fn test_no_fetch_after_notification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_PATH))
        .respond_with(page_response(product_page("399", "00")))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::failing("535 5.7.8 Username and Password not accepted");
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(watch_config(&product_url(&server).await, dec!(449)), &notifier, &console);

    let outcome = watcher.run().await.unwrap();

    assert!(matches!(outcome, WatchOutcome::Notified(ref result) if !result.success));
    assert_eq!(notifier.alerts().len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
    assert!(console
        .contents()
        .contains("An error occured[sending email] : 535 5.7.8 Username and Password not accepted"));
}

#[tokio::test]
async fn test_unavailable_product_stops_quietly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page_response(unavailable_page()))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(watch_config(&product_url(&server).await, dec!(449)), &notifier, &console);

    let outcome = watcher.run().await.unwrap();

    assert_eq!(outcome, WatchOutcome::Unavailable(MissingElement::PriceBlock));
    assert!(notifier.alerts().is_empty());
    assert_eq!(console.contents(), "Product price not found!\n");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_title_stops_quietly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>Sorry! Something went wrong!</html>"))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(watch_config(&product_url(&server).await, dec!(449)), &notifier, &console);

    let outcome = watcher.run().await.unwrap();

    assert_eq!(outcome, WatchOutcome::Unavailable(MissingElement::Title));
    assert_eq!(console.contents(), "Product title not found!\n");
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "PriceWatchTest/2.0"))
        .respond_with(page_response(product_page("100", "00")))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = watch_settings(&product_url(&server).await, dec!(449));
    settings.user_agent = Some("PriceWatchTest/2.0".to_string());
    let config = WatchConfig::new(settings).unwrap();

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(config, &notifier, &console);

    watcher.run().await.unwrap();
    assert_eq!(notifier.alerts().len(), 1);
}

#[tokio::test]
async fn test_changed_price_layout_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page_response(
            r#"<span id="productTitle">Earphones</span>
               <div id="corePriceDisplay_desktop_feature_div"><span class="price">₹449</span></div>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(watch_config(&product_url(&server).await, dec!(449)), &notifier, &console);

    let result = watcher.run().await;

    assert!(matches!(result, Err(AppError::Structure { .. })));
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_continuous_watch_keeps_polling_after_alert() {
    let server = MockServer::start().await;
    for (whole, times) in [("449", 2), ("600", 1), ("400", 1)] {
        Mock::given(method("GET"))
            .respond_with(page_response(product_page(whole, "00")))
            .up_to_n_times(times)
            .mount(&server)
            .await;
    }
    // Anything after that breaks the layout and ends the watch.
    Mock::given(method("GET"))
        .respond_with(page_response(
            r#"<span id="productTitle">x</span><div id="corePriceDisplay_desktop_feature_div"></div>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let mut settings = watch_settings(&product_url(&server).await, dec!(449));
    settings.continuous = Some(true);
    let config = WatchConfig::new(settings).unwrap();

    let notifier = RecordingNotifier::delivering();
    let console = CapturedConsole::default();
    let mut watcher = build_watcher(config, &notifier, &console);

    assert!(watcher.run().await.is_err());

    let prices: Vec<_> = notifier.alerts().iter().map(|a| a.current_price).collect();
    assert_eq!(prices, vec![dec!(449), dec!(400)]);
    assert_eq!(watcher.cycles(), 5);
}
