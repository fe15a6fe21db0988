use crate::config::WatchConfig;
use crate::plugins::traits::{NotificationResult, NotifierPlugin, PriceAlert};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use tracing::{debug, warn};

pub const SUBJECT: &str = "Price changed!!!";

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    password: String,
    pub from_email: String,
    pub to_email: String,
}

impl EmailConfig {
    /// The sender address doubles as the SMTP login.
    pub fn from_watch_config(config: &WatchConfig) -> Self {
        EmailConfig {
            smtp_server: config.smtp_host().to_string(),
            smtp_port: config.smtp_port(),
            username: config.sender_email().to_string(),
            password: config.sender_password().to_string(),
            from_email: config.sender_email().to_string(),
            to_email: config.receiver_email().to_string(),
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .finish()
    }
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        EmailNotifier { config }
    }

    fn format_html_body(&self, alert: &PriceAlert) -> String {
        format!(
            r#"
<h1>Product price changed</h1>
<hr/>
<div>
    <div>Product Title : {}</div>
    <br/>
    <div>Product Price(current) : {}</div>
    <br/>
    <div>Your Budget : {}</div>
</div>
<hr/>
<div>
    <a href="{}">Click to open product page</a>
</div>
"#,
            escape_html(&alert.title),
            escape_html(&alert.formatted_price()),
            escape_html(&alert.formatted_budget()),
            escape_html(&alert.url),
        )
    }

    fn format_text_body(&self, alert: &PriceAlert) -> String {
        let mut text = String::new();

        text.push_str("Product price changed\n\n");
        text.push_str(&format!("Product Title : {}\n", alert.title));
        text.push_str(&format!("Product Price(current) : {}\n", alert.formatted_price()));
        text.push_str(&format!("Your Budget : {}\n\n", alert.formatted_budget()));
        text.push_str(&format!("Product page: {}\n", alert.url));

        text
    }

    pub fn build_message(&self, alert: &PriceAlert) -> Result<Message> {
        let from = parse_mailbox(&self.config.from_email, "sender")?;
        let to = parse_mailbox(&self.config.to_email, "recipient")?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(self.format_text_body(alert)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(self.format_html_body(alert)),
                    ),
            )
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))
    }

    /// STARTTLS upgrade happens before credentials are sent.
    fn build_transport(
        &self,
    ) -> std::result::Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
        let credentials = Credentials::new(self.config.username.clone(), self.config.password.clone());

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)?
                .port(self.config.smtp_port)
                .credentials(credentials)
                .build(),
        )
    }
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<NotificationResult> {
        let email = self.build_message(alert)?;

        let mailer = match self.build_transport() {
            Ok(mailer) => mailer,
            Err(e) => {
                warn!(error = %e, server = %self.config.smtp_server, "could not set up SMTP transport");
                return Ok(NotificationResult::failed(e.to_string()));
            }
        };

        match mailer.send(email).await {
            Ok(response) => {
                debug!(code = %response.code(), "SMTP server accepted message");
                Ok(NotificationResult::sent(format!(
                    "email-{}",
                    chrono::Utc::now().timestamp()
                )))
            }
            Err(e) => {
                warn!(error = %e, server = %self.config.smtp_server, "sending email failed");
                Ok(NotificationResult::failed(e.to_string()))
            }
        }
    }
}

fn parse_mailbox(address: &str, role: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::Notification(format!("Invalid {} address '{}': {}", role, address, e)))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
