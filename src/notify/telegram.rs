use super::{FareAlert, Notifier};
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const MAX_ATTEMPTS: u8 = 2;

#[derive(Clone)]
pub struct TelegramNotifier {
    bot_token: String,
    api_base: String,
    client: Client,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

/// Plain-text body of a fare alert.
pub fn format_message(alert: &FareAlert) -> String {
    format!(
        "✈️ Cheap fare found\n\n{} → {}\nDate: {} ({})\nPrice: {} {}\n\nBuy ticket:\n{}",
        alert.origin,
        alert.destination,
        alert.date,
        alert.weekday,
        alert.price,
        alert.currency.to_ascii_uppercase(),
        alert.link
    )
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, alert: &FareAlert) -> Result<()> {
        let text = format_message(alert);
        let payload = SendMessage {
            chat_id: alert.chat_id,
            text: &text,
            disable_web_page_preview: false,
        };
        let url = self.endpoint();

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&url)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            // reqwest errors may embed the URL, which carries the bot token
            let err = match res {
                Ok(rsp) => match rsp.error_for_status() {
                    Ok(_) => return Ok(()),
                    Err(e) => anyhow!(
                        "telegram sendMessage HTTP {}",
                        e.status().map(|s| s.to_string()).unwrap_or_default()
                    ),
                },
                Err(e) => anyhow!("telegram sendMessage request failed: {}", e.without_url()),
            };

            if attempt >= MAX_ATTEMPTS {
                return Err(err.context(format!(
                    "deliver alert {} → {}",
                    alert.origin, alert.destination
                )));
            }
            tracing::debug!(attempt, error = %err, "telegram send failed, retrying");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1).min(6))).await;
        }
    }
}
