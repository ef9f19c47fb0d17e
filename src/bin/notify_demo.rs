//! Sends one sample fare alert through the configured Telegram bot, to check
//! credentials and message layout without waiting for a real price drop.

use anyhow::{Context, Result};
use fare_watcher::notify::telegram::TelegramNotifier;
use fare_watcher::{FareAlert, Notifier};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let token = std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN missing")?;
    let chat_id: i64 = std::env::var("TELEGRAM_USER_ID")
        .context("TELEGRAM_USER_ID missing")?
        .parse()
        .context("TELEGRAM_USER_ID is not a number")?;

    let alert = FareAlert {
        chat_id,
        origin: "MOW".into(),
        destination: "LED".into(),
        date: "2025-06-02".into(),
        weekday: "Monday".into(),
        price: 2990,
        currency: "rub".into(),
        link: "https://www.aviasales.ru/search/MOW0206LED1".into(),
    };

    TelegramNotifier::new(token).send(&alert).await?;
    println!("notify-demo done");
    Ok(())
}
