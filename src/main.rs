//! Fare watcher binary entrypoint.
//! Loads configuration, starts the polling loop in the background and serves
//! chat commands on the main task until Ctrl-C.

use std::time::Duration;

use anyhow::Result;
use fare_watcher::bot::{self, WatchSummary};
use fare_watcher::fares::aviasales::AviasalesClient;
use fare_watcher::notify::telegram::TelegramNotifier;
use fare_watcher::{telemetry, Settings, WatchPlan, Watcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when variables come from the environment.
    let _ = dotenvy::dotenv();

    let settings = Settings::load()?;
    telemetry::init_tracing(settings.log_json);
    telemetry::describe_metrics();
    if let Some(addr) = settings.metrics_listen {
        telemetry::install_metrics_exporter(addr)?;
    }

    let source = AviasalesClient::new(
        settings.aviasales_token.clone(),
        Duration::from_secs(settings.http_timeout_secs),
    )?
    .with_offers_per_route(settings.offers_per_route);
    let notifier = TelegramNotifier::new(settings.telegram_bot_token.clone())
        .with_timeout(settings.http_timeout_secs);

    let watcher = Watcher::new(source, notifier, WatchPlan::from_settings(&settings));
    let watch_task = tokio::spawn(watcher.run());

    if settings.command_bot {
        bot::run_command_bot(
            settings.telegram_bot_token.clone(),
            WatchSummary::from_settings(&settings),
        )
        .await;
        watch_task.abort();
    } else {
        tokio::signal::ctrl_c().await?;
        watch_task.abort();
    }

    tracing::info!("fare watcher stopped");
    Ok(())
}
