// src/bot.rs
//! Chat command responder. Stateless: answers from static configuration and
//! never touches the watcher or its ledger.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info};

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
}

/// Parse `/start`, `/help` and their `/cmd@botname` forms. Anything else is
/// not for us.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let raw = text.split_whitespace().next()?;
    let cmd = raw.split_once('@').map_or(raw, |(head, _)| head);
    match cmd {
        "/start" => Some(BotCommand::Start),
        "/help" => Some(BotCommand::Help),
        _ => None,
    }
}

/// What the bot knows about the watch list.
#[derive(Debug, Clone)]
pub struct WatchSummary {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub dates: Vec<String>,
    pub max_price: u64,
    pub currency: String,
}

impl WatchSummary {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            origins: s.origins.clone(),
            destinations: s.destinations.clone(),
            dates: s
                .dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            max_price: s.max_price,
            currency: s.currency.clone(),
        }
    }
}

pub fn reply_for(cmd: BotCommand, summary: &WatchSummary) -> String {
    match cmd {
        BotCommand::Start => format!(
            "Hi! I'm watching fares.\nRoutes: {} → {}\nDates: {}\nMax price: {} {}",
            summary.origins.join(", "),
            summary.destinations.join(", "),
            summary.dates.join(", "),
            summary.max_price,
            summary.currency.to_ascii_uppercase()
        ),
        BotCommand::Help => "/start - what is being watched\n/help - this message".to_string(),
    }
}

/// Long-poll Telegram for commands until the process receives Ctrl-C.
pub async fn run_command_bot(bot_token: String, summary: WatchSummary) {
    let bot = Bot::new(bot_token);
    let summary = Arc::new(summary);
    info!("command bot is running");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let summary = Arc::clone(&summary);
        async move {
            let Some(cmd) = msg.text().and_then(parse_command) else {
                return respond(());
            };
            if let Err(e) = bot.send_message(msg.chat.id, reply_for(cmd, &summary)).await {
                error!(error = %e, chat_id = msg.chat.id.0, "command reply failed");
            }
            respond(())
        }
    })
    .await;

    info!("command bot stopped");
}
