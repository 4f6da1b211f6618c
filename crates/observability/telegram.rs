use anyhow::Result;
use async_trait::async_trait;
use chrono::SecondsFormat;

use super::notifier::{AlertEvent, AlertSink};
use crate::domain::{repositories::messaging::MessageSender, value_objects::messaging::OutgoingMessage};
use crate::infra::messaging::telegram_bot::{TelegramBotClient, TelegramBotConfig};

// Telegram rejects messages longer than 4096 characters.
const MESSAGE_LIMIT: usize = 4096;

/// Posts alerts to the ops chat.
pub(crate) struct TelegramAlertSink {
    bot: TelegramBotClient,
}

impl TelegramAlertSink {
    pub(crate) fn new(bot_token: String, chat_id: String) -> Result<Self> {
        let bot = TelegramBotClient::new(TelegramBotConfig { bot_token, chat_id })?;
        Ok(Self { bot })
    }
}

#[async_trait]
impl AlertSink for TelegramAlertSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<()> {
        let mut message = OutgoingMessage::plain(format_alert(event));
        message.disable_preview = true;
        self.bot.send_message(message).await
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

pub(crate) fn format_alert(event: &AlertEvent) -> String {
    let mut lines = vec![
        format!(
            "[{}] {} / {} / {}",
            event.level, event.service.service_name, event.service.environment, event.service.component
        ),
        format!(
            "{} {}{}",
            event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            event.target,
            event
                .location
                .as_deref()
                .map(|location| format!(" ({location})"))
                .unwrap_or_default()
        ),
    ];

    if let Some(message) = event.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(message.to_string());
    }
    if !event.spans.is_empty() {
        lines.push(format!("spans: {}", event.spans.join(" > ")));
    }
    for (key, value) in &event.fields {
        lines.push(format!("{key} = {value}"));
    }

    truncate(lines.join("\n"))
}

fn truncate(content: String) -> String {
    const SUFFIX: &str = "\n… (truncated)";

    if content.chars().count() <= MESSAGE_LIMIT {
        return content;
    }

    let keep = MESSAGE_LIMIT - SUFFIX.chars().count();
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(SUFFIX);
    truncated
}
