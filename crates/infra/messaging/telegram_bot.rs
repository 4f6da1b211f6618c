use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{
    repositories::messaging::MessageSender,
    value_objects::messaging::{OutgoingMessage, ParseMode},
};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramBotConfig {
    pub bot_token: String,
    pub chat_id: String,
}

impl TelegramBotConfig {
    pub fn is_complete(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Posts to a single chat through the Telegram Bot API.
pub struct TelegramBotClient {
    client: Client,
    api_base: String,
    config: TelegramBotConfig,
}

impl TelegramBotClient {
    pub fn new(config: TelegramBotConfig) -> Result<Self> {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(config: TelegramBotConfig, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build Telegram http client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.config.bot_token, method)
    }
}

#[async_trait]
impl MessageSender for TelegramBotClient {
    fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    async fn send_message(&self, message: OutgoingMessage) -> Result<()> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: &message.text,
            parse_mode: message.parse_mode,
            disable_web_page_preview: message.disable_preview,
        };

        // The URL embeds the bot token; keep it out of error messages.
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|err| anyhow!("telegram request failed: {}", err.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Telegram API error ({status}): {error_text}"));
        }

        let payload = response
            .json::<TelegramApiResponse>()
            .await
            .map_err(|err| anyhow!("telegram response was not JSON: {}", err.without_url()))?;

        if !payload.ok {
            return Err(anyhow!(
                "{}",
                payload
                    .description
                    .unwrap_or_else(|| "Telegram API returned an error".to_string())
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: &str, chat_id: &str) -> TelegramBotConfig {
        TelegramBotConfig {
            bot_token: token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    #[test]
    fn needs_both_token_and_chat() {
        assert!(config("123:abc", "-100200").is_complete());
        assert!(!config(" ", "-100200").is_complete());
        assert!(!config("123:abc", "").is_complete());
    }

    #[test]
    fn builds_bot_method_url() {
        let client =
            TelegramBotClient::with_api_base(config("123:abc", "-1"), "http://localhost:9000/")
                .unwrap();

        assert_eq!(
            client.method_url("sendMessage"),
            "http://localhost:9000/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn omits_parse_mode_when_unset() {
        let body = SendMessageRequest {
            chat_id: "-1",
            text: "hi",
            parse_mode: None,
            disable_web_page_preview: true,
        };

        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("parse_mode").is_none());
        assert_eq!(json["disable_web_page_preview"], true);
    }

    // cargo test -p crates telegram_bot::tests::sends_real_message -- --ignored --nocapture
    #[tokio::test]
    #[ignore = "posts to a real Telegram chat; needs TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID"]
    async fn sends_real_message() {
        dotenvy::dotenv().ok();
        let client = TelegramBotClient::new(config(
            &std::env::var("TELEGRAM_BOT_TOKEN").unwrap(),
            &std::env::var("TELEGRAM_CHAT_ID").unwrap(),
        ))
        .unwrap();

        client
            .send_message(OutgoingMessage::plain("integration test"))
            .await
            .unwrap();
    }
}
