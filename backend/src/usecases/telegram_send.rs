use std::sync::Arc;

use chrono::NaiveDate;
use crates::domain::{
    entities::zoom_links::DailyZoomLinkDetails,
    repositories::{
        messaging::MessageSender,
        zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
    },
    value_objects::{messaging::OutgoingMessage, zoom_links::daily_link_message},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::usecases::daily_links::{DailyLinkError, DailyLinkUseCase};

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram auto-send is disabled")]
    Disabled,
    #[error("telegram bot token or chat id is not configured")]
    NotConfigured,
    #[error(transparent)]
    DailyLink(#[from] DailyLinkError),
    #[error("telegram delivery failed: {0}")]
    Delivery(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl TelegramError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            TelegramError::Disabled => StatusCode::FORBIDDEN,
            TelegramError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            TelegramError::DailyLink(inner) => inner.status_code(),
            TelegramError::Delivery(_) => StatusCode::BAD_GATEWAY,
            TelegramError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "daily_link", rename_all = "snake_case")]
pub enum TelegramSendOutcome {
    Sent(DailyZoomLinkDetails),
    AlreadySent(DailyZoomLinkDetails),
    NoLink,
}

/// Posts the day's link to the program's Telegram chat at most once.
pub struct TelegramSendUseCase<Z, D, S>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
    sender: Arc<S>,
    enabled: bool,
}

impl<Z, D, S> TelegramSendUseCase<Z, D, S>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    pub fn new(daily_links: Arc<DailyLinkUseCase<Z, D>>, sender: Arc<S>, enabled: bool) -> Self {
        Self {
            daily_links,
            sender,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn send_daily_link(
        &self,
        date: NaiveDate,
    ) -> Result<TelegramSendOutcome, TelegramError> {
        if !self.enabled {
            return Err(TelegramError::Disabled);
        }
        if !self.sender.is_configured() {
            return Err(TelegramError::NotConfigured);
        }

        let Some(details) = self.daily_links.find_for_date(date).await? else {
            warn!(scheduled_for = %date, "telegram_send: no daily link to send");
            return Ok(TelegramSendOutcome::NoLink);
        };

        if details.is_sent() {
            info!(scheduled_for = %date, "telegram_send: already sent");
            return Ok(TelegramSendOutcome::AlreadySent(details));
        }

        let Some(url) = details.active_link().map(|link| link.url.clone()) else {
            warn!(scheduled_for = %date, "telegram_send: daily link has no active zoom link");
            return Ok(TelegramSendOutcome::NoLink);
        };

        self.sender
            .send_message(OutgoingMessage::plain(daily_link_message(date, &url)))
            .await
            .map_err(|err| {
                error!(scheduled_for = %date, error = ?err, "telegram_send: delivery failed");
                TelegramError::Delivery(err)
            })?;

        let details = self.daily_links.mark_sent(details.daily.id).await?;
        info!(scheduled_for = %date, "telegram_send: daily link sent");
        Ok(TelegramSendOutcome::Sent(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::zoom_links::{DailyZoomLinkEntity, ZoomLinkEntity},
        repositories::{
            messaging::MockMessageSender,
            zoom_links::{MockDailyZoomLinkRepository, MockZoomLinkRepository},
        },
        value_objects::capabilities::SchemaCapabilities,
    };
    use uuid::Uuid;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()
    }

    fn details(sent: bool) -> DailyZoomLinkDetails {
        let now = Utc::now();
        let link = ZoomLinkEntity {
            id: Uuid::new_v4(),
            url: "https://zoom.us/j/1".to_string(),
            label: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        DailyZoomLinkDetails {
            daily: DailyZoomLinkEntity {
                id: Uuid::new_v4(),
                zoom_link_id: Some(link.id),
                scheduled_for: date(),
                telegram_sent_at: sent.then_some(now),
                created_at: now,
                updated_at: now,
            },
            zoom_link: Some(link),
        }
    }

    fn usecase(
        daily: MockDailyZoomLinkRepository,
        sender: MockMessageSender,
        enabled: bool,
    ) -> TelegramSendUseCase<MockZoomLinkRepository, MockDailyZoomLinkRepository, MockMessageSender>
    {
        let daily_links = DailyLinkUseCase::new(
            Arc::new(MockZoomLinkRepository::new()),
            Arc::new(daily),
            SchemaCapabilities::full(),
        );
        TelegramSendUseCase::new(Arc::new(daily_links), Arc::new(sender), enabled)
    }

    #[tokio::test]
    async fn sends_once_and_records_timestamp() {
        let pending = details(false);
        let daily_id = pending.daily.id;
        let mut sent = pending.clone();
        sent.daily.telegram_sent_at = Some(Utc::now());

        let mut daily = MockDailyZoomLinkRepository::new();
        let mut sender = MockMessageSender::new();
        daily
            .expect_find_for_date()
            .returning(move |_| Ok(Some(pending.clone())));
        sender.expect_is_configured().return_const(true);
        sender
            .expect_send_message()
            .withf(|message| message.text == "Link Zoom cho ngày 10/09/2024:\nhttps://zoom.us/j/1")
            .times(1)
            .returning(|_| Ok(()));
        daily
            .expect_mark_sent()
            .withf(move |id, _| *id == daily_id)
            .times(1)
            .returning(move |_, _| Ok(sent.clone()));

        let outcome = usecase(daily, sender, true)
            .send_daily_link(date())
            .await
            .unwrap();

        assert!(matches!(outcome, TelegramSendOutcome::Sent(d) if d.is_sent()));
    }

    #[tokio::test]
    async fn skips_days_already_sent() {
        let already = details(true);
        let mut daily = MockDailyZoomLinkRepository::new();
        let mut sender = MockMessageSender::new();
        daily
            .expect_find_for_date()
            .returning(move |_| Ok(Some(already.clone())));
        sender.expect_is_configured().return_const(true);
        sender.expect_send_message().never();

        let outcome = usecase(daily, sender, true)
            .send_daily_link(date())
            .await
            .unwrap();

        assert!(matches!(outcome, TelegramSendOutcome::AlreadySent(_)));
    }

    #[tokio::test]
    async fn disabled_flag_blocks_sending() {
        let mut sender = MockMessageSender::new();
        sender.expect_send_message().never();

        let err = usecase(MockDailyZoomLinkRepository::new(), sender, false)
            .send_daily_link(date())
            .await
            .unwrap_err();

        assert!(matches!(err, TelegramError::Disabled));
    }

    #[tokio::test]
    async fn failed_delivery_leaves_day_unsent() {
        let pending = details(false);
        let mut daily = MockDailyZoomLinkRepository::new();
        let mut sender = MockMessageSender::new();
        daily
            .expect_find_for_date()
            .returning(move |_| Ok(Some(pending.clone())));
        daily.expect_mark_sent().never();
        sender.expect_is_configured().return_const(true);
        sender
            .expect_send_message()
            .returning(|_| Err(anyhow::anyhow!("Telegram API error: chat not found")));

        let err = usecase(daily, sender, true)
            .send_daily_link(date())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
