use std::{sync::Arc, time::Duration};

use anyhow::Result;
use backend::usecases::{
    admin_settings::SettingsUseCase,
    daily_links::{DailyLinkError, DailyLinkUseCase},
    telegram_send::{TelegramSendOutcome, TelegramSendUseCase},
};
use chrono::{Local, NaiveDateTime};
use crates::domain::{
    entities::zoom_links::DailyZoomLinkDetails,
    repositories::{
        admin_settings::AdminSettingsRepository,
        messaging::MessageSender,
        zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
    },
    value_objects::zoom_links::send_at,
};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Nothing to post today; check again after the poll interval.
    Idle,
    SendNow,
    WaitUntilSend(Duration),
}

/// Decides what the loop does with today's link at `now`.
pub fn plan_send(
    now: NaiveDateTime,
    today_link: Option<&DailyZoomLinkDetails>,
    send_time: &str,
    autosend_enabled: bool,
) -> NextStep {
    if !autosend_enabled {
        return NextStep::Idle;
    }
    let Some(details) = today_link else {
        return NextStep::Idle;
    };
    if details.is_sent() || details.active_link().is_none() {
        return NextStep::Idle;
    }
    let Some(at) = send_at(details.daily.scheduled_for, send_time) else {
        return NextStep::Idle;
    };

    if now >= at {
        NextStep::SendNow
    } else {
        (at - now)
            .to_std()
            .map(NextStep::WaitUntilSend)
            .unwrap_or(NextStep::SendNow)
    }
}

pub struct DailyLinkJob<Z, D, S, R>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
    R: AdminSettingsRepository + Send + Sync + 'static,
{
    pub daily_links: Arc<DailyLinkUseCase<Z, D>>,
    pub telegram: Arc<TelegramSendUseCase<Z, D, S>>,
    pub settings: Arc<SettingsUseCase<R>>,
    pub default_send_time: String,
    pub poll: Duration,
}

impl<Z, D, S, R> DailyLinkJob<Z, D, S, R>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
    R: AdminSettingsRepository + Send + Sync + 'static,
{
    /// Runs one pass and returns how long to sleep before the next.
    pub async fn tick(&self, now: NaiveDateTime) -> Duration {
        let today = now.date();

        let details = match self.daily_links.ensure_for_date(today).await {
            Ok(details) => details,
            Err(DailyLinkError::SchemaNotReady) => {
                warn!("daily_link_loop: zoom link tables are missing; waiting for SQL setup");
                return self.poll;
            }
            Err(err) => {
                error!(scheduled_for = %today, error = ?err, "daily_link_loop: failed to ensure link");
                return self.poll;
            }
        };

        if details.is_none() {
            info!(scheduled_for = %today, "daily_link_loop: zoom link pool is empty");
        }

        let send_time = self.send_time().await;
        match plan_send(now, details.as_ref(), &send_time, self.telegram.is_enabled()) {
            NextStep::Idle => self.poll,
            NextStep::WaitUntilSend(wait) => {
                info!(scheduled_for = %today, %send_time, wait_secs = wait.as_secs(), "daily_link_loop: waiting for send time");
                wait.min(self.poll)
            }
            NextStep::SendNow => {
                match self.telegram.send_daily_link(today).await {
                    Ok(TelegramSendOutcome::Sent(_)) => {
                        info!(scheduled_for = %today, "daily_link_loop: link posted to telegram")
                    }
                    Ok(outcome) => {
                        info!(scheduled_for = %today, ?outcome, "daily_link_loop: nothing sent")
                    }
                    Err(err) => {
                        error!(scheduled_for = %today, error = %err, "daily_link_loop: telegram send failed")
                    }
                }
                self.poll
            }
        }
    }

    async fn send_time(&self) -> String {
        match self.settings.dashboard_settings().await {
            Ok(settings) => settings.telegram_send_time,
            Err(err) => {
                warn!(error = %err, "daily_link_loop: falling back to default send time");
                self.default_send_time.clone()
            }
        }
    }
}

pub async fn run<Z, D, S, R>(job: DailyLinkJob<Z, D, S, R>) -> Result<()>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
    R: AdminSettingsRepository + Send + Sync + 'static,
{
    info!(
        autosend = job.telegram.is_enabled(),
        poll_secs = job.poll.as_secs(),
        "daily_link_loop: starting"
    );
    loop {
        let wait = job.tick(Local::now().naive_local()).await;
        tokio::time::sleep(wait).await;
    }
}
