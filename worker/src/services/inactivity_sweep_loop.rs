use std::{sync::Arc, time::Duration};

use anyhow::Result;
use backend::usecases::inactivity_sweep::RecordedInactivitySweep;
use chrono::{Days, Local, NaiveDate};
use crates::domain::repositories::{
    admin_settings::AdminSettingsRepository, member_activity::MemberActivityRepository,
    members::MemberRepository,
};
use tokio::sync::Mutex;
use tracing::{error, info};

/// The day to sweep on `today`, unless it has been swept already.
pub fn due_sweep_date(today: NaiveDate, last_swept: Option<NaiveDate>) -> Option<NaiveDate> {
    let target = today.checked_sub_days(Days::new(1))?;
    match last_swept {
        Some(last) if last >= target => None,
        _ => Some(target),
    }
}

pub struct InactivitySweepJob<M, A, R>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    R: AdminSettingsRepository + Send + Sync + 'static,
{
    sweep: Arc<RecordedInactivitySweep<M, A, R>>,
    // Used when the admin_settings table cannot hold the marker.
    last_swept: Mutex<Option<NaiveDate>>,
}

impl<M, A, R> InactivitySweepJob<M, A, R>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    R: AdminSettingsRepository + Send + Sync + 'static,
{
    pub fn new(sweep: Arc<RecordedInactivitySweep<M, A, R>>) -> Self {
        Self {
            sweep,
            last_swept: Mutex::new(None),
        }
    }

    /// Sweeps yesterday once per calendar day. Manual sweeps move the same
    /// marker, so a day swept by hand is not swept again.
    pub async fn tick(&self, today: NaiveDate) {
        let mut last_swept = self.last_swept.lock().await;
        let persisted = self.sweep.last_swept().await;
        let known = persisted.max(*last_swept);

        let Some(date) = due_sweep_date(today, known) else {
            return;
        };

        match self.sweep.run(date).await {
            Ok(result) => {
                info!(
                    sweep_date = %date,
                    scanned = result.scanned,
                    not_started = result.not_started,
                    dropped = result.dropped.len(),
                    failed = result.failed.len(),
                    "inactivity_sweep_loop: sweep finished"
                );
                *last_swept = Some(date);
            }
            Err(err) => {
                error!(sweep_date = %date, error = %err, "inactivity_sweep_loop: sweep failed");
            }
        }
    }
}

pub async fn run<M, A, R>(job: InactivitySweepJob<M, A, R>, poll: Duration) -> Result<()>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    R: AdminSettingsRepository + Send + Sync + 'static,
{
    info!(poll_secs = poll.as_secs(), "inactivity_sweep_loop: starting");
    loop {
        job.tick(Local::now().date_naive()).await;
        tokio::time::sleep(poll).await;
    }
}
