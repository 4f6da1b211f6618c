use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDate;
use crates::domain::{
    entities::members::MemberEntity,
    repositories::{
        admin_settings::AdminSettingsRepository, member_activity::MemberActivityRepository,
        members::MemberRepository,
    },
    value_objects::{
        admin_settings::INACTIVITY_SWEEP_LAST_DATE_KEY, enums::member_statuses::MemberStatus,
        members::INACTIVITY_DROP_REASON,
    },
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::{
    admin_settings::SettingsUseCase,
    members::{MemberError, UseCaseResult},
};

#[derive(Debug, Clone, Serialize)]
pub struct InactivitySweepResult {
    pub date: NaiveDate,
    pub scanned: usize,
    pub already_dropped: usize,
    /// Members whose challenge starts after `date`.
    pub not_started: usize,
    pub active: usize,
    pub dropped: Vec<MemberEntity>,
    pub failed: Vec<Uuid>,
}

/// Drops members who logged neither gratitude nor homework on a given day.
pub struct InactivitySweepUseCase<M, A>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    member_repo: Arc<M>,
    activity_repo: Arc<A>,
}

impl<M, A> InactivitySweepUseCase<M, A>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    pub fn new(member_repo: Arc<M>, activity_repo: Arc<A>) -> Self {
        Self {
            member_repo,
            activity_repo,
        }
    }

    pub async fn run(&self, date: NaiveDate) -> UseCaseResult<InactivitySweepResult> {
        info!(%date, "inactivity_sweep: starting");

        let members = self.member_repo.list(None).await.map_err(|err| {
            error!(%date, db_error = ?err, "inactivity_sweep: failed to list members");
            MemberError::Internal(err)
        })?;

        let mut result = InactivitySweepResult {
            date,
            scanned: members.len(),
            already_dropped: 0,
            not_started: 0,
            active: 0,
            dropped: Vec::new(),
            failed: Vec::new(),
        };

        for member in members {
            let member_id = member.id;
            if member.is_dropped() {
                result.already_dropped += 1;
                continue;
            }
            if member.challenge_start_date() > date {
                result.not_started += 1;
                continue;
            }

            let has_activity = match self.activity_repo.has_activity_on(member_id, date).await {
                Ok(has_activity) => has_activity,
                Err(err) => {
                    warn!(%member_id, %date, db_error = ?err, "inactivity_sweep: activity lookup failed, treating as inactive");
                    false
                }
            };

            if has_activity {
                result.active += 1;
                continue;
            }

            match self
                .member_repo
                .update_status(
                    member_id,
                    MemberStatus::Dropped,
                    Some(INACTIVITY_DROP_REASON.to_string()),
                )
                .await
            {
                Ok(updated) => {
                    info!(%member_id, %date, "inactivity_sweep: member dropped");
                    result.dropped.push(updated);
                }
                Err(err) => {
                    error!(%member_id, %date, db_error = ?err, "inactivity_sweep: failed to drop member");
                    result.failed.push(member_id);
                }
            }
        }

        info!(
            %date,
            scanned = result.scanned,
            already_dropped = result.already_dropped,
            not_started = result.not_started,
            active = result.active,
            dropped = result.dropped.len(),
            failed = result.failed.len(),
            "inactivity_sweep: finished"
        );
        Ok(result)
    }
}

/// A sweep that also keeps the `inactivity_sweep_last_date` marker, shared by
/// the scheduled loop and the manual triggers.
pub struct RecordedInactivitySweep<M, A, S>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    sweep: Arc<InactivitySweepUseCase<M, A>>,
    settings: Arc<SettingsUseCase<S>>,
}

impl<M, A, S> RecordedInactivitySweep<M, A, S>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    pub fn new(sweep: Arc<InactivitySweepUseCase<M, A>>, settings: Arc<SettingsUseCase<S>>) -> Self {
        Self { sweep, settings }
    }

    /// Last swept day from `admin_settings`; unreadable markers read as `None`.
    pub async fn last_swept(&self) -> Option<NaiveDate> {
        match self
            .settings
            .get(vec![INACTIVITY_SWEEP_LAST_DATE_KEY.to_string()])
            .await
        {
            Ok(rows) => rows
                .iter()
                .find(|row| row.key == INACTIVITY_SWEEP_LAST_DATE_KEY)
                .and_then(|row| NaiveDate::parse_from_str(row.value.trim(), "%Y-%m-%d").ok()),
            Err(err) => {
                warn!(error = %err, "inactivity_sweep: failed to read sweep marker");
                None
            }
        }
    }

    pub async fn run(&self, date: NaiveDate) -> UseCaseResult<InactivitySweepResult> {
        let result = self.sweep.run(date).await?;
        self.record(date).await;
        Ok(result)
    }

    // The marker only moves forward.
    async fn record(&self, date: NaiveDate) {
        if self.last_swept().await.is_some_and(|last| last >= date) {
            return;
        }

        let update = BTreeMap::from([(
            INACTIVITY_SWEEP_LAST_DATE_KEY.to_string(),
            date.format("%Y-%m-%d").to_string(),
        )]);
        if let Err(err) = self.settings.update(update).await {
            warn!(sweep_date = %date, error = %err, "inactivity_sweep: failed to save sweep marker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};
    use crates::domain::{
        entities::admin_settings::AdminSettingEntity,
        repositories::{
            admin_settings::MockAdminSettingsRepository,
            member_activity::MockMemberActivityRepository, members::MockMemberRepository,
        },
        value_objects::capabilities::SchemaCapabilities,
    };
    use mockall::predicate::{always, eq};

    fn member(status: &str) -> MemberEntity {
        MemberEntity {
            id: Uuid::new_v4(),
            full_name: None,
            email: format!("{}@example.com", Uuid::new_v4()),
            phone: None,
            telegram: None,
            birth_year: None,
            status: status.to_string(),
            drop_reason: None,
            applicant_id: None,
            approved_at: None,
            start_date: None,
            created_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn as_dropped(member: &MemberEntity) -> MemberEntity {
        let mut dropped = member.clone();
        dropped.status = "dropped".to_string();
        dropped.drop_reason = Some(INACTIVITY_DROP_REASON.to_string());
        dropped
    }

    #[tokio::test]
    async fn drops_inactive_members_and_keeps_going_after_failures() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        let busy = member("active");
        let idle = member("active");
        let broken_lookup = member("paused");
        let failing_update = member("active");
        let gone = member("dropped");

        let busy_id = busy.id;
        let idle_id = idle.id;
        let broken_id = broken_lookup.id;
        let failing_id = failing_update.id;
        let rows = vec![
            busy.clone(),
            idle.clone(),
            broken_lookup.clone(),
            failing_update.clone(),
            gone,
        ];

        let mut member_repo = MockMemberRepository::new();
        let mut activity_repo = MockMemberActivityRepository::new();

        member_repo
            .expect_list()
            .with(eq(None))
            .returning(move |_| Ok(rows.clone()));
        activity_repo
            .expect_has_activity_on()
            .with(always(), eq(date))
            .returning(move |id, _| {
                if id == busy_id {
                    Ok(true)
                } else if id == broken_id {
                    Err(anyhow!("timeout"))
                } else {
                    Ok(false)
                }
            });
        let idle_dropped = as_dropped(&idle);
        let broken_dropped = as_dropped(&broken_lookup);
        member_repo
            .expect_update_status()
            .with(
                always(),
                eq(MemberStatus::Dropped),
                eq(Some(INACTIVITY_DROP_REASON.to_string())),
            )
            .times(3)
            .returning(move |id, _, _| {
                if id == idle_id {
                    Ok(idle_dropped.clone())
                } else if id == broken_id {
                    Ok(broken_dropped.clone())
                } else {
                    Err(anyhow!("write failed"))
                }
            });

        let result = InactivitySweepUseCase::new(Arc::new(member_repo), Arc::new(activity_repo))
            .run(date)
            .await
            .unwrap();

        assert_eq!(result.scanned, 5);
        assert_eq!(result.already_dropped, 1);
        assert_eq!(result.active, 1);
        let dropped_ids: Vec<Uuid> = result.dropped.iter().map(|m| m.id).collect();
        assert_eq!(dropped_ids, vec![idle_id, broken_id]);
        assert_eq!(result.failed, vec![failing_id]);
    }

    #[tokio::test]
    async fn members_who_have_not_started_are_skipped() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 10).unwrap();
        let mut late_joiner = member("active");
        late_joiner.start_date = NaiveDate::from_ymd_opt(2024, 9, 15);
        let mut approved_after = member("active");
        approved_after.approved_at = Some(Utc.with_ymd_and_hms(2024, 9, 11, 3, 0, 0).unwrap());
        let starts_today = {
            let mut starts_today = member("active");
            starts_today.start_date = Some(date);
            starts_today
        };
        let starts_today_id = starts_today.id;
        let rows = vec![late_joiner, approved_after, starts_today.clone()];

        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_list().returning(move |_| Ok(rows.clone()));
        let mut activity_repo = MockMemberActivityRepository::new();
        activity_repo
            .expect_has_activity_on()
            .with(eq(starts_today_id), eq(date))
            .times(1)
            .returning(|_, _| Ok(false));
        let dropped = as_dropped(&starts_today);
        member_repo
            .expect_update_status()
            .with(eq(starts_today_id), always(), always())
            .times(1)
            .returning(move |_, _, _| Ok(dropped.clone()));

        let result = InactivitySweepUseCase::new(Arc::new(member_repo), Arc::new(activity_repo))
            .run(date)
            .await
            .unwrap();

        assert_eq!(result.scanned, 3);
        assert_eq!(result.not_started, 2);
        assert_eq!(result.dropped.len(), 1);
        assert!(result.failed.is_empty());
    }

    fn empty_sweep() -> Arc<InactivitySweepUseCase<MockMemberRepository, MockMemberActivityRepository>> {
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_list().times(1).returning(|_| Ok(Vec::new()));
        Arc::new(InactivitySweepUseCase::new(
            Arc::new(member_repo),
            Arc::new(MockMemberActivityRepository::new()),
        ))
    }

    fn settings_with(
        repo: MockAdminSettingsRepository,
    ) -> Arc<SettingsUseCase<MockAdminSettingsRepository>> {
        Arc::new(SettingsUseCase::new(
            Arc::new(repo),
            SchemaCapabilities::full(),
            "07:00".to_string(),
        ))
    }

    fn marker(value: &str) -> AdminSettingEntity {
        AdminSettingEntity {
            key: INACTIVITY_SWEEP_LAST_DATE_KEY.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn recorded_sweep_moves_the_marker_forward() {
        let mut settings_repo = MockAdminSettingsRepository::new();
        settings_repo
            .expect_list()
            .returning(|_| Ok(vec![marker("2024-09-08")]));
        settings_repo
            .expect_upsert()
            .withf(|rows| {
                rows.len() == 1
                    && rows[0].key == INACTIVITY_SWEEP_LAST_DATE_KEY
                    && rows[0].value == "2024-09-09"
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let sweep = RecordedInactivitySweep::new(empty_sweep(), settings_with(settings_repo));
        let result = sweep
            .run(NaiveDate::from_ymd_opt(2024, 9, 9).unwrap())
            .await
            .unwrap();

        assert_eq!(result.scanned, 0);
    }

    #[tokio::test]
    async fn sweeping_an_older_day_keeps_the_marker() {
        let mut settings_repo = MockAdminSettingsRepository::new();
        settings_repo
            .expect_list()
            .returning(|_| Ok(vec![marker("2024-09-09")]));
        settings_repo.expect_upsert().never();

        let sweep = RecordedInactivitySweep::new(empty_sweep(), settings_with(settings_repo));
        sweep
            .run(NaiveDate::from_ymd_opt(2024, 9, 5).unwrap())
            .await
            .unwrap();

        assert_eq!(
            sweep.last_swept().await,
            NaiveDate::from_ymd_opt(2024, 9, 9)
        );
    }

    #[tokio::test]
    async fn failed_sweep_leaves_the_marker_alone() {
        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_list()
            .returning(|_| Err(anyhow!("connection refused")));
        let mut settings_repo = MockAdminSettingsRepository::new();
        settings_repo.expect_list().never();
        settings_repo.expect_upsert().never();

        let sweep = RecordedInactivitySweep::new(
            Arc::new(InactivitySweepUseCase::new(
                Arc::new(member_repo),
                Arc::new(MockMemberActivityRepository::new()),
            )),
            settings_with(settings_repo),
        );

        assert!(
            sweep
                .run(NaiveDate::from_ymd_opt(2024, 9, 9).unwrap())
                .await
                .is_err()
        );
    }
}
