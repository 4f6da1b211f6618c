use std::sync::Arc;

use chrono::NaiveDate;
use crates::domain::{
    entities::{
        member_activity::{GratitudeEntryEntity, HomeworkSubmissionEntity, ProgressUpdateEntity},
        members::MemberEntity,
    },
    repositories::{member_activity::MemberActivityRepository, members::MemberRepository},
    value_objects::member_activity::{
        ActivityCalendar, MeasurementStat, activity_calendar, drop_day_number, progress_summary,
    },
};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::usecases::members::{MemberError, UseCaseResult};

/// Everything the member detail panel shows.
#[derive(Debug, Clone, Serialize)]
pub struct MemberActivityView {
    pub member: MemberEntity,
    pub start_date: NaiveDate,
    pub drop_date: Option<NaiveDate>,
    pub drop_day_number: Option<i64>,
    pub calendar: ActivityCalendar,
    pub progress: Vec<MeasurementStat>,
    pub gratitude_entries: Vec<GratitudeEntryEntity>,
    pub homework_submissions: Vec<HomeworkSubmissionEntity>,
    pub progress_updates: Vec<ProgressUpdateEntity>,
}

pub struct MemberActivityUseCase<M, A>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    member_repo: Arc<M>,
    activity_repo: Arc<A>,
}

impl<M, A> MemberActivityUseCase<M, A>
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

    pub async fn view(&self, member_id: Uuid, today: NaiveDate) -> UseCaseResult<MemberActivityView> {
        let member = self
            .member_repo
            .find_by_id(member_id)
            .await
            .map_err(|err| {
                error!(%member_id, db_error = ?err, "member_activity: failed to load member");
                MemberError::Internal(err)
            })?
            .ok_or(MemberError::NotFound)?;

        let (gratitude_entries, homework_submissions, progress_updates) = tokio::try_join!(
            self.activity_repo.list_gratitude_entries(member_id),
            self.activity_repo.list_homework_submissions(member_id),
            self.activity_repo.list_progress_updates(member_id),
        )
        .map_err(|err| {
            error!(%member_id, db_error = ?err, "member_activity: failed to load activity logs");
            MemberError::Internal(err)
        })?;

        let start_date = member.challenge_start_date();
        let drop_date = member.drop_date();
        let calendar = activity_calendar(
            start_date,
            drop_date.unwrap_or(today),
            &gratitude_entries,
            &homework_submissions,
        );

        info!(
            %member_id,
            gratitude = gratitude_entries.len(),
            homework = homework_submissions.len(),
            progress = progress_updates.len(),
            "member_activity: loaded"
        );

        Ok(MemberActivityView {
            start_date,
            drop_date,
            drop_day_number: drop_date.and_then(|dropped_on| drop_day_number(start_date, dropped_on)),
            calendar,
            progress: progress_summary(&progress_updates),
            member,
            gratitude_entries,
            homework_submissions,
            progress_updates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crates::domain::repositories::{
        member_activity::MockMemberActivityRepository, members::MockMemberRepository,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    fn dropped_member() -> MemberEntity {
        MemberEntity {
            id: Uuid::new_v4(),
            full_name: Some("Lan".to_string()),
            email: "lan@example.com".to_string(),
            phone: None,
            telegram: None,
            birth_year: None,
            status: "dropped".to_string(),
            drop_reason: Some("inactive".to_string()),
            applicant_id: None,
            approved_at: None,
            start_date: Some(date(1)),
            created_at: Utc.with_ymd_and_hms(2024, 8, 20, 0, 0, 0).unwrap(),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 9, 5, 3, 0, 0).unwrap()),
        }
    }

    fn gratitude(member_id: Uuid, day: u32) -> GratitudeEntryEntity {
        let at = Utc.with_ymd_and_hms(2024, 9, day, 6, 0, 0).unwrap();
        GratitudeEntryEntity {
            id: Uuid::new_v4(),
            member_id,
            entry_date: date(day),
            gratitude: "family".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn builds_calendar_up_to_drop_date() {
        let member = dropped_member();
        let member_id = member.id;

        let mut member_repo = MockMemberRepository::new();
        let mut activity_repo = MockMemberActivityRepository::new();
        member_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(member.clone())));
        activity_repo
            .expect_list_gratitude_entries()
            .returning(move |id| Ok(vec![gratitude(id, 1), gratitude(id, 2)]));
        activity_repo
            .expect_list_homework_submissions()
            .returning(|_| Ok(vec![]));
        activity_repo
            .expect_list_progress_updates()
            .returning(|_| Ok(vec![]));

        let view = MemberActivityUseCase::new(Arc::new(member_repo), Arc::new(activity_repo))
            .view(member_id, date(20))
            .await
            .unwrap();

        assert_eq!(view.start_date, date(1));
        assert_eq!(view.drop_date, Some(date(5)));
        assert_eq!(view.drop_day_number, Some(5));
        assert_eq!(view.calendar.to, date(5));
        assert_eq!(view.calendar.inactive_dates, vec![date(3), date(4), date(5)]);
        assert!(view.progress.is_empty());
    }

    #[tokio::test]
    async fn unknown_member_is_not_found() {
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find_by_id().returning(|_| Ok(None));

        let err = MemberActivityUseCase::new(
            Arc::new(member_repo),
            Arc::new(MockMemberActivityRepository::new()),
        )
        .view(Uuid::new_v4(), date(1))
        .await
        .unwrap_err();

        assert!(matches!(err, MemberError::NotFound));
    }
}
