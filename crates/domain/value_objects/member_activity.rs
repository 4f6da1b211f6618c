use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::entities::member_activity::{
    GratitudeEntryEntity, HomeworkSubmissionEntity, ProgressUpdateEntity,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityCalendar {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub gratitude_dates: BTreeSet<NaiveDate>,
    pub homework_dates: BTreeSet<NaiveDate>,
    /// Days in `from..=to` with neither a gratitude entry nor homework.
    pub inactive_dates: Vec<NaiveDate>,
}

pub fn activity_calendar(
    from: NaiveDate,
    to: NaiveDate,
    gratitude_entries: &[GratitudeEntryEntity],
    homework_submissions: &[HomeworkSubmissionEntity],
) -> ActivityCalendar {
    let gratitude_dates: BTreeSet<NaiveDate> =
        gratitude_entries.iter().map(|entry| entry.entry_date).collect();
    let homework_dates: BTreeSet<NaiveDate> = homework_submissions
        .iter()
        .map(|submission| submission.submission_date)
        .collect();

    let inactive_dates = from
        .iter_days()
        .take_while(|day| *day <= to)
        .filter(|day| !gratitude_dates.contains(day) && !homework_dates.contains(day))
        .collect();

    ActivityCalendar {
        from,
        to,
        gratitude_dates,
        homework_dates,
        inactive_dates,
    }
}

/// 1-based challenge day on which the member was dropped.
pub fn drop_day_number(start: NaiveDate, dropped_on: NaiveDate) -> Option<i64> {
    let diff = (dropped_on - start).num_days();
    (diff >= 0).then_some(diff + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTrend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Weight,
    Height,
    Waist,
    Bust,
    Hips,
}

impl Measurement {
    pub fn unit(&self) -> &'static str {
        match self {
            Measurement::Weight => "kg",
            _ => "cm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementStat {
    pub measurement: Measurement,
    pub unit: &'static str,
    pub value: f64,
    /// Change since the first recorded update, rounded to one decimal.
    pub diff: Option<f64>,
    pub trend: Option<ProgressTrend>,
}

/// Latest measurements with their change since the first update.
///
/// Height is reported without a trend. Waist, bust and hips appear only when
/// the latest update recorded them.
pub fn progress_summary(updates: &[ProgressUpdateEntity]) -> Vec<MeasurementStat> {
    let mut sorted: Vec<&ProgressUpdateEntity> = updates.iter().collect();
    sorted.sort_by_key(|update| (update.recorded_for, update.recorded_at));

    let (Some(first), Some(latest)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    let single = sorted.len() == 1;

    let stat = |measurement: Measurement, current: f64, initial: Option<f64>, track: bool| {
        let diff = match initial {
            Some(initial) if track && !single => Some(round_one_decimal(current - initial)),
            _ => None,
        };
        let trend = diff.map(|diff| {
            if diff == 0.0 {
                ProgressTrend::Flat
            } else if diff < 0.0 {
                ProgressTrend::Down
            } else {
                ProgressTrend::Up
            }
        });
        MeasurementStat {
            measurement,
            unit: measurement.unit(),
            value: current,
            diff,
            trend,
        }
    };

    let mut stats = vec![
        stat(Measurement::Weight, latest.weight, Some(first.weight), true),
        stat(Measurement::Height, latest.height, Some(first.height), false),
    ];
    if let Some(waist) = latest.waist {
        stats.push(stat(Measurement::Waist, waist, first.waist, true));
    }
    if let Some(bust) = latest.bust {
        stats.push(stat(Measurement::Bust, bust, first.bust, true));
    }
    if let Some(hips) = latest.hips {
        stats.push(stat(Measurement::Hips, hips, first.hips, true));
    }

    stats
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
