use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct SyncZoomLinksModel {
    /// Newline-separated URLs, as pasted into the settings form.
    pub links: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignDailyLinkModel {
    pub zoom_link_id: Uuid,
    pub date: Option<NaiveDate>,
}

/// Trims each line, drops blanks and keeps the first occurrence of each URL.
pub fn normalize_link_lines(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// Parses a strict `HH:MM` send time.
pub fn parse_send_time(value: &str) -> Option<NaiveTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 2 || b.is_ascii_digit())
    {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Local wall-clock moment the day's link should be posted.
pub fn send_at(scheduled_for: NaiveDate, send_time: &str) -> Option<NaiveDateTime> {
    parse_send_time(send_time).map(|time| scheduled_for.and_time(time))
}

pub fn daily_link_message(scheduled_for: NaiveDate, url: &str) -> String {
    format!(
        "Link Zoom cho ngày {}:\n{}",
        scheduled_for.format("%d/%m/%Y"),
        url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_pasted_link_list() {
        let raw = "  https://zoom.us/j/1 \n\nhttps://zoom.us/j/2\nhttps://zoom.us/j/1\n   \n";

        assert_eq!(
            normalize_link_lines(raw),
            vec!["https://zoom.us/j/1".to_string(), "https://zoom.us/j/2".to_string()]
        );
    }

    #[test]
    fn send_time_must_be_two_digit_hours_and_minutes() {
        assert!(parse_send_time("07:00").is_some());
        assert!(parse_send_time("23:59").is_some());
        assert!(parse_send_time("7:00").is_none());
        assert!(parse_send_time("24:00").is_none());
        assert!(parse_send_time("07:60").is_none());
        assert!(parse_send_time("07-00").is_none());
    }

    #[test]
    fn send_at_combines_day_and_time() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let at = send_at(day, "19:30").unwrap();

        assert_eq!(at, day.and_hms_opt(19, 30, 0).unwrap());
        assert!(send_at(day, "late").is_none());
    }
}
