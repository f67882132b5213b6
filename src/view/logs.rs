//! Per-day session log lines

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::state::{session, Session};

/// Shown instead of the log when nothing was recorded yet
pub const EMPTY_LOG_MESSAGE: &str = "No sessions yet. Start focusing!";

/// One day of the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    /// `Today`, `Yesterday` or a date such as `Jan 1, 2024`
    pub label: String,
    pub sessions: usize,
    /// `3 sessions completed`
    pub details: String,
    /// Total focus time, e.g. `2h 30m`
    pub time: String,
}

/// Build log lines, newest day first
pub fn log_entries(sessions: &[Session], today: NaiveDate) -> Vec<LogEntry> {
    session::group_by_day(sessions)
        .into_iter()
        .map(|(date, stats)| LogEntry {
            date,
            label: day_label(date, today),
            sessions: stats.count,
            details: format!(
                "{} session{} completed",
                stats.count,
                if stats.count == 1 { "" } else { "s" }
            ),
            time: stats.formatted_time(),
        })
        .collect()
}

/// Relative label for recent days, `Mon D, YYYY` otherwise
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn on(day: NaiveDate) -> Session {
        let timestamp = Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
        Session::focus(timestamp, day, 3000)
    }

    #[test]
    fn test_day_labels() {
        let today = date(2024, 3, 1);
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(date(2024, 2, 29), today), "Yesterday");
        assert_eq!(day_label(date(2024, 2, 28), today), "Feb 28, 2024");
        assert_eq!(day_label(date(2023, 12, 5), today), "Dec 5, 2023");
    }

    #[test]
    fn test_log_entries_newest_first() {
        let today = date(2024, 1, 2);
        let sessions = vec![
            on(date(2024, 1, 1)),
            on(date(2023, 12, 20)),
            on(date(2024, 1, 1)),
            on(today),
            on(date(2024, 1, 1)),
        ];

        let entries = log_entries(&sessions, today);
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "Dec 20, 2023"]);

        assert_eq!(entries[0].details, "1 session completed");
        assert_eq!(entries[0].time, "50m");
        assert_eq!(entries[1].sessions, 3);
        assert_eq!(entries[1].details, "3 sessions completed");
        assert_eq!(entries[1].time, "2h 30m");
    }

    #[test]
    fn test_empty_log() {
        assert!(log_entries(&[], date(2024, 1, 1)).is_empty());
    }
}
