//! Month grid for the calendar view

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column headers, weeks start on Sunday
pub const DAY_HEADERS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    /// Padding day from the previous or next month
    pub other_month: bool,
    pub today: bool,
    pub has_sessions: bool,
}

impl CalendarDay {
    fn padding(day: u32) -> Self {
        Self {
            day,
            other_month: true,
            today: false,
            has_sessions: false,
        }
    }
}

/// A month laid out in whole weeks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1-based month
    pub month: u32,
    /// Heading such as `January 2024`
    pub label: String,
    pub headers: Vec<String>,
    /// Cells row by row, a multiple of seven
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// Lay out `year`/`month`, flagging today and days with sessions.
    /// Returns `None` for an invalid month.
    pub fn build(
        year: i32,
        month: u32,
        day_counts: &BTreeMap<NaiveDate, usize>,
        today: NaiveDate,
    ) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let label = format!("{} {}", MONTH_NAMES[month as usize - 1], year);
        let leading = first.weekday().num_days_from_sunday();
        let month_len = days_in_month(first);
        let days_in_prev = days_in_month(first.checked_sub_months(Months::new(1))?);

        let mut days = Vec::with_capacity(42);
        for i in (0..leading).rev() {
            days.push(CalendarDay::padding(days_in_prev - i));
        }
        for day in 1..=month_len {
            let date = first.with_day(day)?;
            days.push(CalendarDay {
                day,
                other_month: false,
                today: date == today,
                has_sessions: day_counts.get(&date).is_some_and(|&count| count > 0),
            });
        }
        let trailing = (7 - days.len() % 7) % 7;
        for day in 1..=trailing as u32 {
            days.push(CalendarDay::padding(day));
        }

        Some(Self {
            year,
            month,
            label,
            headers: DAY_HEADERS.iter().map(|h| h.to_string()).collect(),
            days,
        })
    }
}

/// Number of days in the month containing `first`
fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Move a (year, month) cursor by `delta` months
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_january_2024_layout() {
        let mut counts = BTreeMap::new();
        counts.insert(date(2024, 1, 1), 3);
        counts.insert(date(2024, 1, 2), 1);

        let month = CalendarMonth::build(2024, 1, &counts, date(2024, 1, 2)).unwrap();
        assert_eq!(month.label, "January 2024");
        assert_eq!(month.headers, vec!["S", "M", "T", "W", "T", "F", "S"]);

        // Jan 1st 2024 is a Monday: one leading day (Dec 31st), three trailing
        assert_eq!(month.days.len(), 35);
        assert_eq!(month.days[0], CalendarDay::padding(31));
        assert_eq!(month.days[1].day, 1);
        assert!(month.days[1].has_sessions);
        assert!(!month.days[1].today);
        assert!(month.days[2].today);
        assert!(month.days[2].has_sessions);
        assert!(!month.days[3].has_sessions);
        assert_eq!(month.days[31].day, 31);
        let trailing: Vec<u32> = month.days[32..].iter().map(|d| d.day).collect();
        assert_eq!(trailing, vec![1, 2, 3]);
        assert!(month.days[32..].iter().all(|d| d.other_month));
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_leading_days() {
        // September 2024 starts on a Sunday and has 30 days
        let month = CalendarMonth::build(2024, 9, &BTreeMap::new(), date(2000, 1, 1)).unwrap();
        assert_eq!(month.days[0], CalendarDay {
            day: 1,
            other_month: false,
            today: false,
            has_sessions: false,
        });
        assert_eq!(month.days.len(), 35);
    }

    #[test]
    fn test_leap_february() {
        // February 2024 starts on a Thursday, after a 31 day January
        let month = CalendarMonth::build(2024, 2, &BTreeMap::new(), date(2000, 1, 1)).unwrap();
        let leading: Vec<u32> = month.days[..4].iter().map(|d| d.day).collect();
        assert_eq!(leading, vec![28, 29, 30, 31]);
        assert_eq!(month.days.iter().filter(|d| !d.other_month).count(), 29);
        assert_eq!(month.days.len() % 7, 0);
    }

    #[test]
    fn test_padding_after_thirty_day_month() {
        // October 2024 starts on a Tuesday, after a 30 day September
        let month = CalendarMonth::build(2024, 10, &BTreeMap::new(), date(2000, 1, 1)).unwrap();
        assert_eq!(month.label, "October 2024");
        assert_eq!(month.days[..2], [CalendarDay::padding(29), CalendarDay::padding(30)]);
        assert_eq!(month.days[2].day, 1);
        assert!(!month.days[2].other_month);
        assert_eq!(month.days.iter().filter(|d| !d.other_month).count(), 31);
        let trailing: Vec<u32> = month.days[33..].iter().map(|d| d.day).collect();
        assert_eq!(trailing, vec![1, 2]);
    }

    #[test]
    fn test_invalid_month() {
        assert!(CalendarMonth::build(2024, 13, &BTreeMap::new(), date(2024, 1, 1)).is_none());
        assert!(CalendarMonth::build(2024, 0, &BTreeMap::new(), date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_shift_month() {
        assert_eq!(shift_month(2024, 1, -1), (2023, 12));
        assert_eq!(shift_month(2024, 12, 1), (2025, 1));
        assert_eq!(shift_month(2024, 5, 0), (2024, 5));
        assert_eq!(shift_month(2024, 3, -15), (2022, 12));
    }
}
