//! Session log entries and their aggregates

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Phase;

/// A completed focus phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Local calendar day the session completed on
    pub date: NaiveDate,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Full focus duration in seconds
    pub duration: u64,
    pub phase: Phase,
}

impl Session {
    /// Record a focus completion
    pub fn focus(timestamp: DateTime<Utc>, date: NaiveDate, duration: u64) -> Self {
        Self {
            date,
            timestamp,
            duration,
            phase: Phase::Focus,
        }
    }

    fn is_focus(&self) -> bool {
        self.phase == Phase::Focus
    }
}

/// Session count and total time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub total_minutes: u64,
}

impl Stats {
    fn add(&mut self, session: &Session) {
        self.count += 1;
        self.total_minutes += session.duration / 60;
    }

    /// Total time as `2h 30m` or `45m`
    pub fn formatted_time(&self) -> String {
        format_minutes(self.total_minutes)
    }
}

/// Stats for the sessions completed on `today`
pub fn today_stats(sessions: &[Session], today: NaiveDate) -> Stats {
    let mut stats = Stats::default();
    for session in sessions.iter().filter(|s| s.is_focus() && s.date == today) {
        stats.add(session);
    }
    stats
}

/// Stats over the whole log
pub fn total_stats(sessions: &[Session]) -> Stats {
    let mut stats = Stats::default();
    for session in sessions.iter().filter(|s| s.is_focus()) {
        stats.add(session);
    }
    stats
}

/// Per-day stats, newest day first
pub fn group_by_day(sessions: &[Session]) -> Vec<(NaiveDate, Stats)> {
    let mut days: BTreeMap<NaiveDate, Stats> = BTreeMap::new();
    for session in sessions.iter().filter(|s| s.is_focus()) {
        days.entry(session.date).or_default().add(session);
    }
    days.into_iter().rev().collect()
}

/// Number of sessions per day, for the calendar
pub fn day_counts(sessions: &[Session]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for session in sessions.iter().filter(|s| s.is_focus()) {
        *counts.entry(session.date).or_insert(0) += 1;
    }
    counts
}

/// Format minutes as `Xh Ym`, or `Ym` under an hour
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{}m", mins)
    } else {
        format!("{}h {}m", hours, mins)
    }
}
