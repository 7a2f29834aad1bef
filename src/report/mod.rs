//! Read-only summaries of the mission log: progress of the current period against each goal and
//! totals over an arbitrary range.

use std::{collections::BTreeMap, fmt::Display};

use chrono::{DateTime, Local, Utc};

use crate::{
    catalog::{DifficultyPreset, Goal, GoalKind},
    storage::entities::LogEntry,
    utils::time::{format_moment, period_start},
};

#[derive(Debug)]
pub struct GoalProgress<'a> {
    pub activity: &'a str,
    pub goal: &'a Goal,
    pub total: f64,
}

impl GoalProgress<'_> {
    pub fn is_satisfied(&self) -> bool {
        self.goal.is_satisfied_by(self.total)
    }
}

impl Display for GoalProgress<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match (self.goal.kind, self.is_satisfied()) {
            (GoalKind::Target, true) => "met",
            (GoalKind::Target, false) => "in progress",
            (GoalKind::Limit, true) => "within limit",
            (GoalKind::Limit, false) => "over limit",
        };
        write!(
            f,
            "{}: {} this {} (goal {}) [{status}]",
            self.activity, self.total, self.goal.period, self.goal
        )
    }
}

/// Sums entries of the period `now` is in for every goal of the preset. Entries logged with a
/// different unit than the goal currently uses are left out.
pub fn goal_progress<'a>(
    preset: &'a DifficultyPreset,
    entries: &[LogEntry],
    now: DateTime<Local>,
) -> Vec<GoalProgress<'a>> {
    preset
        .goals
        .iter()
        .map(|(activity, goal)| {
            let since = period_start(now, goal.period).with_timezone(&Utc);
            let total = entries
                .iter()
                .filter(|entry| {
                    entry.activity == *activity
                        && entry.units == goal.unit
                        && entry.timestamp >= since
                })
                .map(|entry| entry.quantity)
                .sum();
            GoalProgress {
                activity: activity.as_str(),
                goal,
                total,
            }
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct ActivityTotal {
    pub activity: String,
    pub units: String,
    pub total: f64,
    pub entries: usize,
}

/// Totals per activity and unit, sorted by activity.
pub fn totals<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Vec<ActivityTotal> {
    let mut map = BTreeMap::<(&str, &str), (f64, usize)>::new();
    for entry in entries {
        let value = map
            .entry((entry.activity.as_str(), entry.units.as_str()))
            .or_insert((0., 0));
        value.0 += entry.quantity;
        value.1 += 1;
    }
    map.into_iter()
        .map(|((activity, units), (total, entries))| ActivityTotal {
            activity: activity.to_string(),
            units: units.to_string(),
            total,
            entries,
        })
        .collect()
}

/// Entries in `[start, end)`.
pub fn entries_between(
    entries: &[LogEntry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> impl Iterator<Item = &LogEntry> {
    entries
        .iter()
        .filter(move |entry| entry.timestamp >= start && entry.timestamp < end)
}

pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{}\t{}\t{} {}",
        format_moment(entry.timestamp),
        entry.activity,
        entry.quantity,
        entry.units
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, Local, TimeZone, Utc};

    use crate::{catalog::CatalogSource, storage::entities::LogEntry};

    use super::{entries_between, goal_progress, totals, ActivityTotal};

    #[test]
    fn test_goal_progress_counts_current_period() -> Result<()> {
        let catalog = CatalogSource::Bundled.load()?;
        let pilot = catalog.find("pilot").unwrap();
        let now = Local::now();
        let utc_now = now.with_timezone(&Utc);

        let entries = vec![
            LogEntry::new(utc_now - Duration::days(30), "sleep", 9., "hours"),
            LogEntry::new(utc_now, "sleep", 4., "hours"),
            LogEntry::new(utc_now, "sleep", 4., "hours"),
            // Logged under a preset that used another unit.
            LogEntry::new(utc_now, "sleep", 480., "minutes"),
            LogEntry::new(utc_now, "screen_time", 3.5, "hours"),
        ];

        let progress = goal_progress(pilot, &entries, now);
        assert_eq!(progress.len(), 3);

        let sleep = progress.iter().find(|p| p.activity == "sleep").unwrap();
        assert_eq!(sleep.total, 8.);
        assert!(sleep.is_satisfied());

        let screen = progress.iter().find(|p| p.activity == "screen_time").unwrap();
        assert!(!screen.is_satisfied());
        assert!(screen.to_string().contains("over limit"));

        let fitness = progress.iter().find(|p| p.activity == "fitness").unwrap();
        assert_eq!(fitness.total, 0.);
        Ok(())
    }

    #[test]
    fn test_totals_and_range() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let entries = vec![
            LogEntry::new(start - Duration::hours(1), "sleep", 8., "hours"),
            LogEntry::new(start, "sleep", 7., "hours"),
            LogEntry::new(start + Duration::hours(12), "fitness", 30., "minutes"),
            LogEntry::new(start + Duration::days(1), "sleep", 6.5, "hours"),
            LogEntry::new(start + Duration::days(2), "sleep", 9., "hours"),
        ];

        let in_range = entries_between(&entries, start, start + Duration::days(2));
        assert_eq!(
            totals(in_range),
            vec![
                ActivityTotal {
                    activity: "fitness".into(),
                    units: "minutes".into(),
                    total: 30.,
                    entries: 1
                },
                ActivityTotal {
                    activity: "sleep".into(),
                    units: "hours".into(),
                    total: 13.5,
                    entries: 2
                },
            ]
        );
    }
}
