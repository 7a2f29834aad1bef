use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One logged quantity. `units` is copied from the goal at the time of logging so the entry stays
/// meaningful after the preset changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub activity: String,
    pub quantity: f64,
    pub units: String,
}

impl LogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        activity: impl Into<String>,
        quantity: f64,
        units: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            activity: activity.into(),
            quantity,
            units: units.into(),
        }
    }
}

/// The single persisted user. Missing fields default to empty so that a stub file left by an
/// earlier install still loads and is routed to setup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub difficulty_id: String,
    #[serde(default)]
    pub flight_logs: Vec<LogEntry>,
}

impl UserRecord {
    pub fn new(user_name: impl Into<String>, difficulty_id: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            difficulty_id: difficulty_id.into(),
            flight_logs: vec![],
        }
    }

    /// A record counts as set up once it has a name and a difficulty.
    pub fn is_complete(&self) -> bool {
        !self.user_name.is_empty() && !self.difficulty_id.is_empty()
    }

    pub fn with_entry(&self, entry: LogEntry) -> Self {
        let mut next = self.clone();
        next.flight_logs.push(entry);
        next
    }

    pub fn with_difficulty(&self, difficulty_id: impl Into<String>) -> Self {
        Self {
            difficulty_id: difficulty_id.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike, Utc};

    use super::{LogEntry, UserRecord};

    #[test]
    fn test_entry_timestamp_has_second_precision() {
        let moment = Utc.with_ymd_and_hms(2025, 3, 15, 7, 30, 12).unwrap()
            + chrono::Duration::milliseconds(345);
        let entry = LogEntry::new(moment, "sleep", 7., "hours");
        assert_eq!(entry.timestamp.nanosecond(), 0);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["timestamp"], "2025-03-15T07:30:12Z");
    }

    #[test]
    fn test_stub_record_loads_as_incomplete() {
        let record: UserRecord = serde_json::from_str(r#"{"user_name": ""}"#).unwrap();
        assert!(!record.is_complete());
        assert!(record.flight_logs.is_empty());
    }

    #[test]
    fn test_with_entry_appends_without_touching_history() {
        let moment = Utc.with_ymd_and_hms(2025, 3, 15, 7, 0, 0).unwrap();
        let record = UserRecord::new("Ada", "pilot")
            .with_entry(LogEntry::new(moment, "sleep", 7., "hours"));
        let next = record.with_entry(LogEntry::new(moment, "fitness", 30., "minutes"));

        assert_eq!(record.flight_logs.len(), 1);
        assert_eq!(next.flight_logs.len(), 2);
        assert_eq!(next.flight_logs[0], record.flight_logs[0]);
        assert_eq!(next.flight_logs[1].activity, "fitness");
    }

    #[test]
    fn test_with_difficulty_keeps_logs() {
        let moment = Utc.with_ymd_and_hms(2025, 3, 15, 7, 0, 0).unwrap();
        let record = UserRecord::new("Ada", "pilot")
            .with_entry(LogEntry::new(moment, "sleep", 7., "hours"));
        let next = record.with_difficulty("commander");
        assert_eq!(next.difficulty_id, "commander");
        assert_eq!(next.flight_logs, record.flight_logs);
    }
}
