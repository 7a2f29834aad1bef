use std::{collections::VecDeque, io, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    catalog::CatalogSource,
    storage::{
        entities::{LogEntry, UserRecord},
        record_store::RecordStore,
    },
    utils::clock::Clock,
};

use super::{console::Console, SessionController};

/// Plays back prepared input lines and keeps everything that was printed.
#[derive(Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: Vec<String>,
    errors: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|v| v.contains(needle))
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn say(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn error(&mut self, text: &str) {
        self.output.push(text.to_string());
        self.errors.push(text.to_string());
    }
}

pub fn test_moment() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 19, 21, 15, 0).unwrap()
}

/// Always returns the same moment and never sleeps.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(test_moment())
    }
}

#[async_trait]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.0
    }

    async fn sleep(&self, _duration: Duration) {}
}

pub fn pilot_record() -> UserRecord {
    UserRecord::new("Ada", "pilot")
        .with_entry(LogEntry::new(
            Utc.with_ymd_and_hms(2025, 3, 18, 7, 0, 0).unwrap(),
            "sleep",
            7.5,
            "hours",
        ))
        .with_entry(LogEntry::new(
            Utc.with_ymd_and_hms(2025, 3, 18, 19, 0, 0).unwrap(),
            "fitness",
            45.,
            "minutes",
        ))
}

pub fn controller<S: RecordStore>(
    store: S,
    lines: &[&str],
) -> SessionController<S, ScriptedConsole> {
    SessionController::new(
        store,
        CatalogSource::Bundled,
        ScriptedConsole::new(lines),
        Box::new(FixedClock::default()),
        Duration::from_secs(1),
    )
}
