use chrono::Local;

use crate::{
    report::{format_entry, goal_progress},
    storage::record_store::RecordStore,
};

use super::{console::Console, SessionController, SessionError};

const RECENT_ENTRIES: usize = 10;

impl<S: RecordStore, C: Console> SessionController<S, C> {
    /// Prints recent entries and how the current period compares to each goal. Never mutates.
    pub(super) async fn run_view_log(&mut self) -> Result<(), SessionError> {
        let catalog = self.catalog.load()?;
        let record = self.current_record()?.clone();
        let now = self.clock.time().with_timezone(&Local);

        self.console.title(&format!(
            "\nMISSION LOG: {} [{}]",
            record.user_name,
            record.difficulty_id.to_uppercase()
        ));

        if record.flight_logs.is_empty() {
            self.console.say("No entries logged yet.");
        } else {
            let skip = record.flight_logs.len().saturating_sub(RECENT_ENTRIES);
            for entry in &record.flight_logs[skip..] {
                self.console.say(&format_entry(entry));
            }
        }

        match catalog.find(&record.difficulty_id) {
            Some(preset) => {
                self.console.say("\nProgress:");
                for progress in goal_progress(preset, &record.flight_logs, now) {
                    self.console.say(&format!("\t- {progress}"));
                }
            }
            None => self.console.error(&format!(
                "Difficulty `{}` is not in the catalog, progress is unavailable",
                record.difficulty_id
            )),
        }
        self.pause().await;
        Ok(())
    }
}
