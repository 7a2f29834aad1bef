//! Activity logging. [build_entry] and [commit_entry] are shared by the interactive Log Mission
//! flow and the `log <activity> <quantity>` power command, so both produce the same entries.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    catalog::DifficultyPreset,
    storage::{
        entities::{LogEntry, UserRecord},
        record_store::{RecordStore, StoreError},
    },
};

use super::{
    console::Console,
    prompt::{ask, parse_confirmation, parse_index, parse_quantity, Reply},
    FlowOutcome, SessionController, SessionError,
};

#[derive(Debug, Error, PartialEq)]
pub enum ActivityError {
    #[error("`{activity}` is not an activity of the {difficulty} mission")]
    UnknownActivity {
        activity: String,
        difficulty: String,
    },
    #[error("quantity {0} must be a non-negative number")]
    InvalidQuantity(f64),
}

/// Creates an entry for `activity` with the unit of the preset's goal.
pub fn build_entry(
    preset: &DifficultyPreset,
    activity: &str,
    quantity: f64,
    moment: DateTime<Utc>,
) -> Result<LogEntry, ActivityError> {
    let goal = preset
        .goal(activity)
        .ok_or_else(|| ActivityError::UnknownActivity {
            activity: activity.to_string(),
            difficulty: preset.id.clone(),
        })?;
    if !quantity.is_finite() || quantity < 0. {
        return Err(ActivityError::InvalidQuantity(quantity));
    }
    Ok(LogEntry::new(moment, activity, quantity, goal.unit.clone()))
}

/// Appends `entry` to a copy of `record` and saves it. The copy is returned only once it is on
/// disk.
pub fn commit_entry(
    store: &impl RecordStore,
    record: &UserRecord,
    entry: LogEntry,
) -> Result<UserRecord, StoreError> {
    let next = record.with_entry(entry);
    store.save(&next)?;
    info!(
        "Logged entry #{}: {:?}",
        next.flight_logs.len(),
        next.flight_logs.last()
    );
    Ok(next)
}

pub fn describe_entry(entry: &LogEntry) -> String {
    format!("{} {} {}", entry.activity, entry.quantity, entry.units)
}

enum LogStep {
    SelectActivity,
    EnterQuantity { activity: String },
    Confirm { activity: String, quantity: f64 },
}

impl<S: RecordStore, C: Console> SessionController<S, C> {
    pub(super) async fn run_log_mission(&mut self) -> Result<FlowOutcome, SessionError> {
        let catalog = self.catalog.load()?;
        let preset = self.active_preset(&catalog)?;
        let activities = preset.activities().map(str::to_string).collect::<Vec<_>>();
        let mut step = LogStep::SelectActivity;

        loop {
            step = match step {
                LogStep::SelectActivity => {
                    self.console.title("\nLOG MISSION");
                    for (index, activity) in activities.iter().enumerate() {
                        self.console.say(&format!("[{}] {activity}", index + 1));
                    }
                    let line = ask(
                        &mut self.console,
                        "Select the [number] of the activity to log, or 'b' to return",
                    )
                    .await?;
                    match parse_index(&line, activities.len()) {
                        Reply::Value(index) => LogStep::EnterQuantity {
                            activity: activities[index].clone(),
                        },
                        Reply::Back => return Ok(FlowOutcome::Cancelled),
                        Reply::Invalid => {
                            debug!("Invalid activity selection {line:?}");
                            self.console.error("Invalid selection");
                            LogStep::SelectActivity
                        }
                    }
                }
                LogStep::EnterQuantity { activity } => {
                    let unit = preset
                        .goal(&activity)
                        .map(|goal| goal.unit.as_str())
                        .unwrap_or_default();
                    let line = ask(
                        &mut self.console,
                        &format!("Enter {activity} in {unit}, or 'b' to pick another activity"),
                    )
                    .await?;
                    match parse_quantity(&line) {
                        Reply::Value(quantity) => LogStep::Confirm { activity, quantity },
                        Reply::Back => LogStep::SelectActivity,
                        Reply::Invalid => {
                            debug!("Invalid quantity {line:?}");
                            self.console.error("Please enter a non-negative number");
                            LogStep::EnterQuantity { activity }
                        }
                    }
                }
                LogStep::Confirm { activity, quantity } => {
                    let pending = build_entry(&preset, &activity, quantity, self.clock.time())?;
                    self.console
                        .say(&format!("\nPending entry: {}", describe_entry(&pending)));
                    let line = ask(
                        &mut self.console,
                        "Enter 'y' to confirm, or 'b' to correct the quantity",
                    )
                    .await?;
                    match parse_confirmation(&line) {
                        Reply::Value(()) => {
                            // Stamped with the moment of confirmation.
                            let entry =
                                build_entry(&preset, &activity, quantity, self.clock.time())?;
                            let record = commit_entry(&self.store, self.current_record()?, entry)?;
                            self.console.say("Entry confirmed.");
                            return Ok(FlowOutcome::Committed(record));
                        }
                        Reply::Back => LogStep::EnterQuantity { activity },
                        Reply::Invalid => LogStep::Confirm { activity, quantity },
                    }
                }
            };
        }
    }
}
