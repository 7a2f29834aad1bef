use tracing::info;

use crate::{
    catalog::DifficultyPreset,
    storage::{
        entities::UserRecord,
        record_store::{RecordStore, StoreError},
    },
};

use super::{
    console::Console,
    prompt::{confirm, describe_preset, opt_in, select_preset},
    FlowOutcome, SessionController, SessionError,
};

/// Switches the record to `preset`. Only `difficulty_id` changes, logged entries keep the units
/// they were recorded with.
pub fn apply_difficulty(
    store: &impl RecordStore,
    record: &UserRecord,
    preset: &DifficultyPreset,
) -> Result<UserRecord, StoreError> {
    let next = record.with_difficulty(preset.id.clone());
    store.save(&next)?;
    info!(
        "Difficulty changed from {} to {}",
        record.difficulty_id, next.difficulty_id
    );
    Ok(next)
}

enum DifficultyStep {
    ShowCurrent,
    Warn,
    SelectNew,
    ConfirmNew(DifficultyPreset),
}

impl<S: RecordStore, C: Console> SessionController<S, C> {
    pub(super) async fn run_adjust_difficulty(&mut self) -> Result<FlowOutcome, SessionError> {
        let catalog = self.catalog.load()?;
        let current_id = self.current_record()?.difficulty_id.clone();
        let mut step = DifficultyStep::ShowCurrent;

        loop {
            step = match step {
                DifficultyStep::ShowCurrent => {
                    self.console.title("\nADJUST DIFFICULTY");
                    match catalog.find(&current_id) {
                        Some(preset) => {
                            self.console.say(&format!(
                                "Current difficulty: [{}]",
                                current_id.to_uppercase()
                            ));
                            describe_preset(&mut self.console, preset);
                        }
                        None => self.console.error(&format!(
                            "Current difficulty `{current_id}` is not in the catalog"
                        )),
                    }
                    let proceed = opt_in(
                        &mut self.console,
                        "Enter 'y' to change difficulty, anything else returns to mission control",
                    )
                    .await?;
                    if !proceed {
                        return Ok(FlowOutcome::Cancelled);
                    }
                    DifficultyStep::Warn
                }
                DifficultyStep::Warn => {
                    let proceed = opt_in(
                        &mut self.console,
                        "WARNING: changing difficulty resets your mission streak.\n\
                         Enter 'y' to proceed, anything else aborts",
                    )
                    .await?;
                    if !proceed {
                        return Ok(FlowOutcome::Cancelled);
                    }
                    DifficultyStep::SelectNew
                }
                DifficultyStep::SelectNew => {
                    match select_preset(&mut self.console, &catalog, true).await? {
                        None => return Ok(FlowOutcome::Cancelled),
                        Some(preset) if preset.id == current_id => {
                            self.console.error(&format!(
                                "[{}] is already active",
                                current_id.to_uppercase()
                            ));
                            DifficultyStep::SelectNew
                        }
                        Some(preset) => {
                            self.pause().await;
                            DifficultyStep::ConfirmNew(preset)
                        }
                    }
                }
                DifficultyStep::ConfirmNew(preset) => {
                    self.console
                        .say(&format!("\nYou selected [{}].\n", preset.id.to_uppercase()));
                    describe_preset(&mut self.console, &preset);
                    let confirmed = confirm(
                        &mut self.console,
                        "Enter 'y' to confirm the new difficulty, or 'b' to return to selection",
                    )
                    .await?;
                    if !confirmed {
                        DifficultyStep::SelectNew
                    } else {
                        let record =
                            apply_difficulty(&self.store, self.current_record()?, &preset)?;
                        self.console.say(&format!(
                            "Difficulty set to [{}].",
                            preset.id.to_uppercase()
                        ));
                        return Ok(FlowOutcome::Committed(record));
                    }
                }
            };
        }
    }
}
