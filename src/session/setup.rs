use tracing::{error, info};

use crate::storage::{entities::UserRecord, record_store::RecordStore};

use super::{
    console::Console,
    prompt::{ask, confirm, describe_preset, select_preset},
    SessionController, SessionError,
};

/// Setup states. The flow only ends by committing a record.
enum SetupStep {
    NameEntry,
    DifficultySelect,
    DifficultyConfirm(crate::catalog::DifficultyPreset),
}

/// Surrounding whitespace is dropped and whitespace-only names are refused.
pub fn normalize_name(input: &str) -> Option<String> {
    let name = input.trim();
    (!name.is_empty()).then(|| name.to_string())
}

impl<S: RecordStore, C: Console> SessionController<S, C> {
    /// Produces the initial record. A catalog that can't be read is returned as an error since
    /// there is nothing to choose from.
    pub(super) async fn run_setup(&mut self) -> Result<UserRecord, SessionError> {
        let catalog = self.catalog.load()?;
        let mut name = String::new();
        let mut step = SetupStep::NameEntry;

        loop {
            step = match step {
                SetupStep::NameEntry => {
                    let line = ask(
                        &mut self.console,
                        "\nWelcome recruit, please state your name:",
                    )
                    .await?;
                    match normalize_name(&line) {
                        Some(entered) => {
                            name = entered;
                            SetupStep::DifficultySelect
                        }
                        None => {
                            self.console.error("A name is required to start the mission");
                            SetupStep::NameEntry
                        }
                    }
                }
                SetupStep::DifficultySelect => {
                    match select_preset(&mut self.console, &catalog, false).await? {
                        Some(preset) => {
                            self.pause().await;
                            SetupStep::DifficultyConfirm(preset)
                        }
                        None => SetupStep::DifficultySelect,
                    }
                }
                SetupStep::DifficultyConfirm(preset) => {
                    self.console
                        .say(&format!("\nYou selected [{}].\n", preset.id.to_uppercase()));
                    describe_preset(&mut self.console, &preset);
                    let confirmed = confirm(
                        &mut self.console,
                        "Please confirm your mission difficulty:\n\
                         (Enter 'y' to confirm, or 'b' to return to selection page)",
                    )
                    .await?;
                    if !confirmed {
                        SetupStep::DifficultySelect
                    } else {
                        let record = UserRecord::new(name.clone(), preset.id.clone());
                        match self.store.save(&record) {
                            Ok(()) => {
                                info!("Set up {} on {}", record.user_name, record.difficulty_id);
                                self.console
                                    .title("\nMISSION IS A GO\nNavigating to mission control...");
                                self.pause().await;
                                return Ok(record);
                            }
                            Err(e) => {
                                error!("Failed to save new record: {e:?}");
                                self.console
                                    .error(&format!("Failed to save your profile: {e}"));
                                SetupStep::DifficultySelect
                            }
                        }
                    }
                }
            };
        }
    }
}
