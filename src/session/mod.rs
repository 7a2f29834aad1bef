//! Interactive session. [SessionController] owns the in-memory copy of the user record and moves
//! between named states. Every flow works on a copy of the record and only hands the new record
//! back once [RecordStore::save] has succeeded.

pub mod account;
pub mod activity;
pub mod console;
pub mod difficulty;
pub mod power;
pub mod prompt;
pub mod setup;
pub mod view;

#[cfg(test)]
mod testing;

use std::{io, time::Duration};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    catalog::{Catalog, CatalogError, CatalogSource, DifficultyPreset},
    storage::{
        entities::UserRecord,
        record_store::{RecordStore, StoreError},
    },
    utils::clock::Clock,
};

use self::{activity::ActivityError, console::Console, power::PowerCommandError, prompt::ask};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("input was closed")]
    InputClosed,
    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Activity(#[from] ActivityError),
    #[error(transparent)]
    PowerCommand(#[from] PowerCommandError),
    #[error("difficulty `{0}` is not in the catalog")]
    UnknownDifficulty(String),
    #[error("no user record is loaded")]
    NotSetUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Setup,
    Menu,
    LogActivity,
    ViewLog,
    AdjustDifficulty,
    ResetAccount,
}

/// Why the session loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    InputClosed,
    /// The record is gone. The process has to exit instead of continuing without it.
    AccountDeleted,
}

/// Terminal outcome of a flow.
#[derive(Debug)]
pub enum FlowOutcome {
    Committed(UserRecord),
    Cancelled,
    Deleted,
}

enum Step {
    To(SessionState),
    End(SessionEnd),
}

const MENU: [(&str, &str, SessionState); 4] = [
    ("1", "Log Mission", SessionState::LogActivity),
    ("2", "View Mission Log", SessionState::ViewLog),
    ("3", "Adjust Difficulty", SessionState::AdjustDifficulty),
    ("4", "Reset Account", SessionState::ResetAccount),
];

pub struct SessionController<S, C> {
    store: S,
    catalog: CatalogSource,
    console: C,
    clock: Box<dyn Clock>,
    pace: Duration,
    record: Option<UserRecord>,
}

impl<S: RecordStore, C: Console> SessionController<S, C> {
    pub fn new(
        store: S,
        catalog: CatalogSource,
        console: C,
        clock: Box<dyn Clock>,
        pace: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            console,
            clock,
            pace,
            record: None,
        }
    }

    pub fn record(&self) -> Option<&UserRecord> {
        self.record.as_ref()
    }

    /// Runs the session until the user quits, input closes or the account gets deleted.
    /// A corrupt record or a broken catalog during setup are returned as errors.
    pub async fn run(&mut self) -> Result<SessionEnd, SessionError> {
        self.console.title(&format!(
            "LIFE FLIGHT SIMULATOR (v{})",
            env!("CARGO_PKG_VERSION")
        ));
        self.pause().await;
        self.console.say("Taking flight...");
        self.pause().await;

        self.record = self.store.load()?;
        let mut state = self.initial_state();
        info!("Starting session in {state:?}");

        loop {
            let step = match state {
                SessionState::Setup => self.run_setup().await.map(|record| {
                    self.record = Some(record);
                    Step::To(SessionState::Menu)
                }),
                SessionState::Menu => self.run_menu().await,
                SessionState::LogActivity => {
                    let outcome = self.run_log_mission().await;
                    self.settle(outcome)
                }
                SessionState::ViewLog => self
                    .run_view_log()
                    .await
                    .map(|_| Step::To(SessionState::Menu)),
                SessionState::AdjustDifficulty => {
                    let outcome = self.run_adjust_difficulty().await;
                    self.settle(outcome)
                }
                SessionState::ResetAccount => {
                    let outcome = self.run_reset_account().await;
                    self.settle(outcome)
                }
            };

            match step {
                Ok(Step::To(next)) => {
                    debug!("{state:?} -> {next:?}");
                    state = next;
                }
                Ok(Step::End(end)) => {
                    info!("Session ended: {end:?}");
                    return Ok(end);
                }
                Err(SessionError::InputClosed) => {
                    info!("Input closed in {state:?}");
                    return Ok(SessionEnd::InputClosed);
                }
                // Setup can't be skipped, so there is no state to fall back to.
                Err(e) if state == SessionState::Setup => return Err(e),
                Err(e) => {
                    error!("Flow {state:?} failed: {e:?}");
                    self.console.error(&format!("Mission aborted: {e}"));
                    state = SessionState::Menu;
                }
            }
        }
    }

    fn initial_state(&self) -> SessionState {
        match &self.record {
            Some(record) if record.is_complete() => SessionState::Menu,
            _ => SessionState::Setup,
        }
    }

    fn settle(&mut self, outcome: Result<FlowOutcome, SessionError>) -> Result<Step, SessionError> {
        match outcome? {
            FlowOutcome::Committed(record) => {
                self.record = Some(record);
                Ok(Step::To(SessionState::Menu))
            }
            FlowOutcome::Cancelled => Ok(Step::To(SessionState::Menu)),
            FlowOutcome::Deleted => {
                self.record = None;
                Ok(Step::End(SessionEnd::AccountDeleted))
            }
        }
    }

    async fn run_menu(&mut self) -> Result<Step, SessionError> {
        self.console.title(
            "\n################################\n\
             MISSION CONTROL\n\
             ################################\n",
        );
        for (key, label, _) in MENU {
            self.console.say(&format!("[{key}] {label}"));
        }
        let line = ask(
            &mut self.console,
            "Enter your [selection], `log <activity> <quantity>`, or 'exit' to power down:",
        )
        .await?;
        let command = line.trim();

        if power::is_power_command(command) {
            self.power_command(command).await;
            return Ok(Step::To(SessionState::Menu));
        }

        match command {
            "exit" | "b" => {
                self.console.say("\nPowering down, over and out.");
                Ok(Step::End(SessionEnd::Quit))
            }
            _ => match MENU.iter().find(|(key, _, _)| *key == command) {
                Some((_, _, state)) => Ok(Step::To(*state)),
                None => {
                    debug!("Unknown menu input {command:?}");
                    self.console.error("Invalid selection");
                    Ok(Step::To(SessionState::Menu))
                }
            },
        }
    }

    /// Every failure of a power command ends up as a single line. The menu keeps running.
    async fn power_command(&mut self, command: &str) {
        match self.run_power_command(command).await {
            Ok(record) => self.record = Some(record),
            Err(e @ (SessionError::PowerCommand(_) | SessionError::Activity(_))) => {
                debug!("Rejected power command {command:?}: {e}");
                self.console.error(&format!("Invalid command: {e}"));
            }
            Err(e) => {
                error!("Power command {command:?} failed: {e:?}");
                self.console.error(&format!("Command failed: {e}"));
            }
        }
    }

    fn current_record(&self) -> Result<&UserRecord, SessionError> {
        self.record.as_ref().ok_or(SessionError::NotSetUp)
    }

    /// Resolves the preset of the current record. Fails closed when the difficulty is missing
    /// from the catalog.
    fn active_preset(&self, catalog: &Catalog) -> Result<DifficultyPreset, SessionError> {
        let record = self.current_record()?;
        catalog
            .find(&record.difficulty_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownDifficulty(record.difficulty_id.clone()))
    }

    async fn pause(&self) {
        self.clock.sleep(self.pace).await;
    }
}
