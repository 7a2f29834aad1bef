//! Reset Account. Archiving and deletion are two separately confirmed steps: the record is only
//! removed after an archive for this invocation has been written.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::storage::record_store::{RecordStore, StoreError};

use super::{
    console::Console,
    prompt::{ask, opt_in},
    FlowOutcome, SessionController, SessionError,
};

/// Typed in full to erase the record. Deliberately different from the `y` used elsewhere.
pub const DELETE_TOKEN: &str = "DELETE";

enum ResetStep {
    Warn,
    Archive,
    ConfirmDelete { archive: PathBuf },
}

impl<S: RecordStore, C: Console> SessionController<S, C> {
    pub(super) async fn run_reset_account(&mut self) -> Result<FlowOutcome, SessionError> {
        let mut step = ResetStep::Warn;

        loop {
            step = match step {
                ResetStep::Warn => {
                    self.console.title("\nRESET ACCOUNT");
                    let name = self.current_record()?.user_name.clone();
                    let proceed = opt_in(
                        &mut self.console,
                        &format!(
                            "This archives and then erases the mission log of {name}.\n\
                             Enter 'y' to continue, anything else returns to mission control"
                        ),
                    )
                    .await?;
                    if !proceed {
                        return Ok(FlowOutcome::Cancelled);
                    }
                    ResetStep::Archive
                }
                ResetStep::Archive => {
                    let line = ask(
                        &mut self.console,
                        "Enter a file name for the archive, or 'b' to cancel",
                    )
                    .await?;
                    if matches!(line.trim(), "b" | "back") {
                        return Ok(FlowOutcome::Cancelled);
                    }
                    match self.store.archive(self.current_record()?, &line) {
                        Ok(archive) => {
                            self.console
                                .say(&format!("Mission log archived to {}", archive.display()));
                            ResetStep::ConfirmDelete { archive }
                        }
                        Err(
                            e @ (StoreError::ArchiveExists(_) | StoreError::InvalidArchiveName(_)),
                        ) => {
                            warn!("Archive rejected: {e}");
                            self.console.error(&format!("{e}, choose another name"));
                            ResetStep::Archive
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                ResetStep::ConfirmDelete { archive } => {
                    let line = ask(
                        &mut self.console,
                        &format!(
                            "Type {DELETE_TOKEN} to erase your mission log. Anything else keeps it"
                        ),
                    )
                    .await?;
                    if line.trim() != DELETE_TOKEN {
                        info!("Deletion declined, archive kept at {archive:?}");
                        self.console.say(&format!(
                            "Mission log kept. The archive stays at {}",
                            archive.display()
                        ));
                        return Ok(FlowOutcome::Cancelled);
                    }
                    self.store.delete()?;
                    self.console
                        .say("Mission log erased. Launch again to start a new mission.");
                    return Ok(FlowOutcome::Deleted);
                }
            };
        }
    }
}
