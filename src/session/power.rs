use thiserror::Error;

use crate::storage::{entities::UserRecord, record_store::RecordStore};

use super::{
    activity::{build_entry, commit_entry, describe_entry},
    console::Console,
    prompt::{parse_quantity, Reply},
    SessionController, SessionError,
};

const KEYWORD: &str = "log";

/// `log <activity> <quantity>` typed at the main menu.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerCommand {
    pub activity: String,
    pub quantity: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum PowerCommandError {
    #[error("expected `log <activity> <quantity>`")]
    Usage,
    #[error("`{0}` is not a non-negative number")]
    Quantity(String),
}

pub fn is_power_command(input: &str) -> bool {
    input.split_whitespace().next() == Some(KEYWORD)
}

pub fn parse(input: &str) -> Result<PowerCommand, PowerCommandError> {
    let tokens = input.split_whitespace().collect::<Vec<_>>();
    let [KEYWORD, activity, quantity] = tokens.as_slice() else {
        return Err(PowerCommandError::Usage);
    };
    match parse_quantity(quantity) {
        Reply::Value(value) => Ok(PowerCommand {
            activity: activity.to_string(),
            quantity: value,
        }),
        Reply::Back | Reply::Invalid => Err(PowerCommandError::Quantity(quantity.to_string())),
    }
}

impl<S: RecordStore, C: Console> SessionController<S, C> {
    /// Same mutation as confirming the Log Mission flow, without the screens in between.
    pub(super) async fn run_power_command(
        &mut self,
        input: &str,
    ) -> Result<UserRecord, SessionError> {
        let command = parse(input)?;
        let catalog = self.catalog.load()?;
        let preset = self.active_preset(&catalog)?;
        let entry = build_entry(&preset, &command.activity, command.quantity, self.clock.time())?;
        let description = describe_entry(&entry);
        let record = commit_entry(&self.store, self.current_record()?, entry)?;
        self.console.say(&format!("Entry confirmed: {description}"));
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        session::{
            testing::{controller, pilot_record, test_moment},
            SessionEnd,
        },
        storage::{
            entities::LogEntry,
            record_store::{JsonRecordStore, MockRecordStore, RecordStore, StoreError},
        },
    };

    use super::{is_power_command, parse, PowerCommand, PowerCommandError};

    #[test]
    fn test_parse() {
        assert_eq!(
            parse("log sleep 7"),
            Ok(PowerCommand {
                activity: "sleep".into(),
                quantity: 7.
            })
        );
        assert_eq!(
            parse("  log   fitness\t42.5 "),
            Ok(PowerCommand {
                activity: "fitness".into(),
                quantity: 42.5
            })
        );
        assert_eq!(parse("log sleep"), Err(PowerCommandError::Usage));
        assert_eq!(parse("log sleep 7 hours"), Err(PowerCommandError::Usage));
        assert_eq!(parse("log"), Err(PowerCommandError::Usage));
        assert_eq!(
            parse("log sleep lots"),
            Err(PowerCommandError::Quantity("lots".into()))
        );
        assert_eq!(
            parse("log sleep -3"),
            Err(PowerCommandError::Quantity("-3".into()))
        );
    }

    #[test]
    fn test_is_power_command() {
        assert!(is_power_command("log sleep 7"));
        assert!(is_power_command("log"));
        assert!(!is_power_command("logbook"));
        assert!(!is_power_command("1"));
    }

    #[tokio::test]
    async fn test_power_command_matches_interactive_entry() -> Result<()> {
        let power_dir = tempdir()?;
        let power_store = JsonRecordStore::in_dir(power_dir.path());
        power_store.save(&pilot_record())?;
        let mut power = controller(&power_store, &["log sleep 7", "exit"]);
        assert_eq!(power.run().await?, SessionEnd::Quit);

        let flow_dir = tempdir()?;
        let flow_store = JsonRecordStore::in_dir(flow_dir.path());
        flow_store.save(&pilot_record())?;
        let mut flow = controller(&flow_store, &["1", "1", "7", "y", "exit"]);
        assert_eq!(flow.run().await?, SessionEnd::Quit);

        let from_power = power_store.load()?.unwrap();
        assert_eq!(
            from_power.flight_logs.last(),
            Some(&LogEntry::new(test_moment(), "sleep", 7., "hours"))
        );
        assert_eq!(from_power, flow_store.load()?.unwrap());
        Ok(())
    }

    #[tokio::test]
    async fn test_power_command_failures_keep_session_running() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonRecordStore::in_dir(dir.path());
        store.save(&pilot_record())?;
        let mut session = controller(
            &store,
            &["log knitting 3", "log sleep many", "log sleep", "exit"],
        );

        assert_eq!(session.run().await?, SessionEnd::Quit);
        let errors = session.console.errors();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.starts_with("Invalid command") && !e.contains('\n')));
        assert_eq!(store.load()?.unwrap(), pilot_record());
        Ok(())
    }

    #[tokio::test]
    async fn test_power_command_save_failure() -> Result<()> {
        let mut store = MockRecordStore::new();
        store.expect_load().returning(|| Ok(Some(pilot_record())));
        store.expect_save().times(1).returning(|_| {
            Err(StoreError::Write {
                path: "user_data.json".into(),
                source: std::io::Error::other("read-only file system"),
            })
        });
        let mut session = controller(store, &["log sleep 7", "exit"]);

        assert_eq!(session.run().await?, SessionEnd::Quit);
        assert!(!session.console.printed("Entry confirmed"));
        assert_eq!(session.console.errors().len(), 1);
        assert_eq!(session.record(), Some(&pilot_record()));
        Ok(())
    }
}
