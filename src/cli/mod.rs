pub mod history;

use std::{
    io::{stdout, IsTerminal},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use history::{process_history_command, HistoryCommand};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    catalog::CatalogSource,
    session::{console::TerminalConsole, SessionController, SessionEnd},
    storage::record_store::JsonRecordStore,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, SESSION_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "missionlog", version, long_about = None)]
#[command(about = "Terminal mission log for sleep, fitness and screen time goals", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Difficulty catalog. By default uses levels.json in the application directory or the bundled one"
    )]
    levels: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long = "pace-ms",
        global = true,
        default_value_t = 400,
        help = "Pause between screens in milliseconds. 0 disables pauses"
    )]
    pace_ms: u64,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start an interactive session. This is the default")]
    Start,
    #[command(about = "Print logged entries of a date range")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)
        .context("Failed to prepare the application directory")?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(SESSION_PREFIX, &application_dir, logging_level, args.log)?;

    let catalog = CatalogSource::resolve(args.levels, &application_dir);
    info!("Using {application_dir:?} with catalog {catalog:?}");

    match args.commands {
        None | Some(Commands::Start) => {
            start_session(
                application_dir,
                catalog,
                Duration::from_millis(args.pace_ms),
            )
            .await
        }
        Some(Commands::History { command }) => process_history_command(command, &application_dir),
    }
}

async fn start_session(
    application_dir: PathBuf,
    catalog: CatalogSource,
    pace: Duration,
) -> Result<()> {
    let store = JsonRecordStore::in_dir(&application_dir);
    let console = TerminalConsole::new(stdout().is_terminal());
    let mut session =
        SessionController::new(store, catalog, console, Box::new(DefaultClock), pace);

    match session.run().await.context("Mission control failed")? {
        SessionEnd::Quit | SessionEnd::InputClosed => {}
        SessionEnd::AccountDeleted => info!("Account deleted, exiting"),
    }
    Ok(())
}
