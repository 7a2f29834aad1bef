use std::{fmt::Display, path::Path};

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use now::DateTimeNow;

use crate::{
    report::{entries_between, format_entry, totals},
    storage::record_store::{JsonRecordStore, RecordStore},
    utils::time::next_day_start,
};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(
        long = "start",
        short,
        help = "Start of the range. Examples are \"yesterday\", \"1 week ago\", \"15/03/2025\". Defaults to 7 days ago"
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "End of the range. Examples are \"today\", \"2 days ago\", \"16/03/2025\". Defaults to now"
    )]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long = "days",
        default_value_t = false,
        help = "Take inputs as whole days. For example if start and end are both 15/03/2025 this option allows to extract the whole day"
    )]
    treat_as_days: bool,
    #[arg(short, long, help = "Only show entries of this activity")]
    activity: Option<String>,
}

const DEFAULT_HISTORY_DAYS: i64 = 7;

/// Prints logged entries between `start_date` and `end_date` followed by totals per activity.
pub fn process_history_command(
    HistoryCommand {
        start_date,
        end_date,
        date_style,
        treat_as_days,
        activity,
    }: HistoryCommand,
    application_dir: &Path,
) -> Result<()> {
    let (start, end) = parse_range(start_date, end_date, date_style, treat_as_days, Local::now())?;

    let store = JsonRecordStore::in_dir(application_dir);
    let Some(record) = store.load()? else {
        println!("No mission log yet. Run missionlog to start a mission.");
        return Ok(());
    };

    let entries = entries_between(
        &record.flight_logs,
        start.with_timezone(&Utc),
        end.with_timezone(&Utc),
    )
    .filter(|entry| activity.as_deref().map_or(true, |a| entry.activity == a))
    .collect::<Vec<_>>();

    println!(
        "Mission log of {} from {} to {}",
        record.user_name,
        start.format("%x %H:%M"),
        end.format("%x %H:%M")
    );
    if entries.is_empty() {
        println!("No entries in this range.");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    println!();
    for total in totals(entries) {
        println!(
            "{}\t{} {}\t{} entries",
            total.activity, total.total, total.units, total.entries
        );
    }
    Ok(())
}

/// Also provides sensible defaults for `history` command.
fn parse_range(
    start_date: Option<String>,
    end_date: Option<String>,
    date_style: DateStyle,
    treat_as_days: bool,
    now: DateTime<Local>,
) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let dialect: chrono_english::Dialect = date_style.into();
    let mut start = match start_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => v.with_timezone(&Local),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate start date {e}"),
                )
                .into());
        }
        None => (now - Duration::days(DEFAULT_HISTORY_DAYS)).beginning_of_day(),
    };
    let mut end = match end_date.map(|s| parse_date_string(&s, now, dialect)) {
        Some(Ok(v)) => v.with_timezone(&Local),
        Some(Err(e)) => {
            return Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate end date {e}"),
                )
                .into());
        }
        None => now,
    };
    if treat_as_days {
        start = start.beginning_of_day();
        end = next_day_start(end);
    }
    if start > end {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                "Start of the range is after its end",
            )
            .into());
    }
    Ok((start, end))
}
