use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use now::DateTimeNow;

use crate::catalog::Period;

/// This is the standard way of showing an entry timestamp in missionlog.
pub fn format_moment(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Returns start of the next day.
pub fn next_day_start<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<Tz> {
    let next = date + Duration::days(1);
    next.clone()
        .with_time(NaiveTime::MIN)
        .earliest()
        .unwrap_or(next)
}

/// Returns start of the period `moment` falls into.
pub fn period_start<Tz: TimeZone>(moment: DateTime<Tz>, period: Period) -> DateTime<Tz> {
    match period {
        Period::Day => moment.beginning_of_day(),
        Period::Week => moment.beginning_of_week(),
    }
}
