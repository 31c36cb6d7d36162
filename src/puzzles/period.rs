use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::puzzles::types::WeekPeriod;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Week bucket of `now`: ceil(days since Jan 1 00:00 UTC / 7), never below 1.
pub fn week_period(now: DateTime<Utc>) -> WeekPeriod {
    let year = now.year();
    let week_number = match Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single() {
        Some(start) => {
            let days = (now - start).num_milliseconds() as f64 / MILLIS_PER_DAY;
            ((days / 7.0).ceil() as u32).max(1)
        }
        None => 1,
    };
    WeekPeriod { week_number, year }
}

pub fn current_period() -> WeekPeriod {
    week_period(Utc::now())
}
