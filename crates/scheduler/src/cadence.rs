//! Time-of-day cadence buckets (§4.2). Pure functions so the "is this club
//! due" decision is testable against a frozen clock without a database.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Peak,
    Day,
    Night,
}

impl Bucket {
    pub fn min_interval(self) -> chrono::Duration {
        match self {
            Bucket::Peak => chrono::Duration::minutes(2),
            Bucket::Day => chrono::Duration::minutes(5),
            Bucket::Night => chrono::Duration::minutes(10),
        }
    }
}

fn time_in(t: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        t >= start && t < end
    } else {
        // wraps midnight
        t >= start || t < end
    }
}

/// Classify a club-local time-of-day into its cadence bucket.
pub fn bucket_for(local_time: NaiveTime) -> Bucket {
    let peak_morning = (NaiveTime::from_hms_opt(5, 0, 0).unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    let peak_evening = (NaiveTime::from_hms_opt(17, 0, 0).unwrap(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    let day = (NaiveTime::from_hms_opt(9, 0, 0).unwrap(), NaiveTime::from_hms_opt(17, 0, 0).unwrap());

    if time_in(local_time, peak_morning.0, peak_morning.1) || time_in(local_time, peak_evening.0, peak_evening.1) {
        Bucket::Peak
    } else if time_in(local_time, day.0, day.1) {
        Bucket::Day
    } else {
        Bucket::Night
    }
}

/// Whether a club is due for a scrape: `now - last_success >= interval`.
/// A club with no prior successful scrape is always due.
pub fn is_due(last_success: Option<DateTime<Utc>>, now: DateTime<Utc>, tz: Tz) -> bool {
    let Some(last_success) = last_success else {
        return true;
    };
    let local_now = now.with_timezone(&tz).time();
    let bucket = bucket_for(local_now);
    now - last_success >= bucket.min_interval()
}
