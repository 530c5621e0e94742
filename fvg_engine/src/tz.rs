//! Time zone parsing and conversion helpers.
//!
//! Bars are stored in UTC. Local wall-clock time only matters at the edges:
//! session windows are written in exchange-local time and macro-event days
//! are local calendar dates.
//!
//! - [`parse_tz`]: IANA name (e.g. "America/New_York") to [`Tz`].
//! - [`local_time_of_day`] / [`local_date`]: view a UTC instant on the local clock.
//! - [`parse_time_of_day`]: `"HH:MM"` or `"HH:MM:SS"` to [`NaiveTime`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::errors::{Error, Result};

/// Parse an IANA time zone name.
pub fn parse_tz(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| Error::Config(format!("bad tz {name:?}: {e}")))
}

/// Local wall-clock time of a UTC instant.
///
/// DST is handled by chrono-tz: 14:30Z is 09:30 in New York in January and
/// 10:30 in July.
pub fn local_time_of_day(ts_utc: DateTime<Utc>, tz: Tz) -> NaiveTime {
    ts_utc.with_timezone(&tz).time()
}

/// Local calendar date of a UTC instant.
pub fn local_date(ts_utc: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts_utc.with_timezone(&tz).date_naive()
}

/// Parse `"HH:MM"` or `"HH:MM:SS"`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| Error::Config(format!("bad time of day {s:?}: {e}")))
}
