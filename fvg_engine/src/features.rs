//! Session and calendar annotations for bar series.
//!
//! Adds four metadata columns, leaving the price columns untouched:
//!
//! - `session`: label from the [`SessionConfig`] windows
//! - `weekday`: day of week on the series' exchange clock, Monday = 0
//! - `weekday_name`: `"Monday"` ... `"Sunday"`
//! - `is_macro_event_day`: exchange-local date is a flagged macro date (CPI, FOMC, ...)
//!
//! The columns ride along through [`crate::resample::resample`], which samples
//! them at each bucket boundary.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use market_data::{BarSeries, MetaValue};

use crate::{errors::Result, sessions::SessionConfig, tz::local_date};

fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Return a copy of `series` with session and calendar columns attached.
///
/// An empty series comes back unchanged.
pub fn annotate_calendar(
    series: &BarSeries,
    sessions: &SessionConfig,
    macro_event_dates: &[NaiveDate],
) -> Result<BarSeries> {
    let mut out = series.clone();
    if series.is_empty() {
        return Ok(out);
    }

    let macro_dates: HashSet<NaiveDate> = macro_event_dates.iter().copied().collect();

    let n = series.len();
    let mut session = Vec::with_capacity(n);
    let mut weekday = Vec::with_capacity(n);
    let mut names = Vec::with_capacity(n);
    let mut is_macro = Vec::with_capacity(n);

    for ts in series.timestamps() {
        let date = local_date(ts, series.tz);
        let wd = date.weekday();
        session.push(MetaValue::Text(sessions.session_for(ts).to_string()));
        weekday.push(MetaValue::Int(i64::from(wd.num_days_from_monday())));
        names.push(MetaValue::Text(weekday_name(wd).to_string()));
        is_macro.push(MetaValue::Bool(macro_dates.contains(&date)));
    }

    out.set_metadata_column("session", session)?;
    out.set_metadata_column("weekday", weekday)?;
    out.set_metadata_column("weekday_name", names)?;
    out.set_metadata_column("is_macro_event_day", is_macro)?;
    Ok(out)
}
