//! UTC bucket mapping utilities.
//!
//! - One stable epoch: Unix (1970-01-01T00:00:00Z).
//! - Fixed-size frames (minute/hour/day): second-based math.
//! - Week: Monday 00:00:00Z–aligned using a week epoch of 1969-12-29.
//! - Month: linear (year, month) indexing relative to 1970-01.
//!
//! Buckets are right-closed and right-labeled: bucket `k` covers
//! `(boundary(k-1), boundary(k)]` and is labeled `boundary(k)`. A timestamp
//! sitting exactly on a boundary belongs to the bucket that ends there.
//!
//! All functions assume the input timestamp is UTC.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use market_data::models::timeframe::{Timeframe, TimeframeUnit};

/// Unix epoch start (1970-01-01T00:00:00Z).
pub const EPOCH_UNIX: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Number of seconds in a day.
pub const SECS_PER_DAY: i64 = 86_400;
/// Number of seconds in a week.
pub const SECS_PER_WEEK: i64 = 7 * SECS_PER_DAY;

/// shift so Monday 1969-12-29 00:00Z becomes index 0
const WEEK_MONDAY_ANCHOR_OFFSET_SECS: i64 = 3 * SECS_PER_DAY; // +3d

/// Right-closed bucket id for a UTC timestamp.
///
/// Ids are signed so pre-1970 data still maps to distinct buckets.
pub fn bucket_id(ts_utc: DateTime<Utc>, tf: Timeframe) -> i64 {
    match tf.unit() {
        TimeframeUnit::Week => id_week(ts_utc, tf.amount().get()),
        TimeframeUnit::Month => id_month(ts_utc, tf.amount().get()),
        _ => {
            // fixed_secs is Some for every non-month unit
            let width = tf.fixed_secs().unwrap_or(60);
            id_fixed(ts_utc, width)
        }
    }
}

/// The right edge (label) of bucket `id`.
pub fn bucket_label_utc(id: i64, tf: Timeframe) -> DateTime<Utc> {
    match tf.unit() {
        TimeframeUnit::Week => label_week(id, tf.amount().get()),
        TimeframeUnit::Month => label_month(id, tf.amount().get()),
        _ => label_fixed(id, tf.fixed_secs().unwrap_or(60)),
    }
}

/// Label of the bucket that contains `ts_utc`: the smallest boundary `>= ts_utc`.
pub fn bucket_end_utc(ts_utc: DateTime<Utc>, tf: Timeframe) -> DateTime<Utc> {
    bucket_label_utc(bucket_id(ts_utc, tf), tf)
}

// ----- fixed-size internals (minute/hour/day) -----

fn ceil_div(secs: i64, width: i64) -> i64 {
    -((-secs).div_euclid(width))
}

fn id_fixed(ts_utc: DateTime<Utc>, bucket_secs: i64) -> i64 {
    // sub-second parts push a timestamp past an exact boundary
    let secs = ts_utc.timestamp() + i64::from(ts_utc.nanosecond() > 0);
    ceil_div(secs, bucket_secs)
}

fn label_fixed(id: i64, bucket_secs: i64) -> DateTime<Utc> {
    EPOCH_UNIX + Duration::seconds(id * bucket_secs)
}

// ----- week internals (Monday-aligned) -----

fn id_week(ts_utc: DateTime<Utc>, amount: u32) -> i64 {
    let secs = ts_utc.timestamp() + i64::from(ts_utc.nanosecond() > 0);
    let width = SECS_PER_WEEK * amount as i64;
    ceil_div(secs + WEEK_MONDAY_ANCHOR_OFFSET_SECS, width)
}

fn label_week(id: i64, amount: u32) -> DateTime<Utc> {
    let width = SECS_PER_WEEK * amount as i64;
    // convert back to unix seconds, subtract the +3d we added on the way in
    EPOCH_UNIX + Duration::seconds(id * width - WEEK_MONDAY_ANCHOR_OFFSET_SECS)
}

// ----- month internals (calendar-aware) -----

fn month_index(ts_utc: DateTime<Utc>) -> i64 {
    (ts_utc.year() as i64 - 1970) * 12 + (ts_utc.month() as i64 - 1)
}

fn month_start(idx: i64) -> DateTime<Utc> {
    let y = 1970 + idx.div_euclid(12);
    let month = (idx.rem_euclid(12) + 1) as u32; // 1..12
    Utc.with_ymd_and_hms(y as i32, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(EPOCH_UNIX)
}

fn id_month(ts_utc: DateTime<Utc>, amount: u32) -> i64 {
    let idx = month_index(ts_utc);
    // index of the first month start at or after ts
    let end_idx = if ts_utc == month_start(idx) { idx } else { idx + 1 };
    ceil_div(end_idx, amount as i64)
}

fn label_month(id: i64, amount: u32) -> DateTime<Utc> {
    month_start(id * amount as i64)
}

// -------------------- tests --------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn tf(s: &str) -> Timeframe {
        s.parse().unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn minute_boundaries_are_right_closed() {
        let two = tf("2m");
        // 09:30 sits on a boundary: it closes the (09:28, 09:30] bucket
        assert_eq!(bucket_end_utc(at(9, 30, 0), two), at(9, 30, 0));
        assert_eq!(bucket_end_utc(at(9, 31, 0), two), at(9, 32, 0));
        assert_eq!(bucket_end_utc(at(9, 32, 0), two), at(9, 32, 0));
        assert_eq!(bucket_end_utc(at(9, 32, 1), two), at(9, 34, 0));
    }

    #[test]
    fn one_minute_buckets_are_identity_on_aligned_bars() {
        let one = tf("1m");
        for m in 0..60 {
            assert_eq!(bucket_end_utc(at(10, m, 0), one), at(10, m, 0));
        }
    }

    #[test]
    fn hour_and_day() {
        assert_eq!(bucket_end_utc(at(9, 30, 0), tf("1h")), at(10, 0, 0));
        assert_eq!(
            bucket_end_utc(at(9, 30, 0), tf("1D")),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(bucket_end_utc(at(0, 0, 0), tf("1D")), at(0, 0, 0));
    }

    #[test]
    fn weeks_end_on_monday() {
        // 2024-01-03 is a Wednesday, next Monday is 2024-01-08
        let wed = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        let label = bucket_end_utc(wed, tf("1W"));
        assert_eq!(label, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
        assert_eq!(label.weekday(), chrono::Weekday::Mon);
    }

    #[test]
    fn month_boundaries_and_leap_day() {
        let feb29 = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(
            bucket_end_utc(feb29, tf("1M")),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        let mar1 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(bucket_end_utc(mar1, tf("1M")), mar1);
        // quarters: Jan..Mar closes at Apr 1
        assert_eq!(
            bucket_end_utc(feb29, tf("3M")),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn pre_epoch_timestamps_still_bucket() {
        let t = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 30).unwrap();
        assert_eq!(bucket_end_utc(t, tf("1m")), EPOCH_UNIX);
    }
}
