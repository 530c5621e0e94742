use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use market_data::io::json::{TIMESTAMP_FIELD, table_from_str};
use market_data::{BarSeries, DataError, MetaValue, Timeframe};

const ROWS: &str = r#"[
    {"timestamp": "2024-01-01T09:30:00Z", "open": 16000, "high": 16002, "low": 15998, "close": 16001, "volume": 100, "is_macro_event_day": false},
    {"timestamp": "2024-01-01T09:31:00Z", "open": 16001, "high": 16003, "low": 15999, "close": 16002, "volume": 120, "is_macro_event_day": false},
    {"timestamp": "2024-01-01T09:32:00Z", "open": 16002, "high": 16005, "low": 16000, "close": 16004, "volume": 90,  "is_macro_event_day": true}
]"#;

#[test]
fn json_rows_become_a_validated_series() {
    let table = table_from_str(ROWS, TIMESTAMP_FIELD).expect("parse");
    let series =
        BarSeries::from_table(table, "NQ", Timeframe::minute(), Tz::America__New_York)
            .expect("valid");

    assert_eq!(series.len(), 3);
    assert_eq!(
        series.bars[0].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    );
    assert_eq!(series.bars[2].high, 16005.0);
    assert_eq!(series.last_close(), Some(16004.0));
    assert_eq!(
        series.metadata_column("is_macro_event_day").unwrap()[2],
        MetaValue::Bool(true)
    );
}

#[test]
fn offsets_are_normalized_to_utc() {
    let rows = r#"[{"timestamp": "2024-01-01T09:30:00-05:00", "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1}]"#;
    let table = table_from_str(rows, TIMESTAMP_FIELD).unwrap();
    let series = BarSeries::from_table(table, "NQ", Timeframe::minute(), Tz::UTC).unwrap();
    assert_eq!(
        series.bars[0].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 1, 14, 30, 0).unwrap()
    );
}

#[test]
fn missing_volume_fails_the_whole_table() {
    let rows = r#"[{"timestamp": "2024-01-01T09:30:00Z", "open": 1, "high": 1, "low": 1, "close": 1}]"#;
    let table = table_from_str(rows, TIMESTAMP_FIELD).unwrap();
    let err = BarSeries::from_table(table, "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
    assert_eq!(
        err,
        DataError::Schema {
            missing: vec!["volume".into()],
            message: "missing or non-numeric OHLCV columns: volume".into(),
        }
    );
}

#[test]
fn unparseable_timestamps_are_an_index_error() {
    let rows = r#"[{"timestamp": "yesterday", "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1}]"#;
    let table = table_from_str(rows, TIMESTAMP_FIELD).unwrap();
    let err = BarSeries::from_table(table, "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
    assert!(matches!(err, DataError::IndexType(msg) if msg.contains("text")));
}
