//! A collection of time-series bars for a specific symbol and timeframe.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;

use crate::{
    errors::DataError,
    models::{
        bar::Bar,
        table::{BarTable, IndexColumn, MetaValue, REQUIRED_COLUMNS},
        timeframe::Timeframe,
    },
};

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`Timeframe`], making the data set self-describing. Timestamps are
/// UTC; `tz` is the exchange-local zone used for session features.
///
/// `metadata` holds non-price columns, each exactly `bars.len()` long.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL", "NQ").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub timeframe: Timeframe,
    /// Exchange-local time zone.
    pub tz: Tz,
    /// The collection of OHLCV bars, strictly ascending by timestamp.
    pub bars: Vec<Bar>,
    /// Optional non-price columns in insertion order.
    pub metadata: IndexMap<String, Vec<MetaValue>>,
}

impl BarSeries {
    /// Build a series from bars that are already known to be ordered.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, tz: Tz, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            tz,
            bars,
            metadata: IndexMap::new(),
        }
    }

    /// Validate a raw [`BarTable`] and convert it into a typed series.
    ///
    /// Checks, in order:
    /// - the index is a timestamp index, strictly ascending (no duplicates)
    /// - `open, high, low, close, volume` exist and are numeric
    /// - every column is as long as the index
    ///
    /// Any remaining columns are carried over as metadata.
    pub fn from_table(
        table: BarTable,
        symbol: impl Into<String>,
        timeframe: Timeframe,
        tz: Tz,
    ) -> Result<Self, DataError> {
        let BarTable { index, columns } = table;

        let timestamps = match index {
            IndexColumn::Timestamps(ts) => ts,
            other => {
                return Err(DataError::IndexType(format!(
                    "index must contain timestamps, got {} values",
                    other.kind()
                )));
            }
        };
        check_strictly_ascending(&timestamps)?;

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| columns.get(**c).and_then(|col| col.to_f64()).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::Schema {
                message: format!("missing or non-numeric OHLCV columns: {}", missing.join(", ")),
                missing,
            });
        }

        for (name, col) in &columns {
            if col.len() != timestamps.len() {
                return Err(DataError::schema(format!(
                    "column {name:?} has {} rows, index has {}",
                    col.len(),
                    timestamps.len()
                )));
            }
        }

        let numeric = |name: &str| -> Vec<f64> {
            columns
                .get(name)
                .and_then(|c| c.to_f64())
                .unwrap_or_default()
        };
        let (open, high, low, close, volume) = (
            numeric("open"),
            numeric("high"),
            numeric("low"),
            numeric("close"),
            numeric("volume"),
        );

        let bars = timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| Bar::new(ts, open[i], high[i], low[i], close[i], volume[i]))
            .collect();

        let metadata = columns
            .iter()
            .filter(|(name, _)| !REQUIRED_COLUMNS.contains(&name.as_str()))
            .map(|(name, col)| (name.clone(), col.to_meta()))
            .collect();

        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            tz,
            bars,
            metadata,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close of the most recent bar, `None` for an empty series.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.bars.iter().map(|b| b.timestamp)
    }

    pub fn metadata_column(&self, name: &str) -> Option<&[MetaValue]> {
        self.metadata.get(name).map(Vec::as_slice)
    }

    /// Attach (or replace) a metadata column.
    pub fn set_metadata_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<MetaValue>,
    ) -> Result<(), DataError> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(DataError::schema(format!(
                "metadata column {name:?} has {} rows, series has {}",
                values.len(),
                self.bars.len()
            )));
        }
        self.metadata.insert(name, values);
        Ok(())
    }
}

fn check_strictly_ascending(timestamps: &[DateTime<Utc>]) -> Result<(), DataError> {
    if let Some(pos) = timestamps.windows(2).position(|w| w[0] >= w[1]) {
        let (a, b) = (timestamps[pos], timestamps[pos + 1]);
        let what = if a == b { "duplicate" } else { "unsorted" };
        return Err(DataError::IndexType(format!(
            "{what} timestamps at rows {pos}..={}: {a} then {b}",
            pos + 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::table::Column;
    use chrono::{Duration, TimeZone};

    fn ts(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap() + Duration::minutes(n)
    }

    fn table(n: usize) -> BarTable {
        let idx: Vec<_> = (0..n as i64).map(ts).collect();
        BarTable::new(IndexColumn::Timestamps(idx))
            .with_column("open", Column::Float(vec![1.0; n]))
            .with_column("high", Column::Float(vec![2.0; n]))
            .with_column("low", Column::Float(vec![0.5; n]))
            .with_column("close", Column::Float(vec![1.5; n]))
            .with_column("volume", Column::Int(vec![10; n]))
    }

    #[test]
    fn converts_valid_table_and_keeps_extras() {
        let t = table(3).with_column(
            "session",
            Column::Text(vec![Some("RTH".into()), None, Some("ETH".into())]),
        );
        let s = BarSeries::from_table(t, "NQ", Timeframe::minute(), Tz::UTC).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.bars[1].volume, 10.0);
        assert_eq!(s.last_close(), Some(1.5));
        let session = s.metadata_column("session").unwrap();
        assert_eq!(session[0], MetaValue::Text("RTH".into()));
        assert_eq!(session[1], MetaValue::Null);
        assert!(s.metadata_column("open").is_none());
    }

    #[test]
    fn missing_columns_are_listed() {
        let mut t = table(2);
        t.columns.shift_remove("volume");
        t.columns.insert("close".into(), Column::Text(vec![None, None]));
        let err = BarSeries::from_table(t, "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
        match err {
            DataError::Schema { missing, .. } => assert_eq!(missing, vec!["close", "volume"]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn ragged_column_is_schema_error() {
        let t = table(2).with_column("flag", Column::Bool(vec![true]));
        let err = BarSeries::from_table(t, "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
        assert!(matches!(err, DataError::Schema { .. }));
    }

    #[test]
    fn integer_index_is_rejected() {
        let mut t = table(2);
        t.index = IndexColumn::Integers(vec![0, 1]);
        let err = BarSeries::from_table(t, "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
        assert!(matches!(err, DataError::IndexType(_)));
    }

    #[test]
    fn duplicate_and_unsorted_timestamps_are_rejected() {
        let mut t = table(3);
        t.index = IndexColumn::Timestamps(vec![ts(0), ts(0), ts(1)]);
        let err = BarSeries::from_table(t.clone(), "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        t.index = IndexColumn::Timestamps(vec![ts(2), ts(1), ts(3)]);
        let err = BarSeries::from_table(t, "NQ", Timeframe::minute(), Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("unsorted"));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn index_validation_matches_sortedness(
            offsets in proptest::collection::vec(0i64..50, 0..20),
        ) {
            let n = offsets.len();
            let mut t = table(n);
            t.index = IndexColumn::Timestamps(offsets.iter().map(|&o| ts(o)).collect());
            let sorted = offsets.windows(2).all(|w| w[0] < w[1]);

            let res = BarSeries::from_table(t, "NQ", Timeframe::minute(), Tz::UTC);
            if sorted {
                prop_assert_eq!(res.unwrap().len(), n);
            } else {
                prop_assert!(matches!(res, Err(DataError::IndexType(_))));
            }
        }
    }

    #[test]
    fn empty_table_is_valid() {
        let s = BarSeries::from_table(table(0), "NQ", Timeframe::minute(), Tz::UTC).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.last_close(), None);
    }
}
