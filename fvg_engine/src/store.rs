//! Arrow IPC persistence for gap tables.
//!
//! One file holds one [`GapTable`] as a single record batch. Timestamps are
//! stored as microseconds tagged `"UTC"`, offsets as `UInt64`. Columns not yet
//! computed (`filled_at`, the enrichment columns) are nullable.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMicrosecondArray,
        UInt64Array,
    },
    datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit},
    error::ArrowError,
    ipc::{reader::FileReader, writer::FileWriter},
    record_batch::RecordBatch,
};
use chrono::{DateTime, Utc};
use snafu::{Backtrace, ResultExt, Snafu};
use tracing::info;

use crate::gap::{Direction, Gap, GapTable, PATTERN_TYPE};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    /// No pattern file at the given path.
    #[snafu(display("Pattern file not found: {}", path.display()))]
    NotFound { path: PathBuf },

    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Arrow error: {source}"))]
    Arrow {
        source: ArrowError,
        backtrace: Backtrace,
    },

    /// The file is readable but does not look like a gap table.
    #[snafu(display("Unexpected pattern file layout: {message}"))]
    Schema { message: String },
}

fn utc_micros() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Column layout of a pattern file.
pub fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::UInt64, false),
        Field::new("pattern_type", DataType::Utf8, false),
        Field::new("direction", DataType::Utf8, false),
        Field::new("timeframe", DataType::Utf8, false),
        Field::new("anchor_timestamp", utc_micros(), false),
        Field::new("start_offset", DataType::UInt64, false),
        Field::new("end_offset", DataType::UInt64, false),
        Field::new("top", DataType::Float64, false),
        Field::new("bottom", DataType::Float64, false),
        Field::new("width", DataType::Float64, false),
        Field::new("is_filled", DataType::Boolean, false),
        Field::new("filled_at", utc_micros(), true),
        Field::new("session", DataType::Utf8, true),
        Field::new("part_of_day", DataType::Utf8, true),
        Field::new("distance_to_price", DataType::Float64, true),
    ]))
}

fn to_batch(table: &GapTable) -> Result<RecordBatch, StoreError> {
    let gaps = table.as_slice();
    let strings = |f: fn(&Gap) -> Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(gaps.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from_iter_values(gaps.iter().map(|g| g.id))),
        Arc::new(StringArray::from(vec![PATTERN_TYPE; gaps.len()])),
        Arc::new(StringArray::from_iter_values(gaps.iter().map(|g| g.direction.as_str()))),
        Arc::new(StringArray::from_iter_values(gaps.iter().map(|g| g.timeframe.as_str()))),
        Arc::new(
            TimestampMicrosecondArray::from_iter_values(
                gaps.iter().map(|g| g.anchor_timestamp.timestamp_micros()),
            )
            .with_timezone("UTC"),
        ),
        Arc::new(UInt64Array::from_iter_values(gaps.iter().map(|g| g.start_offset as u64))),
        Arc::new(UInt64Array::from_iter_values(gaps.iter().map(|g| g.end_offset as u64))),
        Arc::new(Float64Array::from_iter_values(gaps.iter().map(|g| g.top))),
        Arc::new(Float64Array::from_iter_values(gaps.iter().map(|g| g.bottom))),
        Arc::new(Float64Array::from_iter_values(gaps.iter().map(|g| g.width))),
        Arc::new(BooleanArray::from(gaps.iter().map(|g| g.is_filled).collect::<Vec<_>>())),
        Arc::new(
            TimestampMicrosecondArray::from(
                gaps.iter()
                    .map(|g| g.filled_at.map(|t| t.timestamp_micros()))
                    .collect::<Vec<_>>(),
            )
            .with_timezone("UTC"),
        ),
        strings(|g| g.session.clone()),
        strings(|g| g.part_of_day.clone()),
        Arc::new(Float64Array::from(
            gaps.iter().map(|g| g.distance_to_price).collect::<Vec<_>>(),
        )),
    ];

    RecordBatch::try_new(schema(), columns).context(ArrowSnafu)
}

/// Write `table` to `path`, creating parent directories as needed.
pub fn save(table: &GapTable, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(IoSnafu { path: parent })?;
    }

    let batch = to_batch(table)?;
    let file = File::create(path).context(IoSnafu { path })?;
    let mut writer = FileWriter::try_new(file, &batch.schema()).context(ArrowSnafu)?;
    writer.write(&batch).context(ArrowSnafu)?;
    writer.finish().context(ArrowSnafu)?;

    info!(path = %path.display(), gaps = table.len(), "saved pattern table");
    Ok(())
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| StoreError::Schema {
            message: format!("missing or mistyped column {name:?}"),
        })
}

fn timestamp(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| StoreError::Schema {
        message: format!("timestamp out of range: {micros}"),
    })
}

fn opt_string(col: &StringArray, i: usize) -> Option<String> {
    col.is_valid(i).then(|| col.value(i).to_string())
}

fn from_batch(batch: &RecordBatch, out: &mut Vec<Gap>) -> Result<(), StoreError> {
    let id = column::<UInt64Array>(batch, "id")?;
    let direction = column::<StringArray>(batch, "direction")?;
    let timeframe = column::<StringArray>(batch, "timeframe")?;
    let anchor = column::<TimestampMicrosecondArray>(batch, "anchor_timestamp")?;
    let start = column::<UInt64Array>(batch, "start_offset")?;
    let end = column::<UInt64Array>(batch, "end_offset")?;
    let top = column::<Float64Array>(batch, "top")?;
    let bottom = column::<Float64Array>(batch, "bottom")?;
    let width = column::<Float64Array>(batch, "width")?;
    let is_filled = column::<BooleanArray>(batch, "is_filled")?;
    let filled_at = column::<TimestampMicrosecondArray>(batch, "filled_at")?;
    let session = column::<StringArray>(batch, "session")?;
    let part_of_day = column::<StringArray>(batch, "part_of_day")?;
    let distance = column::<Float64Array>(batch, "distance_to_price")?;

    let offset = |v: u64| {
        usize::try_from(v).map_err(|_| StoreError::Schema {
            message: format!("offset out of range: {v}"),
        })
    };

    for i in 0..batch.num_rows() {
        let dir = direction.value(i);
        out.push(Gap {
            id: id.value(i),
            direction: Direction::parse(dir).ok_or_else(|| StoreError::Schema {
                message: format!("unknown direction {dir:?}"),
            })?,
            timeframe: timeframe.value(i).to_string(),
            anchor_timestamp: timestamp(anchor.value(i))?,
            start_offset: offset(start.value(i))?,
            end_offset: offset(end.value(i))?,
            top: top.value(i),
            bottom: bottom.value(i),
            width: width.value(i),
            is_filled: is_filled.value(i),
            filled_at: filled_at
                .is_valid(i)
                .then(|| timestamp(filled_at.value(i)))
                .transpose()?,
            session: opt_string(session, i),
            part_of_day: opt_string(part_of_day, i),
            distance_to_price: distance.is_valid(i).then(|| distance.value(i)),
        });
    }
    Ok(())
}

/// Read a table written by [`save`].
pub fn load(path: impl AsRef<Path>) -> Result<GapTable, StoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return NotFoundSnafu { path }.fail();
    }

    let file = File::open(path).context(IoSnafu { path })?;
    let reader = FileReader::try_new(file, None).context(ArrowSnafu)?;

    let mut gaps = Vec::new();
    for batch in reader {
        from_batch(&batch.context(ArrowSnafu)?, &mut gaps)?;
    }
    info!(path = %path.display(), gaps = gaps.len(), "loaded pattern table");
    Ok(GapTable::new(gaps))
}
