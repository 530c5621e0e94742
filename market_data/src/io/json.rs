//! JSON row records → [`BarTable`].
//!
//! Accepts the shape most exporters produce: an array of flat objects, one
//! per bar, with a timestamp field and arbitrary other fields. Column types
//! are inferred per column; nothing is validated against the bar contract
//! here, that is [`BarSeries::from_table`](crate::models::bar_series::BarSeries::from_table)'s job.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    errors::DataError,
    models::table::{BarTable, Column, IndexColumn},
};

/// Default name of the timestamp field.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Build a table from a JSON array of row objects.
///
/// The `time_field` values become the index: RFC-3339 strings give a
/// timestamp index, integers give an integer index, anything else a text
/// index (the latter two are rejected later as index type errors).
pub fn table_from_records(records: &[Value], time_field: &str) -> Result<BarTable, DataError> {
    let mut raw: IndexMap<String, Vec<Value>> = IndexMap::new();
    let mut index_values = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| DataError::schema(format!("row {row} is not a JSON object")))?;
        let ts = obj.get(time_field).ok_or_else(|| {
            DataError::IndexType(format!("row {row} has no {time_field:?} field"))
        })?;
        index_values.push(ts.clone());

        for (key, value) in obj {
            if key == time_field {
                continue;
            }
            let column = raw.entry(key.clone()).or_default();
            // back-fill rows where this key was absent
            column.resize(row, Value::Null);
            column.push(value.clone());
        }
    }

    let mut table = BarTable::new(infer_index(&index_values));
    for (name, mut values) in raw {
        values.resize(records.len(), Value::Null);
        table.columns.insert(name, infer_column(&values));
    }
    Ok(table)
}

/// Parse a JSON document (an array of row objects) into a table.
pub fn table_from_str(text: &str, time_field: &str) -> Result<BarTable, DataError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| DataError::schema(format!("invalid JSON bar table: {e}")))?;
    match doc {
        Value::Array(rows) => table_from_records(&rows, time_field),
        _ => Err(DataError::schema("bar table must be a JSON array of objects")),
    }
}

fn infer_index(values: &[Value]) -> IndexColumn {
    let parsed: Option<Vec<DateTime<Utc>>> = values
        .iter()
        .map(|v| {
            v.as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
        })
        .collect();
    if let Some(ts) = parsed {
        return IndexColumn::Timestamps(ts);
    }

    let ints: Option<Vec<i64>> = values.iter().map(Value::as_i64).collect();
    if let Some(ints) = ints {
        return IndexColumn::Integers(ints);
    }

    IndexColumn::Text(values.iter().map(render).collect())
}

fn infer_column(values: &[Value]) -> Column {
    let non_null = || values.iter().filter(|v| !v.is_null());
    let has_null = values.iter().any(Value::is_null);

    // Bool has no null slot; sparse flags fall through to Text
    if !has_null && !values.is_empty() && values.iter().all(Value::is_boolean) {
        return Column::Bool(values.iter().filter_map(Value::as_bool).collect());
    }
    if non_null().all(Value::is_number) && non_null().next().is_some() {
        if !has_null && values.iter().all(|v| v.as_i64().is_some()) {
            return Column::Int(values.iter().filter_map(Value::as_i64).collect());
        }
        return Column::Float(
            values
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect(),
        );
    }

    Column::Text(
        values
            .iter()
            .map(|v| (!v.is_null()).then(|| render(v)))
            .collect(),
    )
}

fn render(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
