//! Raw columnar bar table handed over by the ingestion layer.
//!
//! A [`BarTable`] is untyped on purpose: it mirrors what a CSV or vendor
//! payload looks like after column renaming, before anything has been
//! checked. [`BarSeries::from_table`](crate::models::bar_series::BarSeries::from_table)
//! turns it into the typed series the rest of the pipeline works on.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The OHLCV columns every bar table must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// One non-price value attached to a bar (session label, calendar flag, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum MetaValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// A typed data column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of the column, `None` for bool/text columns.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float(v) => Some(v.clone()),
            Column::Int(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Column::Bool(_) | Column::Text(_) => None,
        }
    }

    /// Metadata view of the column, one [`MetaValue`] per row.
    pub fn to_meta(&self) -> Vec<MetaValue> {
        match self {
            Column::Float(v) => v.iter().map(|&x| MetaValue::Float(x)).collect(),
            Column::Int(v) => v.iter().map(|&x| MetaValue::Int(x)).collect(),
            Column::Bool(v) => v.iter().map(|&x| MetaValue::Bool(x)).collect(),
            Column::Text(v) => v
                .iter()
                .map(|x| x.clone().map(MetaValue::Text).unwrap_or_default())
                .collect(),
        }
    }
}

/// The row index of a bar table. Only `Timestamps` is a valid bar index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexColumn {
    Timestamps(Vec<DateTime<Utc>>),
    Integers(Vec<i64>),
    Text(Vec<String>),
}

impl IndexColumn {
    pub fn len(&self) -> usize {
        match self {
            IndexColumn::Timestamps(v) => v.len(),
            IndexColumn::Integers(v) => v.len(),
            IndexColumn::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            IndexColumn::Timestamps(_) => "timestamp",
            IndexColumn::Integers(_) => "integer",
            IndexColumn::Text(_) => "text",
        }
    }
}

/// Columnar bar table: an index plus named columns in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTable {
    pub index: IndexColumn,
    pub columns: IndexMap<String, Column>,
}

impl BarTable {
    pub fn new(index: IndexColumn) -> Self {
        Self {
            index,
            columns: IndexMap::new(),
        }
    }

    /// Builder-style column insert; a later column with the same name wins.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
