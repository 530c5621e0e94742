use thiserror::Error;

/// The unified error type for the `market_data` crate.
///
/// Both variants describe an input table that breaks the bar contract. They
/// fail the whole conversion; no partially validated series is ever returned.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    /// Required OHLCV columns are missing, non-numeric, or ragged.
    #[error("Schema error: {message} (missing: {missing:?})")]
    Schema {
        missing: Vec<String>,
        message: String,
    },

    /// The index is not a strictly ascending, unique timestamp sequence.
    #[error("Index type error: {0}")]
    IndexType(String),
}

impl DataError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            missing: Vec::new(),
            message: message.into(),
        }
    }
}
