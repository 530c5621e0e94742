use market_data::{DataError, models::timeframe::TimeframeError};
use thiserror::Error;

use crate::store::StoreError;

/// The unified error type for the `fvg_engine` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The bar table broke the input contract (schema or index type).
    #[error(transparent)]
    Data(#[from] DataError),

    /// A requested timeframe label could not be resolved to a bucket rule.
    #[error("Unknown timeframe {label:?}")]
    Timeframe {
        label: String,
        #[source]
        source: TimeframeError,
    },

    /// Session configuration is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisting or loading a pattern table failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
