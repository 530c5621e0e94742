//! Canonical bar model and the input contract of the gap engine.
//!
//! Raw tables arrive as [`models::table::BarTable`] (or JSON rows through
//! [`io::json`]) and are validated into a [`models::bar_series::BarSeries`].

pub mod errors;
pub mod io;
pub mod models;

pub use errors::DataError;
pub use models::{
    bar::Bar,
    bar_series::BarSeries,
    table::{BarTable, Column, IndexColumn, MetaValue},
    timeframe::{Timeframe, TimeframeUnit},
};
