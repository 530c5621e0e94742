//! Multi-timeframe Fair Value Gap detection.
//!
//! Pipeline, leaves first:
//!
//! - [`resample`]: aggregate a native [`market_data::BarSeries`] into coarser
//!   right-closed, right-labeled buckets ([`bucket`] holds the boundary math).
//! - [`scanner`]: three-bar gap scan over one bar sequence.
//! - [`orchestrator`]: resample + scan per requested timeframe (optionally on
//!   the rayon pool), merge in request order, renumber ids from 1.
//! - [`enrich`]: session, part of day and distance to a reference price.
//! - [`store`]: Arrow IPC save/load of the resulting [`gap::GapTable`].
//!
//! [`sessions`] and [`features`] cover exchange session windows and calendar
//! annotations; [`tz`] has the local-time helpers both rely on.

pub mod bucket;
pub mod enrich;
pub mod errors;
pub mod features;
pub mod gap;
pub mod orchestrator;
pub mod resample;
pub mod scanner;
pub mod sessions;
pub mod store;
pub mod tz;

pub use enrich::enrich;
pub use errors::{Error, Result};
pub use features::annotate_calendar;
pub use gap::{Direction, Gap, GapTable};
pub use orchestrator::detect_for_timeframes;
pub use resample::{ResampleOptions, resample, resample_many};
pub use scanner::{ScanConfig, scan};
pub use sessions::{PartOfDay, SessionConfig};
pub use store::StoreError;
