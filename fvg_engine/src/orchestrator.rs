//! Multi-timeframe gap detection.
//!
//! Every requested label is resolved to a [`Timeframe`], the base series is
//! resampled (or passed through for the native timeframe), scanned, and the
//! per-timeframe lists are concatenated in request order. Ids are then
//! reassigned from 1 over the concatenation, so the result depends only on
//! the input and the label order, never on which timeframe finished first.

use market_data::{BarSeries, Timeframe};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    errors::{Error, Result},
    gap::{Gap, GapTable},
    resample::{ResampleOptions, resample},
    scanner::{ScanConfig, scan_series},
};

/// Resolve caller labels to timeframes, failing on the first unknown label.
pub fn resolve_timeframes<S: AsRef<str>>(labels: &[S]) -> Result<Vec<(String, Timeframe)>> {
    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            let tf = label.parse::<Timeframe>().map_err(|source| Error::Timeframe {
                label: label.to_string(),
                source,
            })?;
            Ok((label.to_string(), tf))
        })
        .collect()
}

fn detect_one(base: &BarSeries, label: &str, tf: Timeframe, min_width: f64) -> Vec<Gap> {
    let gaps = if tf == base.timeframe {
        scan_series(base, label, min_width)
    } else {
        let opts = ResampleOptions {
            include_metadata: false,
        };
        scan_series(&resample(base, tf, opts), label, min_width)
    };
    debug!(timeframe = label, gaps = gaps.len(), "scanned timeframe");
    gaps
}

/// Detect gaps on every timeframe in `labels` and merge them into one table.
///
/// Errors only when a label cannot be parsed; an empty base series yields an
/// empty table.
pub fn detect_for_timeframes<S: AsRef<str>>(
    base: &BarSeries,
    labels: &[S],
    cfg: &ScanConfig,
) -> Result<GapTable> {
    let resolved = resolve_timeframes(labels)?;

    // collect() on an indexed parallel iterator keeps input order
    let per_timeframe: Vec<Vec<Gap>> = if cfg.parallel {
        resolved
            .par_iter()
            .map(|(label, tf)| detect_one(base, label, *tf, cfg.min_width))
            .collect()
    } else {
        resolved
            .iter()
            .map(|(label, tf)| detect_one(base, label, *tf, cfg.min_width))
            .collect()
    };

    let merged = renumber(per_timeframe);
    info!(
        symbol = %base.symbol,
        timeframes = resolved.len(),
        gaps = merged.len(),
        "multi-timeframe scan complete"
    );
    Ok(GapTable::new(merged))
}

/// Concatenate in the given order and reassign ids from 1.
fn renumber(per_timeframe: Vec<Vec<Gap>>) -> Vec<Gap> {
    per_timeframe
        .into_iter()
        .flatten()
        .zip(1u64..)
        .map(|(mut gap, id)| {
            gap.id = id;
            gap
        })
        .collect()
}
