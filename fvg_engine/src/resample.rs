//! Resample OHLCV bars across timeframes.
//!
//! Buckets are right-closed and labeled at their right edge (see
//! [`crate::bucket`]). Each non-empty bucket aggregates to
//! `open`=first, `high`=max, `low`=min, `close`=last, `volume`=sum; empty
//! buckets produce no bar at all. Metadata columns are sampled from the last
//! source bar of each bucket, i.e. the last known value at the bucket label.

use indexmap::IndexMap;
use market_data::{Bar, BarSeries, MetaValue, Timeframe};
use tracing::debug;

use crate::bucket::bucket_end_utc;

/// Knobs for [`resample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleOptions {
    /// Carry non-price columns onto the resampled bars.
    pub include_metadata: bool,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            include_metadata: true,
        }
    }
}

/// Resample `series` to `tf`.
///
/// Requesting the series' own timeframe returns a copy with the same bars
/// (metadata dropped when `include_metadata` is off). Input must be strictly
/// ascending; [`BarSeries::from_table`] guarantees that.
pub fn resample(series: &BarSeries, tf: Timeframe, opts: ResampleOptions) -> BarSeries {
    if tf == series.timeframe {
        let mut out = series.clone();
        if !opts.include_metadata {
            out.metadata.clear();
        }
        return out;
    }

    let mut bars: Vec<Bar> = Vec::new();
    // index of the last source bar folded into each output bar
    let mut last_source: Vec<usize> = Vec::new();

    for (i, bar) in series.bars.iter().enumerate() {
        let label = bucket_end_utc(bar.timestamp, tf);
        match bars.last_mut() {
            Some(acc) if acc.timestamp == label => {
                acc.high = acc.high.max(bar.high);
                acc.low = acc.low.min(bar.low);
                acc.close = bar.close;
                acc.volume += bar.volume;
                if let Some(last) = last_source.last_mut() {
                    *last = i;
                }
            }
            _ => {
                bars.push(Bar {
                    timestamp: label,
                    ..*bar
                });
                last_source.push(i);
            }
        }
    }

    let metadata: IndexMap<String, Vec<MetaValue>> = if opts.include_metadata {
        series
            .metadata
            .iter()
            .map(|(name, values)| {
                // hand-built columns may be short; missing rows read as Null
                let sampled = last_source
                    .iter()
                    .map(|&i| values.get(i).cloned().unwrap_or_default())
                    .collect();
                (name.clone(), sampled)
            })
            .collect()
    } else {
        IndexMap::new()
    };

    debug!(
        symbol = %series.symbol,
        from = %series.timeframe,
        to = %tf,
        bars_in = series.len(),
        bars_out = bars.len(),
        "resampled series"
    );

    BarSeries {
        symbol: series.symbol.clone(),
        timeframe: tf,
        tz: series.tz,
        bars,
        metadata,
    }
}

/// Resample into several timeframes at once, keyed by canonical label.
pub fn resample_many(
    series: &BarSeries,
    timeframes: &[Timeframe],
    opts: ResampleOptions,
) -> IndexMap<String, BarSeries> {
    timeframes
        .iter()
        .map(|&tf| (tf.to_string(), resample(series, tf, opts)))
        .collect()
}
