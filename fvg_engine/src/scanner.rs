//! Single-timeframe Fair Value Gap scan.
//!
//! The test is a sliding comparison over index pairs `(i-2, i)`; the middle
//! bar never takes part. For every `i >= 2`:
//!
//! - bullish when `low[i] > high[i-2]`, zone `(high[i-2], low[i])`
//! - bearish when `high[i] < low[i-2]`, zone `(high[i], low[i-2])`
//!
//! Candidates narrower than `min_width` are discarded. Ids start at 1 and
//! follow confirmation order (ascending `i`, bullish before bearish).

use market_data::{Bar, BarSeries};

use crate::gap::{Direction, Gap};

/// Knobs shared by the scanner and the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Inclusive lower bound on `top - bottom`.
    pub min_width: f64,
    /// Scan timeframes on the rayon pool.
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_width: 0.0,
            parallel: true,
        }
    }
}

/// Scan `bars` and tag every gap with `timeframe`.
///
/// Fewer than three bars (including none) yields an empty list.
pub fn scan(bars: &[Bar], timeframe: &str, min_width: f64) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut next_id: u64 = 1;

    for i in 2..bars.len() {
        let (first, last) = (&bars[i - 2], &bars[i]);

        let bullish = (last.low > first.high).then_some((Direction::Bullish, first.high, last.low));
        let bearish = (last.high < first.low).then_some((Direction::Bearish, last.high, first.low));

        for (direction, bottom, top) in [bullish, bearish].into_iter().flatten() {
            let width = top - bottom;
            if width < min_width {
                continue;
            }
            gaps.push(Gap {
                id: next_id,
                direction,
                timeframe: timeframe.to_string(),
                anchor_timestamp: last.timestamp,
                start_offset: i - 2,
                end_offset: i,
                top,
                bottom,
                width,
                is_filled: false,
                filled_at: None,
                session: None,
                part_of_day: None,
                distance_to_price: None,
            });
            next_id += 1;
        }
    }

    gaps
}

/// [`scan`] over a whole series.
pub fn scan_series(series: &BarSeries, timeframe: &str, min_width: f64) -> Vec<Gap> {
    scan(&series.bars, timeframe, min_width)
}
