#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use market_data::{Bar, BarSeries, Timeframe};

/// 2024-01-02 14:30Z (09:30 New York) plus `minutes`.
pub fn ts(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap() + Duration::minutes(minutes)
}

/// One-minute bars from highs/lows; open = low, close = midpoint.
pub fn hl_bars(highs: &[f64], lows: &[f64]) -> Vec<Bar> {
    highs
        .iter()
        .zip(lows)
        .enumerate()
        .map(|(i, (&h, &l))| Bar::new(ts(i as i64), l, h, l, (h + l) / 2.0, 10.0))
        .collect()
}

pub fn minute_series(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new("NQ", Timeframe::minute(), Tz::America__New_York, bars)
}

/// Bullish setup on bars 0..2, bearish setup on bars 3..5.
pub fn two_setups() -> Vec<Bar> {
    hl_bars(
        &[100.0, 103.0, 107.0, 205.0, 203.0, 194.0],
        &[99.0, 100.0, 106.0, 200.0, 199.0, 193.0],
    )
}

/// A steady 1m uptrend, long enough to produce gaps on coarser timeframes.
pub fn ramp(n: usize) -> BarSeries {
    let bars = (0..n)
        .map(|i| {
            let base = 100.0 + i as f64 * 1.5;
            Bar::new(ts(i as i64), base, base + 1.0, base - 0.5, base + 0.5, 10.0)
        })
        .collect();
    minute_series(bars)
}

/// Bars rendered the way `fvg-scan` reads them: a JSON array of row objects.
pub fn bars_json(bars: &[Bar]) -> String {
    serde_json::to_string(bars).unwrap()
}
