//! Fair Value Gap records and the merged pattern table.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pattern type tag written alongside every gap.
pub const PATTERN_TYPE: &str = "FVG";

/// Side of the market the gap points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `low[i] > high[i-2]`: price left an unfilled zone below.
    Bullish,
    /// `high[i] < low[i-2]`: price left an unfilled zone above.
    Bearish,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bullish => "bullish",
            Direction::Bearish => "bearish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bullish" | "bull" => Some(Direction::Bullish),
            "bearish" | "bear" => Some(Direction::Bearish),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One detected gap.
///
/// Everything up to `width` is fixed by the scan. `is_filled`/`filled_at` are
/// reserved and stay at their defaults; the last three fields are written once
/// by [`crate::enrich::enrich`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub id: u64,
    pub direction: Direction,
    pub timeframe: String,
    pub anchor_timestamp: DateTime<Utc>,
    pub start_offset: usize,
    pub end_offset: usize,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
    pub is_filled: bool,
    pub filled_at: Option<DateTime<Utc>>,
    pub session: Option<String>,
    pub part_of_day: Option<String>,
    pub distance_to_price: Option<f64>,
}

impl Gap {
    pub fn pattern_type(&self) -> &'static str {
        PATTERN_TYPE
    }

    /// `(bottom, top)`
    pub fn price_range(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }
}

/// All gaps of one run, ordered by ascending `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapTable {
    gaps: Vec<Gap>,
}

impl GapTable {
    /// Wrap gaps, sorting them by id.
    pub fn new(mut gaps: Vec<Gap>) -> Self {
        gaps.sort_by_key(|g| g.id);
        Self { gaps }
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gap> {
        self.gaps.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Gap> {
        self.gaps
            .binary_search_by_key(&id, |g| g.id)
            .ok()
            .map(|i| &self.gaps[i])
    }

    pub fn as_slice(&self) -> &[Gap] {
        &self.gaps
    }

    pub fn into_inner(self) -> Vec<Gap> {
        self.gaps
    }
}

impl<'a> IntoIterator for &'a GapTable {
    type Item = &'a Gap;
    type IntoIter = std::slice::Iter<'a, Gap>;

    fn into_iter(self) -> Self::IntoIter {
        self.gaps.iter()
    }
}

impl fmt::Display for GapTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = format!(
            "{:>5}  {:<7}  {:<5}  {:<20}  {:>6}  {:>12}  {:>12}  {:>10}  {:<8}  {:<8}  {:>10}",
            "id", "dir", "tf", "anchor", "offs", "bottom", "top", "width", "session", "part", "dist"
        );
        writeln!(f, "{header}")?;
        for _ in 0..header.len() {
            write!(f, "-")?;
        }
        writeln!(f)?;

        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        for g in &self.gaps {
            let dist = g
                .distance_to_price
                .map(|d| format!("{d:.4}"))
                .unwrap_or_else(|| "-".into());
            writeln!(
                f,
                "{:>5}  {:<7}  {:<5}  {:<20}  {:>6}  {:>12.4}  {:>12.4}  {:>10.4}  {:<8}  {:<8}  {:>10}",
                g.id,
                g.direction,
                g.timeframe,
                g.anchor_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{}-{}", g.start_offset, g.end_offset),
                g.bottom,
                g.top,
                g.width,
                opt(&g.session),
                opt(&g.part_of_day),
                dist,
            )?;
        }
        write!(f, "{} gap(s)", self.gaps.len())
    }
}
