//! Timeframe utilities for expressing uniform bar intervals.
//!
//! A [`Timeframe`] pairs a non-zero amount with a [`TimeframeUnit`], covering
//! minute, hour, day, week (Monday-based), and month buckets in UTC.
//!
//! Labels follow the usual charting shorthand: `"1m"`, `"15min"`, `"1H"`,
//! `"4h"`, `"1D"`, `"1W"`, `"1M"`. A lowercase `m` (or `min`) is a minute, an
//! uppercase `M` is a calendar month.
//!
//! ```
//! use market_data::models::timeframe::{Timeframe, TimeframeUnit};
//!
//! let tf: Timeframe = "15min".parse().unwrap();
//! assert_eq!(tf.amount().get(), 15);
//! assert_eq!(tf.unit(), TimeframeUnit::Minute);
//! assert_eq!(tf.to_string(), "15m");
//! ```

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeframeError {
    #[error("Invalid amount in {label:?}: {message}")]
    InvalidAmount { label: String, message: String },

    #[error("Unknown unit {unit:?} in {label:?}")]
    UnknownUnit { label: String, unit: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

/// Timeframe granularity (calendar-aware where needed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeframeUnit {
    /// UTC minute
    Minute,
    /// UTC hour
    Hour,
    /// UTC day
    Day,
    /// Monday-based, UTC
    Week,
    /// calendar months, UTC
    Month,
}

/// A timeframe = amount × unit (e.g., 5-Minute, 3-Hour, 2-Week, 6-Month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    amount: NonZeroU32,
    unit: TimeframeUnit,
}

pub const ONE: NonZeroU32 = match NonZeroU32::new(1) {
    Some(nz) => nz,
    None => unreachable!(),
};

impl Timeframe {
    pub const fn new(amount: NonZeroU32, unit: TimeframeUnit) -> Self {
        Self { amount, unit }
    }

    /// One-minute bars, the usual native granularity.
    pub const fn minute() -> Self {
        Self::new(ONE, TimeframeUnit::Minute)
    }

    /// Convenience constructor for call sites with literal amounts.
    pub fn try_new(amount: u32, unit: TimeframeUnit) -> Result<Self, TimeframeError> {
        let amount = NonZeroU32::new(amount).ok_or_else(|| TimeframeError::InvalidAmount {
            label: format!("{amount}{unit:?}"),
            message: "amount must be > 0".into(),
        })?;
        Ok(Self::new(amount, unit))
    }

    pub const fn amount(&self) -> NonZeroU32 {
        self.amount
    }

    pub const fn unit(&self) -> TimeframeUnit {
        self.unit
    }

    /// Fixed width in seconds, or `None` for calendar months.
    pub const fn fixed_secs(&self) -> Option<i64> {
        let unit_secs = match self.unit {
            TimeframeUnit::Minute => 60,
            TimeframeUnit::Hour => 3_600,
            TimeframeUnit::Day => 86_400,
            TimeframeUnit::Week => 604_800,
            TimeframeUnit::Month => return None,
        };
        Some(unit_secs * self.amount.get() as i64)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.amount.get();
        let u = match self.unit {
            TimeframeUnit::Minute => "m",
            TimeframeUnit::Hour => "h",
            TimeframeUnit::Day => "D",
            TimeframeUnit::Week => "W",
            TimeframeUnit::Month => "M",
        };
        write!(f, "{a}{u}")
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.is_empty() {
            return Err(TimeframeError::InvalidInput {
                message: "empty timeframe".into(),
            });
        }

        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(label.len());
        let (digits, unit) = label.split_at(split);

        // "H" alone means one hour, pandas-style.
        let amount_num: u32 = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| TimeframeError::InvalidAmount {
                label: label.to_string(),
                message: format!("cannot parse {digits:?}"),
            })?
        };
        let amount = NonZeroU32::new(amount_num).ok_or_else(|| TimeframeError::InvalidAmount {
            label: label.to_string(),
            message: "amount must be > 0".into(),
        })?;

        let unit = match unit {
            "m" | "min" | "T" => TimeframeUnit::Minute,
            "h" | "H" => TimeframeUnit::Hour,
            "d" | "D" => TimeframeUnit::Day,
            "w" | "W" => TimeframeUnit::Week,
            "M" | "MS" => TimeframeUnit::Month,
            other => {
                return Err(TimeframeError::UnknownUnit {
                    label: label.to_string(),
                    unit: other.to_string(),
                });
            }
        };
        Ok(Timeframe::new(amount, unit))
    }
}
