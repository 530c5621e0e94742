//! Session configuration: parsing, normalization, and classification.
//!
//! A session file lists named local time-of-day windows for one exchange:
//!
//! ```toml
//! timezone = "America/New_York"
//! fallback = "ETH"
//!
//! [[windows]]
//! label = "RTH"
//! start = "09:30"
//! end   = "16:00"
//! ```
//!
//! Key behaviors:
//! - Windows are matched in file order; the first one containing the bar's
//!   local time wins, otherwise the bar gets `fallback`.
//! - A window is half-open, `start <= t < end`. When `start > end` it wraps
//!   past midnight (`t >= start || t < end`). `start == end` never matches.
//! - Normalization trims labels and rejects empty or duplicate labels, bad
//!   times and unknown time zones.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_sessions_str`]
//! - Parse + normalize from a file path: [`load_sessions_path`]

use std::{collections::HashSet, fmt};

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    tz::{local_time_of_day, parse_time_of_day, parse_tz},
};

/// Raw TOML shape of a session file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfigFile {
    /// IANA time zone the windows are written in.
    pub timezone: String,
    /// Label for bars outside every window.
    pub fallback: String,
    /// Ordered windows; first match wins.
    #[serde(default)]
    pub windows: Vec<SessionWindowCfg>,
}

/// One raw window entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionWindowCfg {
    pub label: String,
    /// `"HH:MM"` or `"HH:MM:SS"`, local time.
    pub start: String,
    /// `"HH:MM"` or `"HH:MM:SS"`, local time, exclusive.
    pub end: String,
}

/// A normalized session window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindow {
    pub label: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    /// Whether local time `t` falls inside the window.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

/// Normalized session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub tz: Tz,
    pub windows: Vec<SessionWindow>,
    pub fallback: String,
}

impl Default for SessionConfig {
    /// US equity index futures: regular hours 09:30–16:00 New York, else ETH.
    fn default() -> Self {
        Self {
            tz: Tz::America__New_York,
            windows: vec![SessionWindow {
                label: "RTH".into(),
                start: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
                end: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            }],
            fallback: "ETH".into(),
        }
    }
}

impl SessionConfig {
    /// The same windows read on another exchange clock.
    pub fn with_tz(self, tz: Tz) -> Self {
        Self { tz, ..self }
    }

    /// Session label of a UTC instant.
    pub fn session_for(&self, ts_utc: DateTime<Utc>) -> &str {
        let local = local_time_of_day(ts_utc, self.tz);
        self.windows
            .iter()
            .find(|w| w.contains(local))
            .map(|w| w.label.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

/// Coarse bucket of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfDay {
    /// 06:00–12:00 UTC
    Morning,
    /// 12:00–18:00 UTC
    Noon,
    /// everything else
    Evening,
}

impl PartOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfDay::Morning => "morning",
            PartOfDay::Noon => "noon",
            PartOfDay::Evening => "evening",
        }
    }
}

impl fmt::Display for PartOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Part of day from the UTC hour.
pub fn part_of_day(ts_utc: DateTime<Utc>) -> PartOfDay {
    match ts_utc.hour() {
        6..=11 => PartOfDay::Morning,
        12..=17 => PartOfDay::Noon,
        _ => PartOfDay::Evening,
    }
}

/// Validate a raw file into a [`SessionConfig`].
pub fn normalize_sessions(file: SessionConfigFile) -> Result<SessionConfig> {
    let tz = parse_tz(&file.timezone)?;

    let fallback = file.fallback.trim().to_string();
    if fallback.is_empty() {
        return Err(Error::Config("fallback label cannot be empty".into()));
    }

    let mut seen = HashSet::new();
    let mut windows = Vec::with_capacity(file.windows.len());
    for w in file.windows {
        let label = w.label.trim().to_string();
        if label.is_empty() {
            return Err(Error::Config("session label cannot be empty after trimming".into()));
        }
        if !seen.insert(label.clone()) {
            return Err(Error::Config(format!("duplicate session label: {label}")));
        }
        windows.push(SessionWindow {
            start: parse_time_of_day(&w.start)?,
            end: parse_time_of_day(&w.end)?,
            label,
        });
    }

    Ok(SessionConfig {
        tz,
        windows,
        fallback,
    })
}

/// Parse and normalize a session config from a TOML string.
pub fn load_sessions_str(toml_str: &str) -> Result<SessionConfig> {
    let file: SessionConfigFile = toml::from_str(toml_str)
        .map_err(|e| Error::Config(format!("failed to parse session TOML: {e}")))?;
    normalize_sessions(file)
}

/// Read a session TOML file from disk, parse, and normalize it.
pub fn load_sessions_path(path: impl AsRef<std::path::Path>) -> Result<SessionConfig> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        Error::Config(format!("read session file {}: {e}", path.as_ref().display()))
    })?;
    load_sessions_str(&text)
}

/// Sessions for a series on `tz`: the file at `path` when given, otherwise
/// the default RTH/ETH windows read on `tz`.
pub fn resolve_sessions(path: Option<&std::path::Path>, tz: Tz) -> Result<SessionConfig> {
    match path {
        Some(path) => load_sessions_path(path),
        None => Ok(SessionConfig::default().with_tz(tz)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    const ASIA_LONDON_NY: &str = r#"
        timezone = "UTC"
        fallback = "off"

        [[windows]]
        label = "asia"
        start = "23:00"
        end   = "07:00"

        [[windows]]
        label = "london"
        start = "07:00"
        end   = "13:30"

        [[windows]]
        label = "overlap"
        start = "12:00"
        end   = "16:00"
    "#;

    #[test]
    fn default_is_new_york_rth() {
        let cfg = SessionConfig::default();
        // 14:30Z == 09:30 EST
        assert_eq!(cfg.session_for(utc(14, 30)), "RTH");
        assert_eq!(cfg.session_for(utc(14, 29)), "ETH");
        // 21:00Z == 16:00 EST, end is exclusive
        assert_eq!(cfg.session_for(utc(21, 0)), "ETH");
    }

    #[test]
    fn with_tz_moves_the_windows() {
        let tokyo = SessionConfig::default().with_tz(Tz::Asia__Tokyo);
        // 00:30Z is 09:30 in Tokyo, 19:30 the day before in New York
        assert_eq!(tokyo.session_for(utc(0, 30)), "RTH");
        assert_eq!(SessionConfig::default().session_for(utc(0, 30)), "ETH");
        assert_eq!(tokyo.windows, SessionConfig::default().windows);
    }

    #[test]
    fn windows_wrap_past_midnight() {
        let cfg = load_sessions_str(ASIA_LONDON_NY).unwrap();
        assert_eq!(cfg.session_for(utc(23, 30)), "asia");
        assert_eq!(cfg.session_for(utc(2, 0)), "asia");
        assert_eq!(cfg.session_for(utc(7, 0)), "london");
    }

    #[test]
    fn first_matching_window_wins() {
        let cfg = load_sessions_str(ASIA_LONDON_NY).unwrap();
        // 12:30 is inside both london and overlap
        assert_eq!(cfg.session_for(utc(12, 30)), "london");
        assert_eq!(cfg.session_for(utc(14, 0)), "overlap");
        assert_eq!(cfg.session_for(utc(18, 0)), "off");
    }

    #[test]
    fn empty_window_never_matches() {
        let w = SessionWindow {
            label: "x".into(),
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        };
        assert!(!w.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
    }

    #[test]
    fn part_of_day_schedule() {
        assert_eq!(part_of_day(utc(5, 59)), PartOfDay::Evening);
        assert_eq!(part_of_day(utc(6, 0)), PartOfDay::Morning);
        assert_eq!(part_of_day(utc(12, 0)), PartOfDay::Noon);
        assert_eq!(part_of_day(utc(17, 59)), PartOfDay::Noon);
        assert_eq!(part_of_day(utc(18, 0)), PartOfDay::Evening);
        assert_eq!(PartOfDay::Noon.to_string(), "noon");
    }

    #[test]
    fn normalization_errors() {
        let dup = r#"
            timezone = "UTC"
            fallback = "off"
            [[windows]]
            label = "a"
            start = "01:00"
            end = "02:00"
            [[windows]]
            label = " a "
            start = "03:00"
            end = "04:00"
        "#;
        let err = load_sessions_str(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate session label"));

        let bad_tz = "timezone = \"Nowhere/Else\"\nfallback = \"x\"\n";
        assert!(matches!(load_sessions_str(bad_tz), Err(Error::Config(_))));

        let unknown_field = "timezone = \"UTC\"\nfallback = \"x\"\ncolour = \"red\"\n";
        assert!(load_sessions_str(unknown_field).is_err());
    }
}
