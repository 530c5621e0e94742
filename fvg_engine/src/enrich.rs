//! Post-scan enrichment of a merged gap table.
//!
//! Session and part-of-day are looked up on the base bars at each gap's
//! `anchor_timestamp` (left join; anchors with no base bar get `None`).
//! Distance is measured from a reference price, by default the last base
//! close:
//!
//! - bullish: `price - top` when `price >= top`, else `price - bottom`
//! - bearish: `bottom - price` when `price <= bottom`, else `top - price`
//!
//! Inside the zone the second branch can go negative; that sign is kept.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use market_data::BarSeries;
use tracing::{debug, warn};

use crate::{
    gap::{Direction, Gap, GapTable},
    sessions::{SessionConfig, part_of_day},
};

/// Signed distance between `price` and a gap zone.
pub fn distance_to_price(gap: &Gap, price: f64) -> f64 {
    match gap.direction {
        Direction::Bullish if price >= gap.top => price - gap.top,
        Direction::Bullish => price - gap.bottom,
        Direction::Bearish if price <= gap.bottom => gap.bottom - price,
        Direction::Bearish => gap.top - price,
    }
}

/// Fill `session`, `part_of_day` and `distance_to_price` on every gap.
///
/// An empty table or an empty base series comes back unchanged. Ids and
/// order are never touched.
pub fn enrich(
    table: GapTable,
    base: &BarSeries,
    sessions: &SessionConfig,
    reference_price: Option<f64>,
) -> GapTable {
    if table.is_empty() || base.is_empty() {
        return table;
    }

    let lookup: HashMap<DateTime<Utc>, (&str, &'static str)> = base
        .timestamps()
        .map(|ts| (ts, (sessions.session_for(ts), part_of_day(ts).as_str())))
        .collect();
    let price = reference_price.or_else(|| base.last_close());

    let mut unmatched = 0usize;
    let gaps = table
        .into_inner()
        .into_iter()
        .map(|mut gap| {
            match lookup.get(&gap.anchor_timestamp) {
                Some(&(session, part)) => {
                    gap.session = Some(session.to_string());
                    gap.part_of_day = Some(part.to_string());
                }
                None => {
                    unmatched += 1;
                    gap.session = None;
                    gap.part_of_day = None;
                }
            }
            gap.distance_to_price = price.map(|p| distance_to_price(&gap, p));
            gap
        })
        .collect();

    if unmatched > 0 {
        warn!(unmatched, "gap anchors without a base bar; session and part_of_day left empty");
    }
    debug!(reference_price = ?price, "enriched gap table");
    GapTable::new(gaps)
}
