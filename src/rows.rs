//! Assigns overlapping bars to display rows.

use crate::types::interval::LabeledBar;
use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// How a bar's row is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// The lowest row with no overlapping bar. Bars sharing a row never overlap.
    #[default]
    FirstFit,
    /// The number of earlier bars the bar overlaps. Cheaper to reason about, but two
    /// overlapping bars can end up on the same row.
    OverlapCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBar {
    #[serde(flatten)]
    pub bar: LabeledBar,
    pub row: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowAssignment {
    pub bars: Vec<PlacedBar>,
    /// Highest assigned row plus one; zero without bars.
    pub rows_required: usize,
}

/// Number of bars in `bars` that strictly overlap `bar`.
pub fn count_overlapping_bars(bar: &LabeledBar, bars: &[LabeledBar]) -> usize {
    bars.iter()
        .filter(|other| bar.interval.overlaps(&other.interval))
        .count()
}

/// Number of bars strictly active at `time`.
pub fn count_bars_at_time(bars: &[LabeledBar], time: DateTime<Utc>) -> usize {
    bars.iter()
        .filter(|bar| bar.interval.is_active_at(time))
        .count()
}

/// The most bars active at once, sampled every hour from half an hour after the
/// earliest start up to the latest end.
///
/// Sampling between the hours keeps hour-aligned bars from being seen only at their
/// endpoints. It is still an approximation: a bar or burst of overlap that falls wholly
/// between two samples is not seen. Bars that merely touch are never counted together.
/// Returns 0 for no bars.
pub fn count_max_bars_at_time(bars: &[LabeledBar]) -> usize {
    let (Some(first), Some(last)) = (
        bars.iter().map(LabeledBar::start).min(),
        bars.iter().map(LabeledBar::end).max(),
    ) else {
        return 0;
    };

    let mut max = 0;
    let mut time = first + TimeDelta::minutes(30);
    while time < last {
        max = max.max(count_bars_at_time(bars, time));
        time += TimeDelta::hours(1);
    }
    max
}

/// Places `bars` onto rows in input order.
///
/// With a `max_rows` cap, bars whose row would be at or beyond the cap are dropped.
pub fn assign_rows(bars: Vec<LabeledBar>, max_rows: Option<usize>, policy: RowPolicy) -> RowAssignment {
    let mut placed: Vec<PlacedBar> = Vec::with_capacity(bars.len());

    for bar in bars {
        let row = match policy {
            RowPolicy::FirstFit => first_free_row(&bar, &placed),
            RowPolicy::OverlapCount => placed
                .iter()
                .filter(|p| p.bar.interval.overlaps(&bar.interval))
                .count(),
        };
        if max_rows.is_some_and(|cap| row >= cap) {
            debug!("Dropping bar {:?} that would need row {}", bar.text, row);
            continue;
        }
        placed.push(PlacedBar { bar, row });
    }

    let rows_required = placed.iter().map(|p| p.row + 1).max().unwrap_or(0);
    RowAssignment {
        bars: placed,
        rows_required,
    }
}

fn first_free_row(bar: &LabeledBar, placed: &[PlacedBar]) -> usize {
    (0..)
        .find(|&row| {
            !placed
                .iter()
                .any(|p| p.row == row && p.bar.interval.overlaps(&bar.interval))
        })
        .unwrap_or(placed.len())
}
