// =============================================================================
// Date alignment between the display window and computed series
// =============================================================================
//
// Two lookup strategies exist and each call site uses exactly one:
//
//   position_exact        — first point whose date equals the target.
//                           Used by Bollinger, RSI, Stochastic and the
//                           moving-average row fill.
//   position_on_or_before — first point whose date is <= the target,
//                           scanning from index 0.  Used only by the
//                           date-range filter, whose series are newest-first.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{IndicatorError, Result};
use crate::types::{Dated, PriceBar};

/// Index of the first point dated exactly `target`.
pub fn position_exact<T: Dated>(series: &[T], target: NaiveDate) -> Option<usize> {
    series.iter().position(|p| p.date() == target)
}

/// Index of the first point dated on or before `target`, scanning from the
/// start and stopping at the first hit.
///
/// On a newest-first series this lands on `target` or the closest earlier
/// date.  On an oldest-first series it returns 0 whenever the oldest point
/// is not after `target`, which is not the nearest match.
pub fn position_on_or_before<T: Dated>(series: &[T], target: NaiveDate) -> Option<usize> {
    series.iter().position(|p| p.date() <= target)
}

/// Slice of `series` starting at the point dated like the display window's
/// first bar, at most `window.len()` long.
pub fn align_to_display<'a, T: Dated>(series: &'a [T], window: &[PriceBar]) -> Result<&'a [T]> {
    let first = window
        .first()
        .ok_or_else(|| IndicatorError::MalformedInput("display window is empty".into()))?
        .date;

    let start =
        position_exact(series, first).ok_or(IndicatorError::DateNotFound { date: first })?;
    let requested = window.len();
    let end = start.saturating_add(requested).min(series.len());

    if end - start < requested {
        debug!(
            first = %first,
            available = end - start,
            requested,
            "computed series ends before the display window"
        );
    }

    Ok(&series[start..end])
}

/// Reject bar arrays no lookback computation can use: empty, non-finite
/// prices, an inverted high/low range, a close outside that range, or dates
/// that are not strictly ascending.
pub fn validate_bars(bars: &[PriceBar], label: &str) -> Result<()> {
    if bars.is_empty() {
        return Err(IndicatorError::MalformedInput(format!("{label} bars are empty")));
    }

    if let Some(bad) = bars.iter().find(|b| {
        !(b.open.is_finite() && b.high.is_finite() && b.low.is_finite() && b.close.is_finite())
    }) {
        return Err(IndicatorError::MalformedInput(format!(
            "{label} bar on {} has a non-finite price",
            bad.date
        )));
    }

    if let Some(bad) = bars.iter().find(|b| b.high < b.low) {
        return Err(IndicatorError::MalformedInput(format!(
            "{label} bar on {} has high {} below low {}",
            bad.date, bad.high, bad.low
        )));
    }

    if let Some(bad) = bars.iter().find(|b| b.close < b.low || b.close > b.high) {
        return Err(IndicatorError::MalformedInput(format!(
            "{label} bar on {} closes at {} outside its range [{}, {}]",
            bad.date, bad.close, bad.low, bad.high
        )));
    }

    if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(IndicatorError::MalformedInput(format!(
            "{label} bars are not in ascending date order ({} then {})",
            w[0].date, w[1].date
        )));
    }

    Ok(())
}
