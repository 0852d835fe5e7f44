// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
// %K for the window of `fast` bars ending at (and including) bar i:
//   %K = (close_i - lowest_low) / (highest_high - lowest_low) * 100
// A window with no range reads 0.
//
// %D is the simple moving average of %K over `slow` points, computed with
// the same windowed mean the moving-average generator uses.
//
// Both series are date-stamped independently; the merge looks up the
// display window's first date in each and walks them in lockstep.
// =============================================================================

use crate::alignment::align_to_display;
use crate::error::{require_history, IndicatorError, Result};
use crate::indicators::moving_average::sma_of_points;
use crate::types::{IndicatorPoint, PriceBar, StochasticPoint};

pub const DEFAULT_FAST_LOOKBACK: usize = 14;
pub const DEFAULT_SLOW_LOOKBACK: usize = 3;

/// %K of the newest bar in `window`.  `None` for an empty window.
pub fn percent_k(window: &[PriceBar]) -> Option<f64> {
    let newest = window.last()?;
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    let range = highest - lowest;
    if range == 0.0 {
        return Some(0.0);
    }
    Some((newest.close - lowest) / range * 100.0)
}

/// %K for every bar from index `fast - 1` on.
pub fn fast_series(bars: &[PriceBar], fast: usize) -> Result<Vec<IndicatorPoint>> {
    if fast == 0 {
        return Err(IndicatorError::MalformedInput(
            "stochastic fast lookback must be positive".into(),
        ));
    }
    require_history(bars.len(), fast, 0)?;

    let points = (fast..=bars.len())
        .filter_map(|end| {
            let value = percent_k(&bars[end - fast..end])?;
            Some(IndicatorPoint {
                date: bars[end - 1].date,
                value,
            })
        })
        .collect();
    Ok(points)
}

/// %D: the `slow`-point SMA of a %K series.
pub fn slow_series(fast_points: &[IndicatorPoint], slow: usize) -> Result<Vec<IndicatorPoint>> {
    if slow == 0 {
        return Err(IndicatorError::MalformedInput(
            "stochastic slow lookback must be positive".into(),
        ));
    }
    require_history(fast_points.len(), slow, 0)?;
    Ok(sma_of_points(fast_points, slow))
}

/// Paired %K/%D over `extended`, aligned to the dates of `standard`.
pub fn calculate_stochastic(
    standard: &[PriceBar],
    extended: &[PriceBar],
    fast: usize,
    slow: usize,
) -> Result<Vec<StochasticPoint>> {
    let k = fast_series(extended, fast)?;
    let d = slow_series(&k, slow)?;

    let k_aligned = align_to_display(&k, standard)?;
    let d_aligned = align_to_display(&d, standard)?;

    let points = k_aligned
        .iter()
        .zip(d_aligned)
        .map(|(k, d)| StochasticPoint {
            date: k.date,
            fast_value: k.value,
            slow_value: d.value,
        })
        .collect();
    Ok(points)
}
