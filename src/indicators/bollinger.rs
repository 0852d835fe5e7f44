// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ).  σ is the population standard deviation of
// the window: sqrt(mean of squared deviations), divisor = window size.
//
// Bands are computed over the extended history, then the stretch matching
// the display window is selected by the exact date of the display window's
// first bar and walked one-for-one with the display bars.  Each emitted
// point carries the display bar's own close as `current_price`, since the
// display series may have been re-adjusted independently of the extended
// one.
// =============================================================================

use tracing::debug;

use crate::alignment::align_to_display;
use crate::error::{require_history, IndicatorError, Result};
use crate::indicators::moving_average::sma_at;
use crate::types::{BollingerPoint, IndicatorPoint, PriceBar};

pub const DEFAULT_LOOKBACK: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Mean and population standard deviation of a window of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Mean and population σ of `window`.  `None` for an empty window.
pub fn window_stats(window: &[IndicatorPoint]) -> Option<WindowStats> {
    if window.is_empty() {
        return None;
    }
    let n = window.len() as f64;
    let mean = window.iter().map(|p| p.value).sum::<f64>() / n;
    let variance = window.iter().map(|p| (p.value - mean).powi(2)).sum::<f64>() / n;
    Some(WindowStats {
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Bands for every computable window of `bars`, oldest first.
///
/// The point for `end` covers bars `[end - lookback, end)` and is stamped
/// with bar `end - 1`.  Needs at least `lookback + 1` bars.
pub fn calculate_bands(
    bars: &[PriceBar],
    lookback: usize,
    multiplier: f64,
) -> Result<Vec<BollingerPoint>> {
    if lookback == 0 {
        return Err(IndicatorError::MalformedInput(
            "bollinger lookback must be positive".into(),
        ));
    }
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(IndicatorError::MalformedInput(format!(
            "bollinger multiplier must be a non-negative number, got {multiplier}"
        )));
    }
    require_history(bars.len(), lookback, 1)?;

    let closes: Vec<IndicatorPoint> = bars
        .iter()
        .map(|b| IndicatorPoint {
            date: b.date,
            value: b.close,
        })
        .collect();

    let mut bands = Vec::with_capacity(bars.len() - lookback + 1);
    for end in lookback..=bars.len() {
        let Some(stats) = window_stats(&closes[end - lookback..end]) else {
            continue;
        };
        let moving_average = sma_at(bars, end, lookback).unwrap_or(stats.mean);
        let newest = &bars[end - 1];

        bands.push(BollingerPoint {
            date: newest.date,
            lower_band_value: stats.mean - multiplier * stats.std_dev,
            upper_band_value: stats.mean + multiplier * stats.std_dev,
            current_price: newest.close,
            moving_average,
            standard_deviation: stats.std_dev,
            mean: stats.mean,
        });
    }

    Ok(bands)
}

/// Bands over `extended`, aligned to the dates of `standard`.
///
/// Fails with `DateNotFound` when the first standard date has no band
/// (typically because it precedes the first fully-backed window).
pub fn calculate_bollinger(
    standard: &[PriceBar],
    extended: &[PriceBar],
    lookback: usize,
    multiplier: f64,
) -> Result<Vec<BollingerPoint>> {
    let bands = calculate_bands(extended, lookback, multiplier)?;
    let aligned = align_to_display(&bands, standard)?;

    let points = aligned
        .iter()
        .zip(standard)
        .map(|(band, bar)| {
            if band.date != bar.date {
                debug!(
                    band_date = %band.date,
                    bar_date = %bar.date,
                    "bollinger band and display bar dates diverge"
                );
            }
            BollingerPoint {
                date: bar.date,
                current_price: bar.close,
                ..*band
            }
        })
        .collect();

    Ok(points)
}
