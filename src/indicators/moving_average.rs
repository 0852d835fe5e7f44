// =============================================================================
// Moving Average Generator — SMA and EMA
// =============================================================================
//
// Windows are half-open over bar indices: the value for `end` covers bars
// `[end - lookback, end)` and is stamped with the date of bar `end - 1`, the
// newest bar in the window.  So for closes [10, 20, 30, 40, 50] and a
// lookback of 3 the 4th bar carries (20+30+40)/3 = 30.
//
// EMA:
//   multiplier = 2 / (lookback + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The first EMA value (end == lookback) is seeded with the SMA of the first
// `lookback` closes.
//
// Two call modes:
//   point mode        — `sma_at` / `ema_at` answer a single `end` index.
//   unrestricted mode — `sma_series` / `ema_series` return every computable
//                       point and need at least `lookback + 1` bars.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{require_history, IndicatorError, Result};
use crate::types::{IndicatorPoint, PriceBar};

/// Which averaging rule a moving-average field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AverageKind {
    #[default]
    Simple,
    Exponential,
}

impl std::fmt::Display for AverageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "SMA"),
            Self::Exponential => write!(f, "EMA"),
        }
    }
}

/// Simple moving average of `close` over bars `[end - lookback, end)`.
///
/// A zero `lookback` yields `Some(0.0)`; callers must not read that as a
/// real average.  Returns `None` when the window does not fit inside `bars`.
pub fn sma_at(bars: &[PriceBar], end: usize, lookback: usize) -> Option<f64> {
    if lookback == 0 {
        return Some(0.0);
    }
    if end < lookback || end > bars.len() {
        return None;
    }
    Some(mean(bars[end - lookback..end].iter().map(|b| b.close), lookback))
}

/// Exponential moving average at `end`, seeded from the first `lookback`
/// closes and folded forward to bar `end - 1`.
///
/// Same zero-lookback sentinel and bounds rules as [`sma_at`].
pub fn ema_at(bars: &[PriceBar], end: usize, lookback: usize) -> Option<f64> {
    if lookback == 0 {
        return Some(0.0);
    }
    if end < lookback || end > bars.len() {
        return None;
    }

    let multiplier = ema_multiplier(lookback);
    let seed = mean(bars[..lookback].iter().map(|b| b.close), lookback);
    let ema = bars[lookback..end]
        .iter()
        .fold(seed, |prev, b| b.close * multiplier + prev * (1.0 - multiplier));
    Some(ema)
}

/// Every computable SMA point over `bars`, oldest first.
pub fn sma_series(bars: &[PriceBar], lookback: usize) -> Result<Vec<IndicatorPoint>> {
    check_window(bars, lookback)?;

    let points = (lookback..=bars.len())
        .filter_map(|end| {
            let value = sma_at(bars, end, lookback)?;
            Some(IndicatorPoint {
                date: bars[end - 1].date,
                value,
            })
        })
        .collect();
    Ok(points)
}

/// Every computable EMA point over `bars`, oldest first.
///
/// A non-finite intermediate value ends the series at that point.
pub fn ema_series(bars: &[PriceBar], lookback: usize) -> Result<Vec<IndicatorPoint>> {
    check_window(bars, lookback)?;

    let multiplier = ema_multiplier(lookback);
    let seed = mean(bars[..lookback].iter().map(|b| b.close), lookback);

    let mut result = Vec::with_capacity(bars.len() - lookback + 1);
    result.push(IndicatorPoint {
        date: bars[lookback - 1].date,
        value: seed,
    });

    let mut prev = seed;
    for bar in &bars[lookback..] {
        let ema = bar.close * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(IndicatorPoint {
            date: bar.date,
            value: ema,
        });
        prev = ema;
    }

    Ok(result)
}

/// Dispatch on [`AverageKind`].
pub fn average_series(
    kind: AverageKind,
    bars: &[PriceBar],
    lookback: usize,
) -> Result<Vec<IndicatorPoint>> {
    match kind {
        AverageKind::Simple => sma_series(bars, lookback),
        AverageKind::Exponential => ema_series(bars, lookback),
    }
}

/// Windowed mean applied to an already-computed indicator series (e.g. %D
/// over %K).  Needs only `lookback` points.
pub fn sma_of_points(points: &[IndicatorPoint], lookback: usize) -> Vec<IndicatorPoint> {
    if lookback == 0 || points.len() < lookback {
        return Vec::new();
    }

    (lookback..=points.len())
        .map(|end| IndicatorPoint {
            date: points[end - 1].date,
            value: mean(points[end - lookback..end].iter().map(|p| p.value), lookback),
        })
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    values.sum::<f64>() / count as f64
}

fn ema_multiplier(lookback: usize) -> f64 {
    2.0 / (lookback + 1) as f64
}

fn check_window(bars: &[PriceBar], lookback: usize) -> Result<()> {
    if lookback == 0 {
        return Err(IndicatorError::MalformedInput(
            "moving average lookback must be positive".into(),
        ));
    }
    require_history(bars.len(), lookback, 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::flat(start + Days::new(i as u64), c))
            .collect()
    }

    fn ascending(n: usize) -> Vec<PriceBar> {
        bars_from(&(1..=n).map(|i| i as f64).collect::<Vec<_>>())
    }

    // ---- sma -------------------------------------------------------------

    #[test]
    fn sma_known_windows() {
        let bars = bars_from(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        // 4th bar => window [1, 4)
        assert!((sma_at(&bars, 4, 3).unwrap() - 30.0).abs() < 1e-12);
        // 5th bar => window [2, 5)
        assert!((sma_at(&bars, 5, 3).unwrap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_series_is_stamped_with_newest_bar() {
        let bars = bars_from(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = sma_series(&bars, 3).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].date, bars[3].date);
        assert!((series[1].value - 30.0).abs() < 1e-12);
        assert_eq!(series[2].date, bars[4].date);
        assert!((series[2].value - 40.0).abs() < 1e-12);
    }

    #[test]
    fn sma_zero_lookback_is_zero_sentinel() {
        let bars = ascending(5);
        assert_eq!(sma_at(&bars, 3, 0), Some(0.0));
    }

    #[test]
    fn sma_out_of_window_is_none() {
        let bars = ascending(5);
        assert!(sma_at(&bars, 2, 3).is_none());
        assert!(sma_at(&bars, 6, 3).is_none());
    }

    #[test]
    fn sma_series_needs_lookback_plus_one() {
        let bars = ascending(3);
        assert_eq!(
            sma_series(&bars, 3),
            Err(IndicatorError::InsufficientHistory {
                required: 4,
                available: 3
            })
        );
        assert!(sma_series(&ascending(4), 3).is_ok());
    }

    #[test]
    fn huge_lookback_is_insufficient_history() {
        let bars = ascending(10);
        for series in [sma_series(&bars, usize::MAX), ema_series(&bars, usize::MAX)] {
            assert!(matches!(series, Err(IndicatorError::InsufficientHistory { .. })));
        }
        assert_eq!(sma_at(&bars, 5, usize::MAX), None);
        assert_eq!(ema_at(&bars, 5, usize::MAX), None);
    }

    #[test]
    fn sma_series_zero_lookback_is_malformed() {
        assert!(matches!(
            sma_series(&ascending(5), 0),
            Err(IndicatorError::MalformedInput(_))
        ));
    }

    // ---- ema -------------------------------------------------------------

    #[test]
    fn ema_known_values() {
        // 5-period EMA of 1..=10: seed = 3.0, multiplier = 1/3
        let bars = ascending(10);
        let ema = ema_series(&bars, 5).unwrap();
        assert_eq!(ema.len(), 6);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        let mut expected_vec = vec![expected];
        for b in &bars[5..] {
            expected = b.close * mult + expected * (1.0 - mult);
            expected_vec.push(expected);
        }
        for (a, b) in ema.iter().zip(expected_vec.iter()) {
            assert!((a.value - b).abs() < 1e-10, "got {}, expected {b}", a.value);
        }
    }

    #[test]
    fn ema_point_mode_matches_series() {
        let bars = ascending(30);
        let series = ema_series(&bars, 10).unwrap();
        for (offset, point) in series.iter().enumerate() {
            let at = ema_at(&bars, 10 + offset, 10).unwrap();
            assert!((at - point.value).abs() < 1e-10);
        }
    }

    #[test]
    fn ema_seed_equals_sma() {
        let bars = bars_from(&[2.0, 4.0, 6.0, 8.0]);
        assert!((ema_at(&bars, 3, 3).unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_stops_at_nan() {
        let bars = bars_from(&[1.0, 2.0, 3.0, f64::NAN, 5.0]);
        let ema = ema_series(&bars, 3).unwrap();
        assert_eq!(ema.len(), 1);
    }

    #[test]
    fn average_series_dispatches() {
        let bars = ascending(20);
        assert_eq!(
            average_series(AverageKind::Simple, &bars, 5).unwrap(),
            sma_series(&bars, 5).unwrap()
        );
        assert_eq!(
            average_series(AverageKind::Exponential, &bars, 5).unwrap(),
            ema_series(&bars, 5).unwrap()
        );
    }

    // ---- sma_of_points ---------------------------------------------------

    #[test]
    fn sma_of_points_windows_values() {
        let bars = ascending(4);
        let points: Vec<IndicatorPoint> = bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                value: b.close * 10.0,
            })
            .collect();
        let smoothed = sma_of_points(&points, 3);
        assert_eq!(smoothed.len(), 2);
        assert!((smoothed[0].value - 20.0).abs() < 1e-12);
        assert_eq!(smoothed[1].date, bars[3].date);
        assert!((smoothed[1].value - 30.0).abs() < 1e-12);
    }

    #[test]
    fn sma_of_points_short_input_is_empty() {
        assert!(sma_of_points(&[], 3).is_empty());
    }
}
