// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Bootstrap — the first point uses `lookback` bars plus the close of the bar
//             before them.  upward_mean / downward_mean are the sums of gains
//             / losses divided by `lookback`, however many days moved.
// Step      — every later point folds one bar into the previous point:
//               up   = (prev_up   * (lookback - 1) + gain) / lookback
//               down = (prev_down * (lookback - 1) + loss) / lookback
// Value     — RS = up / down, RSI = 100 - 100 / (1 + RS)
//
// The series is an arena of points; each step reads only the previous point.
//
// Zero downward mean: with `FullUptrendRsi::Zero` RS is taken as 0, so a
// pure uptrend reads RSI 0 (maximally oversold).  That is the historical
// behaviour of this engine and the default.  The textbook definition gives
// 100 for a pure uptrend and is available as `FullUptrendRsi::Hundred`,
// which also reports 50 for a window with no movement at all.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::alignment::align_to_display;
use crate::error::{require_history, IndicatorError, Result};
use crate::types::{PriceBar, RsiPoint};

pub const DEFAULT_LOOKBACK: usize = 14;

/// RSI reported when the downward mean is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FullUptrendRsi {
    /// RS = 0, so RSI = 0.
    #[default]
    Zero,
    /// RSI = 100, or 50 when the upward mean is zero too.
    Hundred,
}

/// Conventional reading of an RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(value: f64) -> Self {
        if value >= 70.0 {
            Self::Overbought
        } else if value <= 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Convert smoothed means into an RSI value.
pub fn rsi_from_means(upward_mean: f64, downward_mean: f64, policy: FullUptrendRsi) -> f64 {
    if downward_mean == 0.0 {
        return match policy {
            FullUptrendRsi::Zero => 0.0,
            FullUptrendRsi::Hundred if upward_mean == 0.0 => 50.0,
            FullUptrendRsi::Hundred => 100.0,
        };
    }
    let rs = upward_mean / downward_mean;
    100.0 - 100.0 / (1.0 + rs)
}

/// First RSI point from `window` (oldest first) and the close preceding it.
///
/// Returns `None` for an empty window.
pub fn bootstrap(window: &[PriceBar], last_close: f64, policy: FullUptrendRsi) -> Option<RsiPoint> {
    let newest = window.last()?;
    let lookback = window.len() as f64;

    let (gains, losses, _) = window
        .iter()
        .fold((0.0_f64, 0.0_f64, last_close), |(g, l, prev), bar| {
            let diff = bar.close - prev;
            if diff > 0.0 {
                (g + diff, l, bar.close)
            } else {
                (g, l - diff, bar.close)
            }
        });

    let upward_mean = gains / lookback;
    let downward_mean = losses / lookback;

    Some(RsiPoint {
        date: newest.date,
        closing_price: newest.close,
        upward_mean,
        downward_mean,
        rsi_value: rsi_from_means(upward_mean, downward_mean, policy),
    })
}

/// Fold one more bar into `prev`.
pub fn step(prev: &RsiPoint, bar: &PriceBar, lookback: usize, policy: FullUptrendRsi) -> RsiPoint {
    let lookback_f = lookback as f64;
    let diff = bar.close - prev.closing_price;
    let gain = diff.max(0.0);
    let loss = (-diff).max(0.0);

    let upward_mean = (prev.upward_mean * (lookback_f - 1.0) + gain) / lookback_f;
    let downward_mean = (prev.downward_mean * (lookback_f - 1.0) + loss) / lookback_f;

    RsiPoint {
        date: bar.date,
        closing_price: bar.close,
        upward_mean,
        downward_mean,
        rsi_value: rsi_from_means(upward_mean, downward_mean, policy),
    }
}

/// Full RSI series over `bars`, one point per bar from index `lookback` on.
///
/// A non-finite value ends the series at that point.
pub fn calculate_rsi_series(
    bars: &[PriceBar],
    lookback: usize,
    policy: FullUptrendRsi,
) -> Result<Vec<RsiPoint>> {
    if lookback == 0 {
        return Err(IndicatorError::MalformedInput("rsi lookback must be positive".into()));
    }
    require_history(bars.len(), lookback, 1)?;

    let first = bootstrap(&bars[1..=lookback], bars[0].close, policy).ok_or(
        IndicatorError::InsufficientHistory {
            required: lookback + 1,
            available: bars.len(),
        },
    )?;

    let mut points = Vec::with_capacity(bars.len() - lookback);
    points.push(first);

    for bar in &bars[lookback + 1..] {
        let Some(prev) = points.last() else {
            break;
        };
        let next = step(prev, bar, lookback, policy);
        if !next.rsi_value.is_finite() {
            break;
        }
        points.push(next);
    }

    Ok(points)
}

/// RSI over `extended`, aligned to the dates of `standard`.
pub fn calculate_rsi(
    standard: &[PriceBar],
    extended: &[PriceBar],
    lookback: usize,
    policy: FullUptrendRsi,
) -> Result<Vec<RsiPoint>> {
    let series = calculate_rsi_series(extended, lookback, policy)?;
    Ok(align_to_display(&series, standard)?.to_vec())
}

/// Most recent RSI value with its zone.
pub fn latest_reading(points: &[RsiPoint]) -> Option<(f64, RsiZone)> {
    let value = points.last()?.rsi_value;
    Some((value, RsiZone::classify(value)))
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

    fn wilder_sample() -> Vec<PriceBar> {
        bars_from(&[
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ])
    }

    // ---- calculate_rsi_series --------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi_series(&[], 14, FullUptrendRsi::Zero).is_err());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(matches!(
            calculate_rsi_series(&bars_from(&[1.0, 2.0, 3.0]), 0, FullUptrendRsi::Zero),
            Err(IndicatorError::MalformedInput(_))
        ));
    }

    #[test]
    fn rsi_insufficient_data() {
        let bars = bars_from(&(1..=14).map(|x| x as f64).collect::<Vec<_>>());
        assert_eq!(
            calculate_rsi_series(&bars, 14, FullUptrendRsi::Zero),
            Err(IndicatorError::InsufficientHistory {
                required: 15,
                available: 14
            })
        );
    }

    #[test]
    fn rsi_huge_lookback_is_insufficient_history() {
        let bars = wilder_sample();
        assert_eq!(
            calculate_rsi_series(&bars, usize::MAX, FullUptrendRsi::Zero),
            Err(IndicatorError::InsufficientHistory {
                required: usize::MAX,
                available: bars.len()
            })
        );
    }

    #[test]
    fn rsi_one_point_per_bar_after_bootstrap() {
        let bars = wilder_sample();
        let series = calculate_rsi_series(&bars, 14, FullUptrendRsi::Zero).unwrap();
        assert_eq!(series.len(), bars.len() - 14);
        assert_eq!(series[0].date, bars[14].date);
        assert_eq!(series.last().unwrap().date, bars.last().unwrap().date);
    }

    #[test]
    fn bootstrap_divides_by_lookback() {
        // One gain of 4 and one loss of 2 over a 4-bar window.
        let bars = bars_from(&[10.0, 14.0, 14.0, 12.0, 12.0]);
        let p = bootstrap(&bars[1..], bars[0].close, FullUptrendRsi::Zero).unwrap();
        assert!((p.upward_mean - 1.0).abs() < 1e-12);
        assert!((p.downward_mean - 0.5).abs() < 1e-12);
        // RS = 2 => RSI = 100 - 100/3
        assert!((p.rsi_value - (100.0 - 100.0 / 3.0)).abs() < 1e-10);
    }

    #[test]
    fn step_threads_previous_means() {
        let bars = wilder_sample();
        let series = calculate_rsi_series(&bars, 14, FullUptrendRsi::Zero).unwrap();
        let again = step(&series[0], &bars[15], 14, FullUptrendRsi::Zero);
        assert_eq!(again, series[1]);

        let diff = bars[15].close - bars[14].close;
        let expected_up = (series[0].upward_mean * 13.0 + diff.max(0.0)) / 14.0;
        assert!((series[1].upward_mean - expected_up).abs() < 1e-12);
    }

    #[test]
    fn rsi_all_gains_default_reads_zero() {
        let bars = bars_from(&(1..=30).map(|x| x as f64).collect::<Vec<_>>());
        for p in calculate_rsi_series(&bars, 14, FullUptrendRsi::Zero).unwrap() {
            assert!(p.rsi_value.abs() < 1e-10, "expected 0.0, got {}", p.rsi_value);
        }
    }

    #[test]
    fn rsi_all_gains_hundred_policy() {
        let bars = bars_from(&(1..=30).map(|x| x as f64).collect::<Vec<_>>());
        for p in calculate_rsi_series(&bars, 14, FullUptrendRsi::Hundred).unwrap() {
            assert!((p.rsi_value - 100.0).abs() < 1e-10);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let bars = bars_from(&(1..=30).rev().map(|x| x as f64).collect::<Vec<_>>());
        for p in calculate_rsi_series(&bars, 14, FullUptrendRsi::Hundred).unwrap() {
            assert!(p.rsi_value.abs() < 1e-10, "expected 0.0, got {}", p.rsi_value);
        }
    }

    #[test]
    fn rsi_flat_market_by_policy() {
        let bars = bars_from(&[100.0; 30]);
        let zero = calculate_rsi_series(&bars, 14, FullUptrendRsi::Zero).unwrap();
        assert!(zero.iter().all(|p| p.rsi_value == 0.0));
        let hundred = calculate_rsi_series(&bars, 14, FullUptrendRsi::Hundred).unwrap();
        assert!(hundred.iter().all(|p| (p.rsi_value - 50.0).abs() < 1e-10));
    }

    #[test]
    fn rsi_range_check() {
        let series = calculate_rsi_series(&wilder_sample(), 14, FullUptrendRsi::Zero).unwrap();
        for p in &series {
            assert!((0.0..=100.0).contains(&p.rsi_value), "RSI {} out of range", p.rsi_value);
        }
    }

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_aligns_to_display_window() {
        let extended = bars_from(&(0..60).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect::<Vec<_>>());
        let standard = extended[40..].to_vec();
        let points = calculate_rsi(&standard, &extended, 14, FullUptrendRsi::Zero).unwrap();
        assert_eq!(points.len(), 20);
        assert_eq!(points[0].date, standard[0].date);
        assert_eq!(points[19].date, standard[19].date);
    }

    #[test]
    fn rsi_display_before_bootstrap_fails() {
        let extended = bars_from(&(0..60).map(|i| i as f64).collect::<Vec<_>>());
        let standard = extended[5..20].to_vec();
        assert_eq!(
            calculate_rsi(&standard, &extended, 14, FullUptrendRsi::Zero),
            Err(IndicatorError::DateNotFound {
                date: standard[0].date
            })
        );
    }

    // ---- latest_reading --------------------------------------------------

    #[test]
    fn latest_reading_labels() {
        let bars = bars_from(&(1..=30).map(|x| x as f64).collect::<Vec<_>>());
        let up = calculate_rsi_series(&bars, 14, FullUptrendRsi::Hundred).unwrap();
        let (value, zone) = latest_reading(&up).unwrap();
        assert!((value - 100.0).abs() < 1e-10);
        assert_eq!(zone, RsiZone::Overbought);
        assert_eq!(zone.to_string(), "OVERBOUGHT");

        assert_eq!(RsiZone::classify(25.0), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(50.0), RsiZone::Neutral);
        assert!(latest_reading(&[]).is_none());
    }
}
