// =============================================================================
// Chart Engine — sequences every indicator over (standard, extended) bars
// =============================================================================
//
// Pipeline for the price chart:
//   1. one row per standard bar, closing price only
//   2. SMA(33) and EMA(10), always attempted
//   3. 200-day and 50-day averages, only when
//      extended.len() >= standard.len() + lookback, the display window's
//      first bar sits at least lookback - 1 bars into the extended history
//      and every display date gets a value; otherwise the field stays empty
//      on every row and a diagnostic is recorded
//   4. Bollinger bands, when enabled
//
// RSI and the stochastic oscillator are separate series, not chart-row
// fields.
//
// Failure policy: a short long-window average degrades one field; a failed
// alignment or a too-short window aborts that whole series (`None`).  The
// two are never merged.  Malformed bar arrays abort before any computation.
//
// The engine holds only its configuration, so one instance can be shared
// across threads freely.
// =============================================================================

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alignment::{position_exact, validate_bars};
use crate::config::EngineConfig;
use crate::error::{require_history, IndicatorError, Result};
use crate::indicators::moving_average::{average_series, ema_series, sma_series};
use crate::indicators::rsi::{self, RsiZone};
use crate::indicators::{bollinger, range_filter, stochastic};
use crate::types::{
    BollingerPoint, ChartSeriesPoint, Dated, IndicatorPoint, PriceBar, RsiPoint, StochasticPoint,
};

/// A series or field that could not be produced, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub series: String,
    pub reason: String,
}

impl Diagnostic {
    fn new(series: &str, err: &IndicatorError) -> Self {
        Self {
            series: series.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Chart rows plus the reasons any field was left empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub points: Vec<ChartSeriesPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything the chart layer draws for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBundle {
    pub series: Vec<ChartSeriesPoint>,
    pub rsi: Option<Vec<RsiPoint>>,
    pub stochastic: Option<Vec<StochasticPoint>>,
    pub latest_rsi_zone: Option<RsiZone>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ChartEngine {
    config: EngineConfig,
}

impl Default for ChartEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ChartEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Price chart
    // -------------------------------------------------------------------------

    /// Chart rows for `standard`, with every moving average and (optionally)
    /// Bollinger band that history allows.
    ///
    /// `None` only for malformed input.
    pub fn price_series(&self, standard: &[PriceBar], extended: &[PriceBar]) -> Option<ChartSeries> {
        if let Err(e) = check_inputs(standard, extended) {
            warn!(error = %e, "price series input rejected");
            return None;
        }
        Some(self.build_price_series(standard, extended))
    }

    fn build_price_series(&self, standard: &[PriceBar], extended: &[PriceBar]) -> ChartSeries {
        let cfg = &self.config;
        let mut diagnostics = Vec::new();
        let mut rows = base_rows(standard);

        match sma_series(extended, cfg.sma_lookback) {
            Ok(sma) => {
                rows = fill_by_date(rows, &sma, |row, v| ChartSeriesPoint {
                    simple_moving_average: Some(v),
                    ..row
                })
            }
            Err(e) => record(&mut diagnostics, "simpleMovingAverage", &e),
        }

        match ema_series(extended, cfg.ema_lookback) {
            Ok(ema) => {
                rows = fill_by_date(rows, &ema, |row, v| ChartSeriesPoint {
                    exponential_moving_average: Some(v),
                    ..row
                })
            }
            Err(e) => record(&mut diagnostics, "exponentialMovingAverage", &e),
        }

        match self.long_average(standard, extended, cfg.long_lookback) {
            Ok(long) => {
                rows = fill_by_date(rows, &long, |row, v| ChartSeriesPoint {
                    two_hundred_day_moving_average: Some(v),
                    ..row
                })
            }
            Err(e) => record(&mut diagnostics, "twoHundredDayMovingAverage", &e),
        }

        match self.long_average(standard, extended, cfg.medium_lookback) {
            Ok(medium) => {
                rows = fill_by_date(rows, &medium, |row, v| ChartSeriesPoint {
                    fifty_day_moving_average: Some(v),
                    ..row
                })
            }
            Err(e) => record(&mut diagnostics, "fiftyDayMovingAverage", &e),
        }

        if cfg.include_bollinger {
            match self.try_bollinger(standard, extended) {
                Ok(bands) => rows = layer_bollinger(rows, &bands),
                Err(e) => record(&mut diagnostics, "bollingerBands", &e),
            }
        }

        info!(
            rows = rows.len(),
            skipped = diagnostics.len(),
            "price series computed"
        );

        ChartSeries {
            points: rows,
            diagnostics,
        }
    }

    /// A long-window average is computed only when the extended history can
    /// back every display row; it is never partially filled.
    fn long_average(
        &self,
        standard: &[PriceBar],
        extended: &[PriceBar],
        lookback: usize,
    ) -> Result<Vec<IndicatorPoint>> {
        require_history(extended.len(), standard.len(), lookback)?;

        let first = standard
            .first()
            .ok_or_else(|| IndicatorError::MalformedInput("display window is empty".into()))?
            .date;
        let start =
            position_exact(extended, first).ok_or(IndicatorError::DateNotFound { date: first })?;
        // The first average lands on extended bar `lookback - 1`.
        require_history(start + 1, lookback, 0)?;

        let averages = average_series(self.config.long_average_kind, extended, lookback)?;
        let dated: HashSet<NaiveDate> = averages.iter().map(|p| p.date).collect();
        if let Some(missing) = standard.iter().find(|b| !dated.contains(&b.date)) {
            return Err(IndicatorError::DateNotFound { date: missing.date });
        }
        Ok(averages)
    }

    // -------------------------------------------------------------------------
    // Individual series
    // -------------------------------------------------------------------------

    /// Bollinger bands aligned to `standard`, or `None` when unavailable.
    pub fn bollinger(&self, standard: &[PriceBar], extended: &[PriceBar]) -> Option<Vec<BollingerPoint>> {
        self.try_bollinger(standard, extended)
            .inspect_err(|e| log_failure("bollinger", e))
            .ok()
    }

    /// RSI aligned to `standard`, or `None` when unavailable.
    pub fn rsi(&self, standard: &[PriceBar], extended: &[PriceBar]) -> Option<Vec<RsiPoint>> {
        self.try_rsi(standard, extended)
            .inspect_err(|e| log_failure("rsi", e))
            .ok()
    }

    /// Paired %K/%D aligned to `standard`, or `None` when unavailable.
    pub fn stochastic(
        &self,
        standard: &[PriceBar],
        extended: &[PriceBar],
    ) -> Option<Vec<StochasticPoint>> {
        self.try_stochastic(standard, extended)
            .inspect_err(|e| log_failure("stochastic", e))
            .ok()
    }

    /// Points of a newest-first indicator series between `start` and `end`.
    pub fn indicator_range<T: Dated + Clone>(
        &self,
        series: &[T],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<Vec<T>> {
        range_filter::filter_range(series, start, end)
            .inspect_err(|e| log_failure("indicatorRange", e))
            .ok()
    }

    fn try_bollinger(&self, standard: &[PriceBar], extended: &[PriceBar]) -> Result<Vec<BollingerPoint>> {
        check_inputs(standard, extended)?;
        bollinger::calculate_bollinger(
            standard,
            extended,
            self.config.bollinger_lookback,
            self.config.bollinger_multiplier,
        )
    }

    fn try_rsi(&self, standard: &[PriceBar], extended: &[PriceBar]) -> Result<Vec<RsiPoint>> {
        check_inputs(standard, extended)?;
        rsi::calculate_rsi(
            standard,
            extended,
            self.config.rsi_lookback,
            self.config.full_uptrend_rsi,
        )
    }

    fn try_stochastic(
        &self,
        standard: &[PriceBar],
        extended: &[PriceBar],
    ) -> Result<Vec<StochasticPoint>> {
        check_inputs(standard, extended)?;
        stochastic::calculate_stochastic(
            standard,
            extended,
            self.config.stochastic_fast_lookback,
            self.config.stochastic_slow_lookback,
        )
    }

    // -------------------------------------------------------------------------
    // Bundle
    // -------------------------------------------------------------------------

    /// Price chart, RSI and stochastic for one date range.
    ///
    /// `None` only for malformed input; unavailable oscillators are `None`
    /// inside the bundle with a diagnostic.
    pub fn compute_bundle(&self, standard: &[PriceBar], extended: &[PriceBar]) -> Option<ChartBundle> {
        if let Err(e) = check_inputs(standard, extended) {
            warn!(error = %e, "chart bundle input rejected");
            return None;
        }

        let ChartSeries {
            points,
            mut diagnostics,
        } = self.build_price_series(standard, extended);

        let rsi_points = match self.try_rsi(standard, extended) {
            Ok(points) => Some(points),
            Err(e) => {
                record(&mut diagnostics, "rsi", &e);
                None
            }
        };

        let stochastic = match self.try_stochastic(standard, extended) {
            Ok(points) => Some(points),
            Err(e) => {
                record(&mut diagnostics, "stochastic", &e);
                None
            }
        };

        let latest_rsi_zone = rsi_points
            .as_deref()
            .and_then(rsi::latest_reading)
            .map(|(_, zone)| zone);

        Some(ChartBundle {
            series: points,
            rsi: rsi_points,
            stochastic,
            latest_rsi_zone,
            diagnostics,
        })
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn check_inputs(standard: &[PriceBar], extended: &[PriceBar]) -> Result<()> {
    validate_bars(standard, "standard")?;
    validate_bars(extended, "extended")
}

fn base_rows(standard: &[PriceBar]) -> Vec<ChartSeriesPoint> {
    standard
        .iter()
        .map(|b| ChartSeriesPoint::new(b.date, b.close))
        .collect()
}

/// Rebuild each row whose date has a value in `points`.  Rows without a
/// matching date pass through untouched.
fn fill_by_date<F>(rows: Vec<ChartSeriesPoint>, points: &[IndicatorPoint], apply: F) -> Vec<ChartSeriesPoint>
where
    F: Fn(ChartSeriesPoint, f64) -> ChartSeriesPoint,
{
    let by_date: HashMap<NaiveDate, f64> = points.iter().map(|p| (p.date, p.value)).collect();
    rows.into_iter()
        .map(|row| match by_date.get(&row.date) {
            Some(&v) => apply(row, v),
            None => row,
        })
        .collect()
}

fn layer_bollinger(rows: Vec<ChartSeriesPoint>, bands: &[BollingerPoint]) -> Vec<ChartSeriesPoint> {
    let by_date: HashMap<NaiveDate, &BollingerPoint> = bands.iter().map(|b| (b.date, b)).collect();
    rows.into_iter()
        .map(|row| match by_date.get(&row.date) {
            Some(b) => ChartSeriesPoint {
                lower_bollinger_band: Some(b.lower_band_value),
                upper_bollinger_band: Some(b.upper_band_value),
                bollinger_mean: Some(b.mean),
                ..row
            },
            None => row,
        })
        .collect()
}

fn record(diagnostics: &mut Vec<Diagnostic>, series: &str, err: &IndicatorError) {
    log_failure(series, err);
    diagnostics.push(Diagnostic::new(series, err));
}

/// Missing dates are routine when the display window predates the history;
/// short history and malformed input are worth surfacing.
fn log_failure(series: &str, err: &IndicatorError) {
    match err {
        IndicatorError::DateNotFound { .. } => debug!(series, error = %err, "series unavailable"),
        IndicatorError::InsufficientHistory { .. } | IndicatorError::MalformedInput(_) => {
            warn!(series, error = %err, "series skipped")
        }
    }
}
