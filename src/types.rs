// =============================================================================
// Shared types used across the chart indicator engine
// =============================================================================
//
// Input bars arrive from the data-fetch layer; every other type here is an
// output point produced fresh by one computation call.  Output records
// serialise with camelCase keys because the charting layer consumes them
// directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Anything stamped with a calendar date.  Alignment and range filtering are
/// generic over this.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// One daily OHLCV bar as supplied by the data-fetch layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl PriceBar {
    /// Bar with every price field set to `close`.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// A single date-stamped value (a moving average, a %K reading, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// The per-day row a price chart consumes.
///
/// Created with only `closing_price` set; engines then fill the optional
/// fields by date.  `None` means history was insufficient for that field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeriesPoint {
    pub date: NaiveDate,
    pub closing_price: f64,
    pub simple_moving_average: Option<f64>,
    pub exponential_moving_average: Option<f64>,
    pub two_hundred_day_moving_average: Option<f64>,
    pub fifty_day_moving_average: Option<f64>,
    pub lower_bollinger_band: Option<f64>,
    pub upper_bollinger_band: Option<f64>,
    pub bollinger_mean: Option<f64>,
}

impl ChartSeriesPoint {
    pub fn new(date: NaiveDate, closing_price: f64) -> Self {
        Self {
            date,
            closing_price,
            simple_moving_average: None,
            exponential_moving_average: None,
            two_hundred_day_moving_average: None,
            fifty_day_moving_average: None,
            lower_bollinger_band: None,
            upper_bollinger_band: None,
            bollinger_mean: None,
        }
    }
}

/// Bollinger reading for one display date.
///
/// `lower_band_value <= mean <= upper_band_value` always holds; all three
/// coincide when the window is flat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerPoint {
    pub date: NaiveDate,
    pub lower_band_value: f64,
    pub upper_band_value: f64,
    pub current_price: f64,
    pub moving_average: f64,
    pub standard_deviation: f64,
    pub mean: f64,
}

impl BollingerPoint {
    /// Absolute distance between the bands.
    pub fn band_width(&self) -> f64 {
        self.upper_band_value - self.lower_band_value
    }
}

/// One step of Wilder's RSI recurrence.  `upward_mean` and `downward_mean`
/// are the smoothed state carried into the next step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsiPoint {
    pub date: NaiveDate,
    pub closing_price: f64,
    pub upward_mean: f64,
    pub downward_mean: f64,
    pub rsi_value: f64,
}

/// Paired stochastic reading: `fast_value` is %K, `slow_value` is %D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StochasticPoint {
    pub date: NaiveDate,
    pub fast_value: f64,
    pub slow_value: f64,
}

impl Dated for PriceBar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for IndicatorPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for ChartSeriesPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for BollingerPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for RsiPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for StochasticPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
