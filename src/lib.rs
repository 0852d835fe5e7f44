// =============================================================================
// Stock chart technical-analysis engine
// =============================================================================
//
// Turns daily OHLCV bars into chart-ready series: simple / exponential moving
// averages, Bollinger Bands, Wilder's RSI and the stochastic oscillator.
//
// Callers pass two bar arrays, both oldest first:
//   standard — the date range to chart
//   extended — the same range plus enough earlier history to seed the
//              longest lookback in use
// =============================================================================

pub mod alignment;
pub mod chart;
pub mod config;
pub mod error;
pub mod indicators;
pub mod types;

pub use chart::{ChartBundle, ChartEngine, ChartSeries, Diagnostic};
pub use config::EngineConfig;
pub use error::IndicatorError;
pub use types::{
    BollingerPoint, ChartSeriesPoint, Dated, IndicatorPoint, PriceBar, RsiPoint, StochasticPoint,
};
