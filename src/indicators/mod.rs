// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator engines.  Each computes over the extended
// history and, where it feeds the chart, aligns its output to the display
// window by date.  Every fallible function returns `Result` so callers must
// handle insufficient-history and alignment failures explicitly.

pub mod bollinger;
pub mod moving_average;
pub mod range_filter;
pub mod rsi;
pub mod stochastic;

pub use moving_average::AverageKind;
pub use rsi::{FullUptrendRsi, RsiZone};
