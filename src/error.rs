// =============================================================================
// Indicator failure taxonomy
// =============================================================================
//
// None of these are fatal.  The chart facade turns a failed series into
// `None` (or a `Diagnostic` for the long moving averages) after logging it.

use chrono::NaiveDate;
use thiserror::Error;

/// Why an indicator series could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// Fewer bars than the lookback window needs.
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// The display window's first date is missing from a derived series.
    #[error("date {date} not found in computed series")]
    DateNotFound { date: NaiveDate },

    /// Input that cannot be computed over at all.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

/// `Ok` when `available` bars cover `lookback + extra`.
///
/// The sum saturates, so an oversized lookback reports as missing history
/// instead of wrapping.
pub fn require_history(available: usize, lookback: usize, extra: usize) -> Result<()> {
    let required = lookback.saturating_add(extra);
    if available < required {
        return Err(IndicatorError::InsufficientHistory {
            required,
            available,
        });
    }
    Ok(())
}
