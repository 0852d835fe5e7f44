// =============================================================================
// Date-Range Indicator Filter
// =============================================================================
//
// Extracts `[start, end]` from a pre-computed series that is stored
// newest-first (as third-party indicator feeds deliver them).  Both bounds
// are resolved with `position_on_or_before`: the first point, scanning from
// index 0, whose date is on or before the bound.  The result is then read
// from the start index *down* to the end index, so it comes out oldest-first.
//
// The lookup is not a nearest-date search.  On a series that is not
// newest-first it resolves to index 0 as soon as the first point qualifies.
// Callers rely on this, so it is kept as is.

use chrono::NaiveDate;
use tracing::debug;

use crate::alignment::position_on_or_before;
use crate::error::{IndicatorError, Result};
use crate::types::Dated;

/// Clone the points of a newest-first `series` between `start` and `end`,
/// returned oldest-first.
///
/// Fails with `DateNotFound` when no point is on or before a bound.  When
/// the resolved start index lies above the end index (reversed bounds) the
/// result is empty.
pub fn filter_range<T: Dated + Clone>(
    series: &[T],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<T>> {
    let start_idx =
        position_on_or_before(series, start).ok_or(IndicatorError::DateNotFound { date: start })?;
    let end_idx =
        position_on_or_before(series, end).ok_or(IndicatorError::DateNotFound { date: end })?;

    if start_idx < end_idx {
        debug!(%start, %end, start_idx, end_idx, "range bounds resolve in reverse order");
        return Ok(Vec::new());
    }

    Ok(series[end_idx..=start_idx].iter().rev().cloned().collect())
}
