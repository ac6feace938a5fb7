//! Period date arithmetic.
//!
//! Period starts are always offset from the anchor date (never accumulated
//! period by period), so month-end clamping cannot drift: a schedule anchored
//! on Jan 31 runs Feb 28/29, Mar 31, Apr 30, and so on.

use chrono::{Datelike, Days, Months, NaiveDate};

use super::error::AmortizationError;
use super::types::{PaymentFrequency, PeriodStep};

/// Inclusive date range covered by one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSpan {
    /// First day.
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
    /// True for a prorated partial period.
    pub stub: bool,
}

impl PeriodSpan {
    /// Number of calendar days in the span, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Returns the start of period `n` (0-based) of a schedule anchored on `anchor`.
pub fn add_periods(
    anchor: NaiveDate,
    frequency: PaymentFrequency,
    n: u32,
) -> Result<NaiveDate, AmortizationError> {
    let shifted = match frequency.step() {
        PeriodStep::Days(days) => {
            anchor.checked_add_days(Days::new(u64::from(days) * u64::from(n)))
        }
        PeriodStep::Months(months) => months
            .checked_mul(n)
            .and_then(|total| anchor.checked_add_months(Months::new(total))),
    };
    shifted.ok_or(AmortizationError::DateOutOfRange(anchor))
}

fn day_before(date: NaiveDate) -> Result<NaiveDate, AmortizationError> {
    date.pred_opt().ok_or(AmortizationError::DateOutOfRange(date))
}

/// Returns true if `date` starts a calendar period of the given frequency.
///
/// Day-based frequencies have no calendar boundary and are always aligned.
#[must_use]
pub fn is_period_boundary(date: NaiveDate, frequency: PaymentFrequency) -> bool {
    match frequency {
        PaymentFrequency::Weekly | PaymentFrequency::BiWeekly => true,
        PaymentFrequency::Monthly => date.day() == 1,
        PaymentFrequency::Quarterly => date.day() == 1 && date.month0() % 3 == 0,
        PaymentFrequency::Annual => date.ordinal() == 1,
    }
}

/// First calendar boundary strictly after `date`.
fn next_boundary(
    date: NaiveDate,
    frequency: PaymentFrequency,
) -> Result<NaiveDate, AmortizationError> {
    let period_start = match frequency {
        PaymentFrequency::Weekly | PaymentFrequency::BiWeekly => Some(date),
        PaymentFrequency::Monthly => date.with_day(1),
        PaymentFrequency::Quarterly => {
            NaiveDate::from_ymd_opt(date.year(), date.month0() / 3 * 3 + 1, 1)
        }
        PaymentFrequency::Annual => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    }
    .ok_or(AmortizationError::DateOutOfRange(date))?;
    add_periods(period_start, frequency, 1)
}

/// Lays out `count` full periods starting on `anchor`.
pub fn anchored_spans(
    anchor: NaiveDate,
    frequency: PaymentFrequency,
    count: u32,
) -> Result<Vec<PeriodSpan>, AmortizationError> {
    (0..count)
        .map(|i| {
            Ok(PeriodSpan {
                start: add_periods(anchor, frequency, i)?,
                end: day_before(add_periods(anchor, frequency, i + 1)?)?,
                stub: false,
            })
        })
        .collect()
}

/// Lays out a term on calendar boundaries: a leading stub from `start` to the
/// end of its calendar period, `term - 1` full periods, and a trailing stub up
/// to the day before the term anniversary.
///
/// The spans cover exactly the same days as [`anchored_spans`] for the same term.
pub fn calendar_aligned_spans(
    start: NaiveDate,
    frequency: PaymentFrequency,
    term: u32,
) -> Result<Vec<PeriodSpan>, AmortizationError> {
    let boundary = next_boundary(start, frequency)?;
    let term_end = add_periods(start, frequency, term)?;

    let mut spans = Vec::with_capacity(term as usize + 1);
    spans.push(PeriodSpan {
        start,
        end: day_before(boundary)?,
        stub: true,
    });
    for i in 0..term.saturating_sub(1) {
        spans.push(PeriodSpan {
            start: add_periods(boundary, frequency, i)?,
            end: day_before(add_periods(boundary, frequency, i + 1)?)?,
            stub: false,
        });
    }
    let tail_start = add_periods(boundary, frequency, term.saturating_sub(1))?;
    if tail_start < term_end {
        spans.push(PeriodSpan {
            start: tail_start,
            end: day_before(term_end)?,
            stub: true,
        });
    }
    Ok(spans)
}

/// Number of periods of a schedule anchored on `start` whose last day is on
/// or before `as_of`.
pub fn completed_periods(
    start: NaiveDate,
    as_of: NaiveDate,
    frequency: PaymentFrequency,
) -> Result<u32, AmortizationError> {
    // Period k is complete once the start of period k+1 is at most the day after `as_of`.
    let cutoff = as_of
        .succ_opt()
        .ok_or(AmortizationError::DateOutOfRange(as_of))?;
    if cutoff <= start {
        return Ok(0);
    }

    let mut count = match frequency.step() {
        PeriodStep::Days(days) => {
            u32::try_from((cutoff - start).num_days() / i64::from(days)).unwrap_or(u32::MAX)
        }
        PeriodStep::Months(months) => {
            let elapsed = (i64::from(cutoff.year()) - i64::from(start.year())) * 12
                + i64::from(cutoff.month())
                - i64::from(start.month());
            u32::try_from(elapsed.max(0)).unwrap_or(u32::MAX) / months
        }
    };
    while count > 0 && add_periods(start, frequency, count)? > cutoff {
        count -= 1;
    }
    while add_periods(start, frequency, count + 1)? <= cutoff {
        count += 1;
    }
    Ok(count)
}

/// Whole months from `start` to `end`, counting the month in progress once
/// `end.day() >= start.day()`.
///
/// This is the legacy asset-register rule. It disagrees with
/// [`completed_periods`] by one around anniversaries and at month ends.
#[must_use]
pub fn months_between_inclusive(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let months = (i64::from(end.year()) - i64::from(start.year())) * 12
        + i64::from(end.month())
        - i64::from(start.month());
    let months = if end.day() >= start.day() {
        months + 1
    } else {
        months
    };
    u32::try_from(months).unwrap_or(u32::MAX)
}
