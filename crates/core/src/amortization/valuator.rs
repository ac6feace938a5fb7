//! Point-in-time valuation.
//!
//! Two strategies answer "how much is amortized as of a date":
//!
//! - [`value_at`] looks the date up in a generated (usually persisted)
//!   schedule. This is the authoritative answer.
//! - [`AnalyticValuator`] works from the request alone, for previews where no
//!   schedule has been stored. Under [`ElapsedRule::CompletedPeriods`] it agrees
//!   with the lookup exactly; [`ElapsedRule::InProgressMonth`] reproduces the
//!   legacy month-counting rule and may run one period ahead of it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::calendar;
use super::depreciation::DepreciationPolicy;
use super::error::AmortizationError;
use super::generator::{ScheduleGenerator, div, mul, uses_calendar_layout};
use super::types::{AmortizationMethod, AmortizationRequest, PaymentFrequency, Schedule, SchedulePeriod};

/// Amortized and outstanding amounts as of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// Capital amortized so far.
    pub accumulated_to_date: Decimal,
    /// Balance still outstanding (book value for assets).
    pub current_balance: Decimal,
    /// Periods counted as elapsed.
    pub periods_elapsed: u32,
}

impl Valuation {
    /// Nothing amortized yet.
    #[must_use]
    pub const fn untouched(principal: Decimal) -> Self {
        Self {
            accumulated_to_date: Decimal::ZERO,
            current_balance: principal,
            periods_elapsed: 0,
        }
    }

    /// Values after the first `elapsed` periods.
    fn after<P: PeriodRecord>(principal: Decimal, periods: &[P], elapsed: usize) -> Self {
        match elapsed.checked_sub(1).and_then(|last| periods.get(last)) {
            Some(period) => Self {
                accumulated_to_date: period.accumulated_to_date(),
                current_balance: period.ending_balance(),
                periods_elapsed: period.period_index(),
            },
            None => Self::untouched(principal),
        }
    }
}

/// A period as seen by the valuators: generated or loaded from storage.
pub trait PeriodRecord {
    /// 1-based index of the period.
    fn period_index(&self) -> u32;
    /// Last day of the period.
    fn period_end(&self) -> NaiveDate;
    /// Running total amortized through this period.
    fn accumulated_to_date(&self) -> Decimal;
    /// Balance after this period.
    fn ending_balance(&self) -> Decimal;
}

impl PeriodRecord for SchedulePeriod {
    fn period_index(&self) -> u32 {
        self.period_index
    }

    fn period_end(&self) -> NaiveDate {
        self.period_end
    }

    fn accumulated_to_date(&self) -> Decimal {
        self.accumulated_to_date
    }

    fn ending_balance(&self) -> Decimal {
        self.ending_balance
    }
}

/// Values a generated schedule as of `as_of`.
///
/// Uses the last period whose `period_end` is on or before `as_of`. Dates
/// before the first period give nothing amortized; dates after the last
/// period are clamped to the final values.
#[must_use]
pub fn value_at(schedule: &Schedule, as_of: NaiveDate) -> Valuation {
    value_at_periods(schedule.principal, &schedule.periods, as_of)
}

/// Same as [`value_at`] for a bare slice of periods or stored rows.
#[must_use]
pub fn value_at_periods<P: PeriodRecord>(
    principal: Decimal,
    periods: &[P],
    as_of: NaiveDate,
) -> Valuation {
    let elapsed = periods.partition_point(|p| p.period_end() <= as_of);
    Valuation::after(principal, periods, elapsed)
}

/// How the analytic valuator decides that a period has elapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElapsedRule {
    /// A period counts once its last day has passed.
    #[default]
    CompletedPeriods,
    /// Legacy rule: the month in progress counts once the day of month reaches
    /// the start day. Non-monthly schedules count every started period.
    InProgressMonth,
}

/// Values a request without a stored schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticValuator {
    generator: ScheduleGenerator,
    rule: ElapsedRule,
}

impl AnalyticValuator {
    /// Creates a valuator using `generator` for validation and fallbacks.
    #[must_use]
    pub const fn new(generator: ScheduleGenerator) -> Self {
        Self {
            generator,
            rule: ElapsedRule::CompletedPeriods,
        }
    }

    /// Sets the elapsed-period rule.
    #[must_use]
    pub const fn with_rule(mut self, rule: ElapsedRule) -> Self {
        self.rule = rule;
        self
    }

    /// Elapsed-period rule in use.
    #[must_use]
    pub const fn rule(&self) -> ElapsedRule {
        self.rule
    }

    /// Values `request` as of `as_of`.
    ///
    /// `none`, `full_at_start` and anchored straight-line are computed in
    /// closed form; every other method generates the schedule and indexes it.
    pub fn value_at(
        &self,
        request: &AmortizationRequest,
        as_of: NaiveDate,
    ) -> Result<Valuation, AmortizationError> {
        self.generator.validate(request)?;
        let principal = request.principal;

        match request.method {
            AmortizationMethod::None => Ok(Valuation::untouched(principal)),
            AmortizationMethod::FullAtStart => {
                if as_of >= request.start_date {
                    let depreciable = request.depreciable_amount();
                    Ok(Valuation {
                        accumulated_to_date: depreciable,
                        current_balance: principal - depreciable,
                        periods_elapsed: 1,
                    })
                } else {
                    Ok(Valuation::untouched(principal))
                }
            }
            AmortizationMethod::StraightLine if !uses_calendar_layout(request) => {
                let elapsed = self.anchored_elapsed(request, as_of)?;
                self.straight_line(request, elapsed)
            }
            _ => {
                debug!(method = %request.method, "valuing request from a generated schedule");
                let schedule = self.generator.generate(request)?;
                let elapsed = self.schedule_elapsed(request, &schedule, as_of)?;
                Ok(Valuation::after(principal, &schedule.periods, elapsed))
            }
        }
    }

    /// Elapsed periods of an anchored layout, capped at the term.
    fn anchored_elapsed(
        &self,
        request: &AmortizationRequest,
        as_of: NaiveDate,
    ) -> Result<u32, AmortizationError> {
        let start = request.start_date;
        let frequency = request.effective_frequency();
        let elapsed = match self.rule {
            ElapsedRule::CompletedPeriods => calendar::completed_periods(start, as_of, frequency)?,
            ElapsedRule::InProgressMonth if frequency == PaymentFrequency::Monthly => {
                calendar::months_between_inclusive(start, as_of)
            }
            ElapsedRule::InProgressMonth => {
                if as_of < start {
                    0
                } else {
                    // Started periods: every period whose start is on or before `as_of`.
                    let previous = as_of
                        .pred_opt()
                        .ok_or(AmortizationError::DateOutOfRange(as_of))?;
                    calendar::completed_periods(start, previous, frequency)?.saturating_add(1)
                }
            }
        };
        Ok(elapsed.min(request.term_periods))
    }

    /// Elapsed periods of a generated schedule.
    fn schedule_elapsed(
        &self,
        request: &AmortizationRequest,
        schedule: &Schedule,
        as_of: NaiveDate,
    ) -> Result<usize, AmortizationError> {
        let periods = &schedule.periods;
        match self.rule {
            ElapsedRule::CompletedPeriods => Ok(periods.partition_point(|p| p.period_end <= as_of)),
            ElapsedRule::InProgressMonth if !uses_calendar_layout(request) => {
                let elapsed = usize::try_from(self.anchored_elapsed(request, as_of)?)
                    .unwrap_or(usize::MAX);
                Ok(elapsed.min(periods.len()))
            }
            ElapsedRule::InProgressMonth => {
                Ok(periods.partition_point(|p| p.period_start <= as_of))
            }
        }
    }

    /// Closed-form straight-line valuation after `elapsed` full periods.
    ///
    /// Mirrors the generator: the rounded per-period amount accrues until the
    /// floor is reached, which may be before the term ends.
    fn straight_line(
        &self,
        request: &AmortizationRequest,
        elapsed: u32,
    ) -> Result<Valuation, AmortizationError> {
        let depreciable = request.depreciable_amount();
        let per_period =
            DepreciationPolicy::new(request, self.generator.settings().days_in_year)?.per_period();
        let last = if per_period.is_zero() {
            request.term_periods
        } else {
            div(depreciable, per_period, "straight-line periods")?
                .ceil()
                .to_u32()
                .map_or(request.term_periods, |periods| periods.min(request.term_periods))
        };
        let elapsed = elapsed.min(last);

        let accumulated = if elapsed == last {
            depreciable
        } else {
            mul(per_period, Decimal::from(elapsed), "accumulated depreciation")?.min(depreciable)
        };
        Ok(Valuation {
            accumulated_to_date: accumulated,
            current_balance: request.principal - accumulated,
            periods_elapsed: elapsed,
        })
    }
}
