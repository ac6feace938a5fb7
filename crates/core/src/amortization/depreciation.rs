//! Depreciation period rules: full-at-start, straight-line and declining balance.

use amortis_shared::types::round_money;
use rust_decimal::Decimal;

use super::calendar::PeriodSpan;
use super::error::AmortizationError;
use super::generator::{PeriodPolicy, Split, div, mul};
use super::types::{AmortizationMethod, AmortizationRequest, PeriodKind};

/// Splits depreciation periods. Expense and capital reduction are the same amount.
///
/// Without a rate, straight-line spreads the depreciable amount evenly over
/// the term and declining balance expenses `multiplier / term` of the opening
/// balance. With a rate, a full year expenses `rate` percent of the cost
/// (straight-line) or of the opening balance (declining balance), and the
/// term only caps the schedule.
pub(crate) struct DepreciationPolicy {
    method: AmortizationMethod,
    term: Decimal,
    /// Annual rate as a fraction, when depreciating on a rate basis.
    annual_rate: Option<Decimal>,
    /// Straight-line amount of one full period, rounded once.
    per_period: Decimal,
    /// Unrounded straight-line expense of a full year.
    annual_straight_line: Decimal,
    periods_per_year: Decimal,
    days_in_year: Decimal,
}

impl DepreciationPolicy {
    pub(crate) fn new(
        request: &AmortizationRequest,
        days_in_year: u32,
    ) -> Result<Self, AmortizationError> {
        let term = Decimal::from(request.term_periods);
        let periods_per_year = Decimal::from(request.effective_frequency().periods_per_year());
        let annual_rate = request
            .annual_rate_percent
            .filter(|_| request.method.uses_depreciation_rate())
            .map(|percent| div(percent, Decimal::ONE_HUNDRED, "depreciation rate"))
            .transpose()?;

        let (per_period, annual_straight_line) = match annual_rate {
            Some(rate) => {
                let annual = mul(request.principal, rate, "straight-line amount")?;
                (div(annual, periods_per_year, "straight-line amount")?, annual)
            }
            None => {
                let per_period =
                    div(request.depreciable_amount(), term, "straight-line amount")?;
                (per_period, mul(per_period, periods_per_year, "annual expense")?)
            }
        };

        Ok(Self {
            method: request.method,
            term,
            annual_rate,
            per_period: round_money(per_period),
            annual_straight_line,
            periods_per_year,
            days_in_year: Decimal::from(days_in_year),
        })
    }

    /// Rounded straight-line amount of one full period.
    pub(crate) const fn per_period(&self) -> Decimal {
        self.per_period
    }

    /// Unrounded expense of one full period at the given opening balance.
    fn full_period_amount(&self, beginning: Decimal) -> Result<Decimal, AmortizationError> {
        match (self.method, self.annual_rate) {
            (AmortizationMethod::StraightLine, _) => Ok(self.per_period),
            (AmortizationMethod::DecliningBalance { .. }, Some(rate)) => div(
                mul(beginning, rate, "declining balance expense")?,
                self.periods_per_year,
                "declining balance expense",
            ),
            (AmortizationMethod::DecliningBalance { multiplier }, None) => div(
                mul(beginning, multiplier, "declining balance expense")?,
                self.term,
                "declining balance expense",
            ),
            _ => Ok(Decimal::ZERO),
        }
    }

    /// Unrounded expense of a full year at the given opening balance.
    fn annual_amount(&self, beginning: Decimal) -> Result<Decimal, AmortizationError> {
        match self.method {
            AmortizationMethod::StraightLine => Ok(self.annual_straight_line),
            _ => mul(
                self.full_period_amount(beginning)?,
                self.periods_per_year,
                "annual expense",
            ),
        }
    }
}

impl PeriodPolicy for DepreciationPolicy {
    fn split(
        &self,
        _index: u32,
        span: &PeriodSpan,
        beginning: Decimal,
    ) -> Result<Split, AmortizationError> {
        let amount = if span.stub {
            let annual = self.annual_amount(beginning)?;
            div(
                mul(annual, Decimal::from(span.days()), "stub proration")?,
                self.days_in_year,
                "stub proration",
            )?
        } else {
            self.full_period_amount(beginning)?
        };
        Ok(Split::Expense(round_money(amount)))
    }

    fn close(
        &self,
        _span: &PeriodSpan,
        beginning: Decimal,
        floor: Decimal,
    ) -> Result<Split, AmortizationError> {
        Ok(Split::Expense(beginning - floor))
    }

    fn kind(&self, _index: u32, span: &PeriodSpan) -> PeriodKind {
        if span.stub {
            PeriodKind::Stub
        } else {
            PeriodKind::Regular
        }
    }
}
