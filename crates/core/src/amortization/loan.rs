//! Loan period rules: equal payment, equal principal and interest-only balloon.
//!
//! Interest for a period is `round(beginning_balance * periodic_rate)` where
//! the periodic rate is the nominal annual rate divided by the number of
//! periods per year. Grace periods pay interest only.

use amortis_shared::types::round_money;
use rust_decimal::Decimal;

use super::calendar::PeriodSpan;
use super::error::AmortizationError;
use super::generator::{PeriodPolicy, Split, div, mul};
use super::types::{AmortizationMethod, AmortizationRequest, PeriodKind};

/// `(1 + rate)^periods` by repeated checked multiplication.
fn compound(rate: Decimal, periods: u32) -> Result<Decimal, AmortizationError> {
    let factor = Decimal::ONE + rate;
    (0..periods).try_fold(Decimal::ONE, |acc, _| mul(acc, factor, "compound growth"))
}

/// Level payment that amortizes `principal` down to `residual` over
/// `periods` periods at `periodic_rate` (a fraction, not a percentage).
///
/// With a zero rate the payment is `(principal - residual) / periods`.
/// The result is unrounded.
///
/// # Errors
///
/// Returns [`AmortizationError::ZeroTerm`] for zero periods and
/// [`AmortizationError::ArithmeticOverflow`] if the growth factor overflows.
pub fn annuity_payment(
    principal: Decimal,
    residual: Decimal,
    periodic_rate: Decimal,
    periods: u32,
) -> Result<Decimal, AmortizationError> {
    if periods == 0 {
        return Err(AmortizationError::ZeroTerm);
    }
    if periodic_rate.is_zero() {
        return div(principal - residual, Decimal::from(periods), "annuity payment");
    }
    let growth = compound(periodic_rate, periods)?;
    let financed = mul(principal, growth, "annuity payment")? - residual;
    div(
        mul(financed, periodic_rate, "annuity payment")?,
        growth - Decimal::ONE,
        "annuity payment",
    )
}

/// Splits loan periods into interest and principal.
pub(crate) struct LoanPolicy {
    method: AmortizationMethod,
    periodic_rate: Decimal,
    grace_periods: u32,
    /// Level payment (equal payment) or level principal (equal principal), rounded once.
    installment: Decimal,
}

impl LoanPolicy {
    pub(crate) fn new(request: &AmortizationRequest) -> Result<Self, AmortizationError> {
        let annual = request
            .annual_rate_percent
            .ok_or(AmortizationError::MissingRate(request.method.name()))?;
        let periods_per_year = Decimal::from(request.effective_frequency().periods_per_year());
        let periodic_rate = div(
            annual,
            mul(Decimal::ONE_HUNDRED, periods_per_year, "periodic rate")?,
            "periodic rate",
        )?;
        let amortizing = request.term_periods - request.grace_periods;

        let installment = match request.method {
            AmortizationMethod::EqualPayment => round_money(annuity_payment(
                request.principal,
                request.residual_value,
                periodic_rate,
                amortizing,
            )?),
            AmortizationMethod::EqualPrincipal => round_money(div(
                request.depreciable_amount(),
                Decimal::from(amortizing),
                "principal installment",
            )?),
            _ => Decimal::ZERO,
        };

        Ok(Self {
            method: request.method,
            periodic_rate,
            grace_periods: request.grace_periods,
            installment,
        })
    }

    fn interest(&self, beginning: Decimal) -> Result<Decimal, AmortizationError> {
        Ok(round_money(mul(beginning, self.periodic_rate, "interest")?))
    }

    const fn in_grace(&self, index: u32) -> bool {
        index <= self.grace_periods
    }
}

impl PeriodPolicy for LoanPolicy {
    fn split(
        &self,
        index: u32,
        _span: &PeriodSpan,
        beginning: Decimal,
    ) -> Result<Split, AmortizationError> {
        let interest = self.interest(beginning)?;
        let principal = if self.in_grace(index) {
            Decimal::ZERO
        } else {
            match self.method {
                AmortizationMethod::EqualPayment => {
                    (self.installment - interest).max(Decimal::ZERO)
                }
                AmortizationMethod::EqualPrincipal => self.installment,
                _ => Decimal::ZERO,
            }
        };
        Ok(Split::Loan {
            interest,
            principal,
        })
    }

    fn close(
        &self,
        _span: &PeriodSpan,
        beginning: Decimal,
        floor: Decimal,
    ) -> Result<Split, AmortizationError> {
        Ok(Split::Loan {
            interest: self.interest(beginning)?,
            principal: beginning - floor,
        })
    }

    fn kind(&self, index: u32, _span: &PeriodSpan) -> PeriodKind {
        if self.in_grace(index) {
            PeriodKind::Grace
        } else {
            PeriodKind::Regular
        }
    }

    fn closing_kind(&self) -> PeriodKind {
        match self.method {
            AmortizationMethod::InterestOnlyBalloon => PeriodKind::Balloon,
            _ => PeriodKind::Final,
        }
    }
}
