//! Loan terms and repayment quotes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    AmortizationError, AmortizationMethod, AmortizationRequest, PaymentFrequency, PeriodKind,
    Schedule, ScheduleGenerator,
};

/// Repayment terms of an approved loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount disbursed.
    pub amount: Decimal,
    /// Nominal annual rate in percent.
    pub annual_rate_percent: Decimal,
    /// Number of repayment periods.
    pub term_periods: u32,
    /// Repayment method.
    pub method: AmortizationMethod,
    /// Repayment frequency.
    #[serde(default = "default_frequency")]
    pub frequency: PaymentFrequency,
    /// Leading interest-only periods.
    #[serde(default)]
    pub grace_periods: u32,
    /// Balance left for a final balloon payment outside the schedule.
    #[serde(default)]
    pub balloon_amount: Option<Decimal>,
    /// Day the funds were released; first period starts here.
    pub disbursement_date: NaiveDate,
}

const fn default_frequency() -> PaymentFrequency {
    PaymentFrequency::Monthly
}

impl LoanTerms {
    /// Creates monthly terms with no grace periods and no balloon.
    #[must_use]
    pub const fn new(
        amount: Decimal,
        annual_rate_percent: Decimal,
        term_periods: u32,
        method: AmortizationMethod,
        disbursement_date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            annual_rate_percent,
            term_periods,
            method,
            frequency: PaymentFrequency::Monthly,
            grace_periods: 0,
            balloon_amount: None,
            disbursement_date,
        }
    }

    /// Sets the repayment frequency.
    #[must_use]
    pub const fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the interest-only grace periods.
    #[must_use]
    pub const fn with_grace_periods(mut self, grace_periods: u32) -> Self {
        self.grace_periods = grace_periods;
        self
    }

    /// Leaves `balloon_amount` outstanding at the end of the schedule.
    #[must_use]
    pub const fn with_balloon(mut self, balloon_amount: Decimal) -> Self {
        self.balloon_amount = Some(balloon_amount);
        self
    }

    /// Request for the repayment schedule.
    pub fn to_request(&self) -> Result<AmortizationRequest, AmortizationError> {
        if !self.method.is_loan() {
            return Err(AmortizationError::UnsupportedMethod {
                method: self.method.name(),
                context: "loans",
            });
        }
        Ok(AmortizationRequest::new(
            self.amount,
            self.term_periods,
            self.method,
            self.disbursement_date,
        )
        .with_residual_value(self.balloon_amount.unwrap_or(Decimal::ZERO))
        .with_annual_rate(self.annual_rate_percent)
        .with_frequency(self.frequency)
        .with_grace_periods(self.grace_periods))
    }

    /// Generates the repayment schedule.
    pub fn schedule(&self, generator: &ScheduleGenerator) -> Result<Schedule, AmortizationError> {
        generator.generate(&self.to_request()?)
    }

    /// Quotes the repayment figures of these terms.
    pub fn quote(&self, generator: &ScheduleGenerator) -> Result<LoanQuote, AmortizationError> {
        let schedule = self.schedule(generator)?;
        LoanQuote::from_schedule(&schedule)
    }
}

/// Repayment figures shown before a loan is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    /// Payment of the first period after any grace periods.
    pub periodic_payment: Decimal,
    /// Total of all scheduled payments.
    pub total_payment: Decimal,
    /// Total interest over the term.
    pub total_interest: Decimal,
    /// Last day of the final period.
    pub maturity_date: Option<NaiveDate>,
    /// Number of scheduled payments.
    pub periods: usize,
}

impl LoanQuote {
    /// Builds a quote from a generated loan schedule.
    pub fn from_schedule(schedule: &Schedule) -> Result<Self, AmortizationError> {
        let summary = schedule.summary()?;
        let periodic_payment = schedule
            .periods
            .iter()
            .find(|p| p.kind != PeriodKind::Grace)
            .map_or(Decimal::ZERO, |p| p.payment_amount);

        Ok(Self {
            periodic_payment,
            total_payment: summary.total_payment,
            total_interest: summary.total_interest,
            maturity_date: summary.maturity_date,
            periods: summary.periods,
        })
    }
}
