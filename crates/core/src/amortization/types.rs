//! Amortization request and schedule types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AmortizationError;

/// Algorithm used to reduce the balance.
///
/// `None`, `FullAtStart`, `StraightLine` and `DecliningBalance` are the
/// depreciation subset; the remaining variants are loan repayment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmortizationMethod {
    /// No depreciation; the schedule is empty.
    None,
    /// The whole depreciable amount is expensed on the start date.
    FullAtStart,
    /// Constant expense every period.
    StraightLine,
    /// Expense is a fixed share (`multiplier / term_periods`) of the remaining balance.
    DecliningBalance {
        /// 1.0 for standard, 1.5 or 2.0 for accelerated declining balance.
        multiplier: Decimal,
    },
    /// Constant total payment (annuity).
    EqualPayment,
    /// Constant principal portion, declining payments.
    EqualPrincipal,
    /// Interest-only payments followed by a single balloon repayment.
    InterestOnlyBalloon,
}

impl AmortizationMethod {
    /// Declining balance at 150% of the straight-line rate.
    #[must_use]
    pub const fn declining_balance_150() -> Self {
        Self::DecliningBalance {
            multiplier: Decimal::from_parts(15, 0, 0, false, 1),
        }
    }

    /// Double-declining balance (200%).
    #[must_use]
    pub const fn double_declining() -> Self {
        Self::DecliningBalance {
            multiplier: Decimal::TWO,
        }
    }

    /// Returns true for the loan repayment methods.
    #[must_use]
    pub const fn is_loan(&self) -> bool {
        matches!(
            self,
            Self::EqualPayment | Self::EqualPrincipal | Self::InterestOnlyBalloon
        )
    }

    /// Returns true if the method needs `annual_rate_percent`.
    #[must_use]
    pub const fn requires_rate(&self) -> bool {
        self.is_loan()
    }

    /// Returns true if the method can run on an annual depreciation rate
    /// instead of its term (straight-line and declining balance).
    #[must_use]
    pub const fn uses_depreciation_rate(&self) -> bool {
        matches!(self, Self::StraightLine | Self::DecliningBalance { .. })
    }

    /// Frequency used when the request does not name one.
    #[must_use]
    pub const fn default_frequency(&self) -> PaymentFrequency {
        if self.is_loan() {
            PaymentFrequency::Monthly
        } else {
            PaymentFrequency::Annual
        }
    }

    /// Stable name, matching the serialized tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FullAtStart => "full_at_start",
            Self::StraightLine => "straight_line",
            Self::DecliningBalance { .. } => "declining_balance",
            Self::EqualPayment => "equal_payment",
            Self::EqualPrincipal => "equal_principal",
            Self::InterestOnlyBalloon => "interest_only_balloon",
        }
    }
}

impl std::fmt::Display for AmortizationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecliningBalance { multiplier } => write!(f, "declining_balance({multiplier})"),
            other => f.write_str(other.name()),
        }
    }
}

/// How partial first/last periods are prorated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodConvention {
    /// Every period counts as a full period regardless of calendar length.
    #[default]
    FullPeriod,
    /// Partial periods are scaled by `days / days_in_year` of the annual amount.
    ActualDays,
}

/// Length of one schedule period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    BiWeekly,
    /// Every calendar month.
    Monthly,
    /// Every three calendar months.
    Quarterly,
    /// Every calendar year.
    Annual,
}

/// Calendar step between consecutive period starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStep {
    /// Fixed number of days.
    Days(u32),
    /// Fixed number of calendar months.
    Months(u32),
}

impl PaymentFrequency {
    /// Number of periods in one year.
    #[must_use]
    pub const fn periods_per_year(self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::BiWeekly => 26,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Annual => 1,
        }
    }

    /// Calendar step of one period.
    #[must_use]
    pub const fn step(self) -> PeriodStep {
        match self {
            Self::Weekly => PeriodStep::Days(7),
            Self::BiWeekly => PeriodStep::Days(14),
            Self::Monthly => PeriodStep::Months(1),
            Self::Quarterly => PeriodStep::Months(3),
            Self::Annual => PeriodStep::Months(12),
        }
    }
}

/// Input to the schedule generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRequest {
    /// Opening balance: asset cost or loan amount.
    pub principal: Decimal,
    /// Floor the balance is amortized down to (salvage value or balloon left outstanding).
    #[serde(default)]
    pub residual_value: Decimal,
    /// Nominal annual rate in percent. Required by the loan methods. For
    /// straight-line and declining balance it is the optional depreciation
    /// rate: when set, each full year expenses this share of the cost
    /// (straight-line) or of the opening balance (declining balance), and
    /// `term_periods` only caps the schedule.
    #[serde(default)]
    pub annual_rate_percent: Option<Decimal>,
    /// Number of periods in the term.
    pub term_periods: u32,
    /// Amortization algorithm.
    pub method: AmortizationMethod,
    /// Proration of partial periods.
    #[serde(default)]
    pub period_convention: PeriodConvention,
    /// Period length; defaults per method (see [`AmortizationMethod::default_frequency`]).
    #[serde(default)]
    pub frequency: Option<PaymentFrequency>,
    /// Leading interest-only periods (loan methods only).
    #[serde(default)]
    pub grace_periods: u32,
    /// First day of period 1.
    pub start_date: NaiveDate,
}

impl AmortizationRequest {
    /// Creates a request with no residual, no rate, full-period convention and
    /// the method's default frequency.
    #[must_use]
    pub const fn new(
        principal: Decimal,
        term_periods: u32,
        method: AmortizationMethod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            residual_value: Decimal::ZERO,
            annual_rate_percent: None,
            term_periods,
            method,
            period_convention: PeriodConvention::FullPeriod,
            frequency: None,
            grace_periods: 0,
            start_date,
        }
    }

    /// Sets the residual value.
    #[must_use]
    pub const fn with_residual_value(mut self, residual_value: Decimal) -> Self {
        self.residual_value = residual_value;
        self
    }

    /// Sets the nominal annual rate in percent.
    #[must_use]
    pub const fn with_annual_rate(mut self, annual_rate_percent: Decimal) -> Self {
        self.annual_rate_percent = Some(annual_rate_percent);
        self
    }

    /// Sets the period convention.
    #[must_use]
    pub const fn with_convention(mut self, convention: PeriodConvention) -> Self {
        self.period_convention = convention;
        self
    }

    /// Sets the payment frequency.
    #[must_use]
    pub const fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Sets the number of interest-only grace periods.
    #[must_use]
    pub const fn with_grace_periods(mut self, grace_periods: u32) -> Self {
        self.grace_periods = grace_periods;
        self
    }

    /// Frequency actually used for the schedule.
    #[must_use]
    pub fn effective_frequency(&self) -> PaymentFrequency {
        self.frequency
            .unwrap_or_else(|| self.method.default_frequency())
    }

    /// Amount the schedule must amortize in total.
    #[must_use]
    pub fn depreciable_amount(&self) -> Decimal {
        self.principal - self.residual_value
    }
}

/// Role of a period within its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Ordinary period.
    Regular,
    /// Interest-only period before amortization begins.
    Grace,
    /// Prorated partial period.
    Stub,
    /// Final period of an interest-only schedule, repaying the remaining balance.
    Balloon,
    /// Last period of the schedule.
    Final,
}

/// One period of a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    /// 1-based, contiguous index.
    pub period_index: u32,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive).
    pub period_end: NaiveDate,
    /// Balance before this period.
    pub beginning_balance: Decimal,
    /// Total cash paid or expense recognised in the period.
    pub payment_amount: Decimal,
    /// Interest for loans; equals `payment_amount` for depreciation.
    pub expense_or_interest_portion: Decimal,
    /// Amount by which the balance is reduced.
    pub principal_or_capital_portion: Decimal,
    /// Balance after this period.
    pub ending_balance: Decimal,
    /// Running sum of `principal_or_capital_portion` through this period.
    pub accumulated_to_date: Decimal,
    /// Role of the period.
    pub kind: PeriodKind,
}

/// A generated schedule together with the terms it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Opening balance.
    pub principal: Decimal,
    /// Balance floor.
    pub residual_value: Decimal,
    /// First day of period 1.
    pub start_date: NaiveDate,
    /// Method that produced the periods.
    pub method: AmortizationMethod,
    /// Ordered periods.
    pub periods: Vec<SchedulePeriod>,
}

impl Schedule {
    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if the schedule has no periods (method `none`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Sum of all principal/capital portions.
    pub fn total_principal(&self) -> Result<Decimal, AmortizationError> {
        self.checked_total(|p| p.principal_or_capital_portion, "total principal")
    }

    /// Sum of all interest/expense portions.
    pub fn total_interest(&self) -> Result<Decimal, AmortizationError> {
        self.checked_total(|p| p.expense_or_interest_portion, "total interest")
    }

    /// Sum of all payments.
    pub fn total_payment(&self) -> Result<Decimal, AmortizationError> {
        self.checked_total(|p| p.payment_amount, "total payment")
    }

    fn checked_total(
        &self,
        amount: impl Fn(&SchedulePeriod) -> Decimal,
        what: &'static str,
    ) -> Result<Decimal, AmortizationError> {
        self.periods.iter().try_fold(Decimal::ZERO, |total, period| {
            total
                .checked_add(amount(period))
                .ok_or(AmortizationError::ArithmeticOverflow(what))
        })
    }

    /// Last day of the final period.
    #[must_use]
    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.periods.last().map(|p| p.period_end)
    }

    /// Balance after the final period, or the principal if there are no periods.
    #[must_use]
    pub fn final_balance(&self) -> Decimal {
        self.periods
            .last()
            .map_or(self.principal, |p| p.ending_balance)
    }

    /// Aggregate figures for display and loan quotes.
    ///
    /// Always succeeds for schedules returned by the generator, which rejects
    /// requests whose totals overflow.
    pub fn summary(&self) -> Result<ScheduleSummary, AmortizationError> {
        Ok(ScheduleSummary {
            periods: self.periods.len(),
            total_payment: self.total_payment()?,
            total_interest: if self.method.is_loan() {
                self.total_interest()?
            } else {
                Decimal::ZERO
            },
            total_principal: self.total_principal()?,
            first_payment: self.periods.first().map(|p| p.payment_amount),
            last_payment: self.periods.last().map(|p| p.payment_amount),
            maturity_date: self.maturity_date(),
        })
    }
}

/// Aggregate figures of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Number of periods.
    pub periods: usize,
    /// Sum of all payments.
    pub total_payment: Decimal,
    /// Sum of interest (zero for depreciation schedules).
    pub total_interest: Decimal,
    /// Sum of principal/capital portions.
    pub total_principal: Decimal,
    /// Payment of period 1.
    pub first_payment: Option<Decimal>,
    /// Payment of the final period.
    pub last_payment: Option<Decimal>,
    /// Last day of the final period.
    pub maturity_date: Option<NaiveDate>,
}
