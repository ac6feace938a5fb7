//! Schedule generator.
//!
//! Generation is a pure function of the request: validate, lay out the
//! period dates, then walk the periods once with the method's policy. Every
//! policy finalizes each amount through `round_money` exactly once, and the
//! last period absorbs all rounding drift so the principal portions sum to
//! `principal - residual_value` to the cent.

use amortis_shared::EngineConfig;
use amortis_shared::types::money::is_money_scaled;
use rust_decimal::Decimal;
use tracing::debug;

use super::calendar::{self, PeriodSpan};
use super::depreciation::DepreciationPolicy;
use super::error::AmortizationError;
use super::loan::LoanPolicy;
use super::types::{
    AmortizationMethod, AmortizationRequest, PeriodConvention, PeriodKind, Schedule,
    SchedulePeriod,
};

/// Default longest term, in periods.
const DEFAULT_MAX_TERM_PERIODS: u32 = 600;

/// Default day count for prorating partial periods.
const DEFAULT_DAYS_IN_YEAR: u32 = 365;

/// Limits and day count used by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Longest term accepted, in periods.
    pub max_term_periods: u32,
    /// Denominator for `actual_days` proration.
    pub days_in_year: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            max_term_periods: DEFAULT_MAX_TERM_PERIODS,
            days_in_year: DEFAULT_DAYS_IN_YEAR,
        }
    }
}

impl From<&EngineConfig> for GeneratorSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_term_periods: config.max_term_periods,
            days_in_year: config.days_in_year,
        }
    }
}

/// Adds, reporting overflow as an invalid request.
pub(crate) fn add(
    left: Decimal,
    right: Decimal,
    what: &'static str,
) -> Result<Decimal, AmortizationError> {
    left.checked_add(right)
        .ok_or(AmortizationError::ArithmeticOverflow(what))
}

/// Subtracts, reporting overflow as an invalid request.
pub(crate) fn sub(
    left: Decimal,
    right: Decimal,
    what: &'static str,
) -> Result<Decimal, AmortizationError> {
    left.checked_sub(right)
        .ok_or(AmortizationError::ArithmeticOverflow(what))
}

/// Multiplies, reporting overflow as an invalid request.
pub(crate) fn mul(
    left: Decimal,
    right: Decimal,
    what: &'static str,
) -> Result<Decimal, AmortizationError> {
    left.checked_mul(right)
        .ok_or(AmortizationError::ArithmeticOverflow(what))
}

/// Divides, reporting overflow and division by zero as an invalid request.
pub(crate) fn div(
    left: Decimal,
    right: Decimal,
    what: &'static str,
) -> Result<Decimal, AmortizationError> {
    left.checked_div(right)
        .ok_or(AmortizationError::ArithmeticOverflow(what))
}

/// Portions of one period before they become a [`SchedulePeriod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Split {
    /// Depreciation: the expense is also the capital reduction.
    Expense(Decimal),
    /// Loan payment split into interest and principal.
    Loan {
        /// Interest portion.
        interest: Decimal,
        /// Principal portion.
        principal: Decimal,
    },
}

impl Split {
    fn principal(self) -> Decimal {
        match self {
            Self::Expense(amount) => amount,
            Self::Loan { principal, .. } => principal,
        }
    }

    fn expense_or_interest(self) -> Decimal {
        match self {
            Self::Expense(amount) => amount,
            Self::Loan { interest, .. } => interest,
        }
    }

    fn payment(self) -> Result<Decimal, AmortizationError> {
        match self {
            Self::Expense(amount) => Ok(amount),
            Self::Loan {
                interest,
                principal,
            } => add(interest, principal, "payment"),
        }
    }

    fn with_principal(self, principal: Decimal) -> Self {
        match self {
            Self::Expense(_) => Self::Expense(principal),
            Self::Loan { interest, .. } => Self::Loan {
                interest,
                principal,
            },
        }
    }
}

/// Per-method rules for splitting a period.
pub(crate) trait PeriodPolicy {
    /// Split for any period but the last.
    fn split(
        &self,
        index: u32,
        span: &PeriodSpan,
        beginning: Decimal,
    ) -> Result<Split, AmortizationError>;

    /// Split for the last period; its principal brings the balance to `floor`.
    fn close(
        &self,
        span: &PeriodSpan,
        beginning: Decimal,
        floor: Decimal,
    ) -> Result<Split, AmortizationError>;

    /// Kind of a period that is not the last.
    fn kind(&self, index: u32, span: &PeriodSpan) -> PeriodKind;

    /// Kind of the last period.
    fn closing_kind(&self) -> PeriodKind {
        PeriodKind::Final
    }
}

/// Generates amortization and depreciation schedules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleGenerator {
    settings: GeneratorSettings,
}

impl ScheduleGenerator {
    /// Creates a generator with explicit settings.
    #[must_use]
    pub const fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Creates a generator from the `engine` configuration section.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(GeneratorSettings::from(config))
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> GeneratorSettings {
        self.settings
    }

    /// Checks a request without generating anything.
    pub fn validate(&self, request: &AmortizationRequest) -> Result<(), AmortizationError> {
        if request.principal <= Decimal::ZERO {
            return Err(AmortizationError::NonPositivePrincipal(request.principal));
        }
        if !is_money_scaled(request.principal) {
            return Err(AmortizationError::NotMoneyScaled {
                field: "principal",
                value: request.principal,
            });
        }
        if request.residual_value < Decimal::ZERO {
            return Err(AmortizationError::NegativeResidual(request.residual_value));
        }
        if !is_money_scaled(request.residual_value) {
            return Err(AmortizationError::NotMoneyScaled {
                field: "residual_value",
                value: request.residual_value,
            });
        }
        if request.residual_value >= request.principal {
            return Err(AmortizationError::ResidualNotBelowPrincipal {
                principal: request.principal,
                residual: request.residual_value,
            });
        }
        if request.term_periods == 0 {
            return Err(AmortizationError::ZeroTerm);
        }
        if request.term_periods > self.settings.max_term_periods {
            return Err(AmortizationError::TermTooLong {
                term: request.term_periods,
                max: self.settings.max_term_periods,
            });
        }
        if let AmortizationMethod::DecliningBalance { multiplier } = request.method {
            if multiplier <= Decimal::ZERO {
                return Err(AmortizationError::InvalidMultiplier(multiplier));
            }
        }
        match request.annual_rate_percent {
            None if request.method.requires_rate() => {
                return Err(AmortizationError::MissingRate(request.method.name()));
            }
            Some(rate) if rate < Decimal::ZERO => {
                return Err(AmortizationError::NegativeRate(rate));
            }
            _ => {}
        }
        if request.method.uses_depreciation_rate()
            && let Some(rate) = request.annual_rate_percent
            && (rate <= Decimal::ZERO || rate > Decimal::ONE_HUNDRED)
        {
            return Err(AmortizationError::InvalidDepreciationRate(rate));
        }
        if request.grace_periods > 0 {
            if !request.method.is_loan() {
                return Err(AmortizationError::GraceNotSupported(request.method.name()));
            }
            if request.grace_periods >= request.term_periods {
                return Err(AmortizationError::GraceNotBelowTerm {
                    grace: request.grace_periods,
                    term: request.term_periods,
                });
            }
        }
        if self.settings.days_in_year == 0 {
            return Err(AmortizationError::ArithmeticOverflow("days in year"));
        }
        Ok(())
    }

    /// Generates the full schedule for a request.
    ///
    /// The result is deterministic: identical requests yield identical schedules.
    pub fn generate(&self, request: &AmortizationRequest) -> Result<Schedule, AmortizationError> {
        self.validate(request)?;
        let spans = Self::layout(request)?;

        let periods = match request.method {
            AmortizationMethod::None => Vec::new(),
            AmortizationMethod::FullAtStart
            | AmortizationMethod::StraightLine
            | AmortizationMethod::DecliningBalance { .. } => {
                let policy = DepreciationPolicy::new(request, self.settings.days_in_year)?;
                walk(&policy, request, &spans)?
            }
            AmortizationMethod::EqualPayment
            | AmortizationMethod::EqualPrincipal
            | AmortizationMethod::InterestOnlyBalloon => {
                let policy = LoanPolicy::new(request)?;
                walk(&policy, request, &spans)?
            }
        };

        let schedule = Schedule {
            principal: request.principal,
            residual_value: request.residual_value,
            start_date: request.start_date,
            method: request.method,
            periods,
        };
        // Totals must fit too, so every generated schedule can be summarized.
        let summary = schedule.summary()?;
        debug!(
            method = %request.method,
            periods = summary.periods,
            total_principal = %summary.total_principal,
            total_payment = %summary.total_payment,
            "generated amortization schedule"
        );
        Ok(schedule)
    }

    /// Period dates for a request.
    ///
    /// Depreciation under `actual_days` that starts off a calendar boundary is
    /// laid out with leading and trailing stubs; loans are always anchored on
    /// their start date.
    fn layout(request: &AmortizationRequest) -> Result<Vec<PeriodSpan>, AmortizationError> {
        let frequency = request.effective_frequency();
        match request.method {
            AmortizationMethod::None => Ok(Vec::new()),
            AmortizationMethod::FullAtStart => Ok(vec![PeriodSpan {
                start: request.start_date,
                end: request.start_date,
                stub: false,
            }]),
            _ if uses_calendar_layout(request) => {
                calendar::calendar_aligned_spans(request.start_date, frequency, request.term_periods)
            }
            _ => calendar::anchored_spans(request.start_date, frequency, request.term_periods),
        }
    }
}

/// Returns true if the request is laid out on calendar boundaries with stubs
/// rather than anchored on its start date.
pub(crate) fn uses_calendar_layout(request: &AmortizationRequest) -> bool {
    !request.method.is_loan()
        && request.period_convention == PeriodConvention::ActualDays
        && !calendar::is_period_boundary(request.start_date, request.effective_frequency())
}

/// Generates a schedule with default settings.
pub fn generate(request: &AmortizationRequest) -> Result<Schedule, AmortizationError> {
    ScheduleGenerator::default().generate(request)
}

/// Walks the spans, chaining balances and enforcing the residual floor.
fn walk(
    policy: &impl PeriodPolicy,
    request: &AmortizationRequest,
    spans: &[PeriodSpan],
) -> Result<Vec<SchedulePeriod>, AmortizationError> {
    let floor = request.residual_value;
    let last = spans.len().saturating_sub(1);

    let mut periods = Vec::with_capacity(spans.len());
    let mut balance = request.principal;
    let mut accumulated = Decimal::ZERO;

    for (position, span) in spans.iter().enumerate() {
        let index = u32::try_from(position + 1)
            .map_err(|_| AmortizationError::ArithmeticOverflow("period index"))?;
        let is_last = position == last;

        let (mut split, mut kind) = if is_last {
            (policy.close(span, balance, floor)?, policy.closing_kind())
        } else {
            (policy.split(index, span, balance)?, policy.kind(index, span))
        };

        let headroom = balance - floor;
        if split.principal() > headroom {
            debug!(
                period = index,
                computed = %split.principal(),
                clamped = %headroom,
                "residual floor reached, ending schedule early"
            );
            split = split.with_principal(headroom);
        }

        let ending = balance - split.principal();
        accumulated += split.principal();
        if ending == floor {
            kind = policy.closing_kind();
        }

        periods.push(period_row(index, span, balance, split, ending, accumulated, kind)?);
        balance = ending;

        if balance == floor {
            break;
        }
    }

    Ok(periods)
}

fn period_row(
    index: u32,
    span: &PeriodSpan,
    beginning: Decimal,
    split: Split,
    ending: Decimal,
    accumulated: Decimal,
    kind: PeriodKind,
) -> Result<SchedulePeriod, AmortizationError> {
    Ok(SchedulePeriod {
        period_index: index,
        period_start: span.start,
        period_end: span.end,
        beginning_balance: beginning,
        payment_amount: split.payment()?,
        expense_or_interest_portion: split.expense_or_interest(),
        principal_or_capital_portion: split.principal(),
        ending_balance: ending,
        accumulated_to_date: accumulated,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::amortization::types::PaymentFrequency;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(principal: Decimal, term: u32, method: AmortizationMethod) -> AmortizationRequest {
        AmortizationRequest::new(principal, term, method, date(2025, 1, 1))
    }

    fn assert_invariants(schedule: &Schedule) {
        let expected_total = schedule.principal - schedule.residual_value;
        assert_eq!(schedule.total_principal().unwrap(), expected_total);
        assert_eq!(schedule.periods[0].beginning_balance, schedule.principal);
        for pair in schedule.periods.windows(2) {
            assert_eq!(pair[0].ending_balance, pair[1].beginning_balance);
            assert_eq!(pair[0].period_index + 1, pair[1].period_index);
            assert_eq!(pair[0].period_end.succ_opt().unwrap(), pair[1].period_start);
        }
        for period in &schedule.periods {
            assert_eq!(
                period.ending_balance,
                period.beginning_balance - period.principal_or_capital_portion
            );
            assert!(period.ending_balance >= schedule.residual_value);
        }
        assert_eq!(schedule.final_balance(), schedule.residual_value);
    }

    #[test]
    fn test_straight_line_even_split() {
        let schedule = generate(&request(dec!(12000.00), 12, AmortizationMethod::StraightLine))
            .unwrap();

        assert_eq!(schedule.len(), 12);
        for period in &schedule.periods {
            assert_eq!(period.principal_or_capital_portion, dec!(1000.00));
            assert_eq!(period.payment_amount, dec!(1000.00));
            assert_eq!(period.expense_or_interest_portion, dec!(1000.00));
        }
        assert_eq!(schedule.final_balance(), dec!(0.00));
        assert_eq!(schedule.periods[11].accumulated_to_date, dec!(12000.00));
        assert_eq!(schedule.periods[11].kind, PeriodKind::Final);
        assert_eq!(schedule.periods[0].kind, PeriodKind::Regular);
        // Annual periods by default for depreciation.
        assert_eq!(schedule.periods[0].period_end, date(2025, 12, 31));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_straight_line_last_period_absorbs_rounding() {
        let schedule =
            generate(&request(dec!(1000.00), 3, AmortizationMethod::StraightLine)).unwrap();

        assert_eq!(schedule.periods[0].principal_or_capital_portion, dec!(333.33));
        assert_eq!(schedule.periods[1].principal_or_capital_portion, dec!(333.33));
        assert_eq!(schedule.periods[2].principal_or_capital_portion, dec!(333.34));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_straight_line_tiny_amount_ends_early_at_floor() {
        // 0.06 / 4 = 0.015 rounds to 0.02, so the floor is hit after three periods.
        let schedule = generate(
            &request(dec!(100.06), 4, AmortizationMethod::StraightLine)
                .with_residual_value(dec!(100.00)),
        )
        .unwrap();

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.periods[2].kind, PeriodKind::Final);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_double_declining_with_residual() {
        let schedule = generate(
            &request(dec!(10000.00), 5, AmortizationMethod::double_declining())
                .with_residual_value(dec!(1000.00)),
        )
        .unwrap();

        let portions: Vec<Decimal> = schedule
            .periods
            .iter()
            .map(|p| p.principal_or_capital_portion)
            .collect();
        assert_eq!(
            portions,
            vec![dec!(4000.00), dec!(2400.00), dec!(1440.00), dec!(864.00), dec!(296.00)]
        );
        assert_eq!(schedule.periods[1].beginning_balance, dec!(6000.00));
        assert_eq!(schedule.final_balance(), dec!(1000.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_declining_terminates_early_at_residual_floor() {
        let schedule = generate(
            &request(dec!(10000.00), 5, AmortizationMethod::double_declining())
                .with_residual_value(dec!(5000.00)),
        )
        .unwrap();

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.periods[1].principal_or_capital_portion, dec!(1000.00));
        assert_eq!(schedule.periods[1].kind, PeriodKind::Final);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_declining_without_residual_writes_off_in_last_period() {
        let schedule =
            generate(&request(dec!(10000.00), 5, AmortizationMethod::double_declining()))
                .unwrap();

        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule.periods[4].principal_or_capital_portion, dec!(1296.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_declining_150() {
        let schedule =
            generate(&request(dec!(9000.00), 10, AmortizationMethod::declining_balance_150()))
                .unwrap();

        assert_eq!(schedule.periods[0].principal_or_capital_portion, dec!(1350.00));
        assert_eq!(schedule.periods[1].principal_or_capital_portion, dec!(1147.50));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_straight_line_annual_rate_caps_at_term() {
        // 30% of cost a year; the fourth year only has 1,000 left.
        let schedule = generate(
            &request(dec!(10000.00), 4, AmortizationMethod::StraightLine)
                .with_annual_rate(dec!(30)),
        )
        .unwrap();

        let portions: Vec<Decimal> = schedule
            .periods
            .iter()
            .map(|p| p.principal_or_capital_portion)
            .collect();
        assert_eq!(
            portions,
            vec![dec!(3000.00), dec!(3000.00), dec!(3000.00), dec!(1000.00)]
        );
        assert_invariants(&schedule);
    }

    #[test]
    fn test_straight_line_monthly_rate() {
        let schedule = generate(
            &request(dec!(12000.00), 60, AmortizationMethod::StraightLine)
                .with_annual_rate(dec!(20))
                .with_frequency(PaymentFrequency::Monthly),
        )
        .unwrap();

        assert_eq!(schedule.len(), 60);
        assert_eq!(schedule.periods[0].principal_or_capital_portion, dec!(200.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_declining_balance_annual_rate() {
        // 40% of the opening balance; the multiplier is ignored.
        let schedule = generate(
            &request(dec!(10000.00), 3, AmortizationMethod::double_declining())
                .with_annual_rate(dec!(40)),
        )
        .unwrap();

        assert_eq!(schedule.periods[0].principal_or_capital_portion, dec!(4000.00));
        assert_eq!(schedule.periods[1].principal_or_capital_portion, dec!(2400.00));
        assert_eq!(schedule.periods[2].principal_or_capital_portion, dec!(3600.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_full_at_start() {
        let schedule =
            generate(&request(dec!(500.00), 1, AmortizationMethod::FullAtStart)).unwrap();

        assert_eq!(schedule.len(), 1);
        let period = &schedule.periods[0];
        assert_eq!(period.principal_or_capital_portion, dec!(500.00));
        assert_eq!(period.period_start, date(2025, 1, 1));
        assert_eq!(period.period_end, date(2025, 1, 1));
        assert_eq!(period.kind, PeriodKind::Final);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_none_is_empty() {
        let schedule = generate(&request(dec!(500.00), 5, AmortizationMethod::None)).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.final_balance(), dec!(500.00));
    }

    #[test]
    fn test_actual_days_prorates_stubs() {
        let schedule = generate(
            &AmortizationRequest::new(
                dec!(12000.00),
                12,
                AmortizationMethod::StraightLine,
                date(2025, 1, 15),
            )
            .with_frequency(PaymentFrequency::Monthly)
            .with_convention(PeriodConvention::ActualDays),
        )
        .unwrap();

        assert_eq!(schedule.len(), 13);
        // 12,000 a year * 17 days / 365
        assert_eq!(schedule.periods[0].principal_or_capital_portion, dec!(558.90));
        assert_eq!(schedule.periods[0].kind, PeriodKind::Stub);
        assert_eq!(schedule.periods[1].principal_or_capital_portion, dec!(1000.00));
        assert_eq!(schedule.periods[12].principal_or_capital_portion, dec!(441.10));
        assert_eq!(schedule.periods[12].period_end, date(2026, 1, 14));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_actual_days_aligned_start_has_no_stubs() {
        let schedule = generate(
            &request(dec!(12000.00), 12, AmortizationMethod::StraightLine)
                .with_frequency(PaymentFrequency::Monthly)
                .with_convention(PeriodConvention::ActualDays),
        )
        .unwrap();

        assert_eq!(schedule.len(), 12);
        assert!(schedule.periods.iter().all(|p| p.kind != PeriodKind::Stub));
    }

    #[test]
    fn test_equal_payment_loan() {
        let schedule = generate(
            &request(dec!(10000.00), 12, AmortizationMethod::EqualPayment)
                .with_annual_rate(dec!(12)),
        )
        .unwrap();

        assert_eq!(schedule.len(), 12);
        let first = &schedule.periods[0];
        assert_eq!(first.expense_or_interest_portion, dec!(100.00));
        assert_eq!(first.payment_amount, dec!(888.49));
        assert_eq!(first.principal_or_capital_portion, dec!(788.49));
        assert_eq!(first.period_end, date(2025, 1, 31));
        for period in &schedule.periods[..11] {
            assert_eq!(period.payment_amount, dec!(888.49));
        }
        assert_eq!(schedule.final_balance(), dec!(0.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_equal_payment_zero_rate() {
        let schedule = generate(
            &request(dec!(1200.00), 12, AmortizationMethod::EqualPayment)
                .with_annual_rate(Decimal::ZERO),
        )
        .unwrap();

        assert!(schedule.periods.iter().all(|p| p.payment_amount == dec!(100.00)));
        assert_eq!(schedule.total_interest().unwrap(), Decimal::ZERO);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_equal_principal_loan() {
        let schedule = generate(
            &request(dec!(12000.00), 12, AmortizationMethod::EqualPrincipal)
                .with_annual_rate(dec!(12)),
        )
        .unwrap();

        assert!(schedule
            .periods
            .iter()
            .all(|p| p.principal_or_capital_portion == dec!(1000.00)));
        assert_eq!(schedule.periods[0].payment_amount, dec!(1120.00));
        assert_eq!(schedule.periods[1].payment_amount, dec!(1110.00));
        assert_eq!(schedule.periods[11].payment_amount, dec!(1010.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_interest_only_balloon() {
        let schedule = generate(
            &request(dec!(50000.00), 6, AmortizationMethod::InterestOnlyBalloon)
                .with_annual_rate(dec!(6)),
        )
        .unwrap();

        for period in &schedule.periods[..5] {
            assert_eq!(period.principal_or_capital_portion, Decimal::ZERO);
            assert_eq!(period.payment_amount, dec!(250.00));
            assert_eq!(period.kind, PeriodKind::Regular);
        }
        let balloon = &schedule.periods[5];
        assert_eq!(balloon.principal_or_capital_portion, dec!(50000.00));
        assert_eq!(balloon.payment_amount, dec!(50250.00));
        assert_eq!(balloon.kind, PeriodKind::Balloon);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_grace_periods_are_interest_only() {
        let schedule = generate(
            &request(dec!(12000.00), 12, AmortizationMethod::EqualPrincipal)
                .with_annual_rate(dec!(12))
                .with_grace_periods(2),
        )
        .unwrap();

        assert_eq!(schedule.periods[0].kind, PeriodKind::Grace);
        assert_eq!(schedule.periods[1].principal_or_capital_portion, Decimal::ZERO);
        assert_eq!(schedule.periods[1].payment_amount, dec!(120.00));
        assert_eq!(schedule.periods[2].principal_or_capital_portion, dec!(1200.00));
        assert_eq!(schedule.len(), 12);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_loan_with_balloon_residual() {
        let schedule = generate(
            &request(dec!(20000.00), 24, AmortizationMethod::EqualPayment)
                .with_annual_rate(dec!(7.5))
                .with_residual_value(dec!(5000.00)),
        )
        .unwrap();

        assert_eq!(schedule.final_balance(), dec!(5000.00));
        assert_invariants(&schedule);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let req = request(dec!(25000.00), 36, AmortizationMethod::EqualPayment)
            .with_annual_rate(dec!(9.9));
        let first = generate(&req).unwrap();
        let second = generate(&req).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[rstest]
    #[case(request(dec!(0), 5, AmortizationMethod::StraightLine), "NON_POSITIVE_PRINCIPAL")]
    #[case(request(dec!(-1), 5, AmortizationMethod::StraightLine), "NON_POSITIVE_PRINCIPAL")]
    #[case(
        request(dec!(100), 5, AmortizationMethod::StraightLine).with_residual_value(dec!(100)),
        "RESIDUAL_NOT_BELOW_PRINCIPAL"
    )]
    #[case(
        request(dec!(100), 5, AmortizationMethod::StraightLine).with_residual_value(dec!(-1)),
        "NEGATIVE_RESIDUAL"
    )]
    #[case(request(dec!(100), 0, AmortizationMethod::StraightLine), "ZERO_TERM")]
    #[case(request(dec!(100), 601, AmortizationMethod::StraightLine), "TERM_TOO_LONG")]
    #[case(request(dec!(100), 12, AmortizationMethod::EqualPayment), "MISSING_RATE")]
    #[case(
        request(dec!(100), 12, AmortizationMethod::EqualPrincipal).with_annual_rate(dec!(-1)),
        "NEGATIVE_RATE"
    )]
    #[case(
        request(dec!(100), 5, AmortizationMethod::DecliningBalance { multiplier: dec!(0) }),
        "INVALID_MULTIPLIER"
    )]
    #[case(
        request(dec!(100), 5, AmortizationMethod::StraightLine).with_grace_periods(1),
        "GRACE_NOT_SUPPORTED"
    )]
    #[case(
        request(dec!(100), 5, AmortizationMethod::EqualPayment)
            .with_annual_rate(dec!(5))
            .with_grace_periods(5),
        "GRACE_NOT_BELOW_TERM"
    )]
    #[case(request(dec!(100.005), 2, AmortizationMethod::StraightLine), "NOT_MONEY_SCALED")]
    #[case(
        request(dec!(100), 2, AmortizationMethod::StraightLine).with_residual_value(dec!(10.001)),
        "NOT_MONEY_SCALED"
    )]
    #[case(
        request(dec!(100), 5, AmortizationMethod::StraightLine).with_annual_rate(dec!(0)),
        "INVALID_DEPRECIATION_RATE"
    )]
    #[case(
        request(dec!(100), 5, AmortizationMethod::double_declining()).with_annual_rate(dec!(150)),
        "INVALID_DEPRECIATION_RATE"
    )]
    fn test_invalid_requests(#[case] req: AmortizationRequest, #[case] code: &str) {
        let err = generate(&req).unwrap_err();
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_configured_term_limit() {
        let generator = ScheduleGenerator::new(GeneratorSettings {
            max_term_periods: 24,
            ..GeneratorSettings::default()
        });
        let err = generator
            .generate(&request(dec!(100), 25, AmortizationMethod::StraightLine))
            .unwrap_err();
        assert_eq!(err, AmortizationError::TermTooLong { term: 25, max: 24 });
    }

    #[test]
    fn test_overflow_becomes_invalid_request() {
        let err = generate(
            &request(Decimal::MAX, 12, AmortizationMethod::EqualPayment)
                .with_annual_rate(dec!(50)),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "ARITHMETIC_OVERFLOW");
    }

    #[test]
    fn test_balloon_payment_overflow_is_an_error() {
        // Interest plus the balloon repayment does not fit in a Decimal.
        let err = generate(
            &request(Decimal::MAX - Decimal::ONE, 2, AmortizationMethod::InterestOnlyBalloon)
                .with_annual_rate(dec!(12)),
        )
        .unwrap_err();
        assert_eq!(err, AmortizationError::ArithmeticOverflow("payment"));
    }

    #[test]
    fn test_total_payment_overflow_is_an_error() {
        // Each payment fits, their sum does not.
        let err = generate(
            &request(Decimal::MAX - Decimal::ONE, 2, AmortizationMethod::EqualPrincipal)
                .with_annual_rate(dec!(12)),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "ARITHMETIC_OVERFLOW");
    }

    #[test]
    fn test_sub_cent_principal_is_rejected_not_carried() {
        let err = generate(&request(dec!(100.005), 2, AmortizationMethod::StraightLine))
            .unwrap_err();
        assert_eq!(
            err,
            AmortizationError::NotMoneyScaled {
                field: "principal",
                value: dec!(100.005),
            }
        );

        // Whole cents with trailing zeros are fine.
        let schedule =
            generate(&request(dec!(100.010), 2, AmortizationMethod::StraightLine)).unwrap();
        assert_eq!(schedule.periods[1].ending_balance, Decimal::ZERO);
    }
}
