//! Property-based tests for the schedule generator.
//!
//! - Property 1: Conservation of principal
//! - Property 2: Balance chaining and contiguous periods
//! - Property 3: Residual floor
//! - Property 4: Two-decimal amounts
//! - Property 5: Deterministic generation

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::generator::generate;
use super::types::{
    AmortizationMethod, AmortizationRequest, PaymentFrequency, PeriodConvention, PeriodKind,
    Schedule,
};
use amortis_shared::types::money::{is_money_scaled, within_rounding_unit};

/// Strategy for principals between 100.00 and 5,000,000.00.
fn principal() -> impl Strategy<Value = Decimal> {
    (10_000i64..500_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Residual as a share (0-60%) of the principal, rounded to cents.
fn residual_share() -> impl Strategy<Value = Decimal> {
    (0i64..=60i64).prop_map(|pct| Decimal::new(pct, 2))
}

/// Annual rates from 0.00% to 25.00%.
fn annual_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=2_500i64).prop_map(|bp| Decimal::new(bp, 2))
}

fn start_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=12, 1u32..=31).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .or_else(|| NaiveDate::from_ymd_opt(y, m, 28))
            .unwrap()
    })
}

fn frequency() -> impl Strategy<Value = PaymentFrequency> {
    prop_oneof![
        Just(PaymentFrequency::Weekly),
        Just(PaymentFrequency::BiWeekly),
        Just(PaymentFrequency::Monthly),
        Just(PaymentFrequency::Quarterly),
        Just(PaymentFrequency::Annual),
    ]
}

fn depreciation_method() -> impl Strategy<Value = AmortizationMethod> {
    prop_oneof![
        Just(AmortizationMethod::StraightLine),
        Just(AmortizationMethod::declining_balance_150()),
        Just(AmortizationMethod::double_declining()),
        (10i64..=30i64).prop_map(|m| AmortizationMethod::DecliningBalance {
            multiplier: Decimal::new(m, 1)
        }),
    ]
}

fn loan_method() -> impl Strategy<Value = AmortizationMethod> {
    prop_oneof![
        Just(AmortizationMethod::EqualPayment),
        Just(AmortizationMethod::EqualPrincipal),
        Just(AmortizationMethod::InterestOnlyBalloon),
    ]
}

fn convention() -> impl Strategy<Value = PeriodConvention> {
    prop_oneof![
        Just(PeriodConvention::FullPeriod),
        Just(PeriodConvention::ActualDays)
    ]
}

prop_compose! {
    fn depreciation_request()(
        principal in principal(),
        share in residual_share(),
        term in 1u32..=60,
        method in depreciation_method(),
        frequency in frequency(),
        convention in convention(),
        start in start_date(),
    ) -> AmortizationRequest {
        let residual = (principal * share).round_dp(2);
        AmortizationRequest::new(principal, term, method, start)
            .with_residual_value(residual)
            .with_frequency(frequency)
            .with_convention(convention)
    }
}

prop_compose! {
    fn loan_request()(
        principal in principal(),
        share in residual_share(),
        term in 1u32..=360,
        grace_seed in 0u32..12,
        method in loan_method(),
        rate in annual_rate(),
        frequency in frequency(),
        start in start_date(),
    ) -> AmortizationRequest {
        let residual = (principal * share).round_dp(2);
        AmortizationRequest::new(principal, term, method, start)
            .with_residual_value(residual)
            .with_annual_rate(rate)
            .with_frequency(frequency)
            .with_grace_periods(grace_seed % term)
    }
}

fn any_request() -> impl Strategy<Value = AmortizationRequest> {
    prop_oneof![depreciation_request(), loan_request()]
}

fn check_conservation(schedule: &Schedule) -> Result<(), TestCaseError> {
    prop_assert_eq!(
        schedule.total_principal().unwrap(),
        schedule.principal - schedule.residual_value
    );
    prop_assert_eq!(schedule.final_balance(), schedule.residual_value);
    Ok(())
}

proptest! {
    /// Property 1: Conservation of principal
    /// Principal portions sum to principal - residual_value exactly.
    #[test]
    fn test_conservation(request in any_request()) {
        let schedule = generate(&request).unwrap();
        check_conservation(&schedule)?;
        prop_assert!(schedule.len() <= request.term_periods as usize + 1);
    }

    /// Property 2: Balance chaining and contiguous periods
    /// ending[i] == beginning[i+1], ending == beginning - principal portion,
    /// and period dates tile the term with no gap or overlap.
    #[test]
    fn test_balance_chaining(request in any_request()) {
        let schedule = generate(&request).unwrap();
        prop_assert_eq!(schedule.periods[0].beginning_balance, request.principal);
        prop_assert_eq!(schedule.periods[0].period_start, request.start_date);

        let mut accumulated = Decimal::ZERO;
        for (i, period) in schedule.periods.iter().enumerate() {
            prop_assert_eq!(period.period_index as usize, i + 1);
            prop_assert!(period.period_start <= period.period_end);
            prop_assert_eq!(
                period.ending_balance,
                period.beginning_balance - period.principal_or_capital_portion
            );
            accumulated += period.principal_or_capital_portion;
            prop_assert_eq!(period.accumulated_to_date, accumulated);
        }
        for pair in schedule.periods.windows(2) {
            prop_assert_eq!(pair[0].ending_balance, pair[1].beginning_balance);
            prop_assert_eq!(pair[0].period_end.succ_opt().unwrap(), pair[1].period_start);
        }
    }

    /// Property 3: Residual floor
    /// No balance falls below residual_value and no portion is negative.
    #[test]
    fn test_residual_floor(request in any_request()) {
        let schedule = generate(&request).unwrap();
        for period in &schedule.periods {
            prop_assert!(period.ending_balance >= request.residual_value);
            prop_assert!(period.principal_or_capital_portion >= Decimal::ZERO);
            prop_assert!(period.expense_or_interest_portion >= Decimal::ZERO);
        }
        let last = schedule.periods.last().unwrap();
        prop_assert!(matches!(last.kind, PeriodKind::Final | PeriodKind::Balloon));
        prop_assert!(within_rounding_unit(last.ending_balance, request.residual_value));
    }

    /// Property 4: Two-decimal amounts
    /// Every emitted amount is already rounded to cents.
    #[test]
    fn test_amounts_are_money_scaled(request in any_request()) {
        let schedule = generate(&request).unwrap();
        for period in &schedule.periods {
            prop_assert!(is_money_scaled(period.payment_amount));
            prop_assert!(is_money_scaled(period.expense_or_interest_portion));
            prop_assert!(is_money_scaled(period.principal_or_capital_portion));
            prop_assert!(is_money_scaled(period.ending_balance));
        }
    }

    /// Property 5: Deterministic generation
    /// Generating twice yields identical schedules.
    #[test]
    fn test_generation_is_deterministic(request in any_request()) {
        prop_assert_eq!(generate(&request).unwrap(), generate(&request).unwrap());
    }

    /// Property 1: Conservation of principal
    /// Equal-payment loans keep a level payment until the final period.
    #[test]
    fn test_equal_payment_is_level(
        principal in principal(),
        term in 2u32..=120,
        rate in annual_rate(),
        start in start_date(),
    ) {
        let request = AmortizationRequest::new(principal, term, AmortizationMethod::EqualPayment, start)
            .with_annual_rate(rate);
        let schedule = generate(&request).unwrap();
        check_conservation(&schedule)?;

        let first = schedule.periods[0].payment_amount;
        for period in &schedule.periods[..schedule.len() - 1] {
            prop_assert_eq!(period.payment_amount, first);
        }
    }
}
