//! Stored schedule types.

use amortis_shared::types::{AssetId, LoanId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    AmortizationMethod, PeriodKind, PeriodRecord, Schedule, SchedulePeriod, Valuation,
    value_at_periods,
};

/// Which books a schedule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleBasis {
    /// Financial reporting schedule.
    Book,
    /// Separate tax depreciation schedule.
    Tax,
}

impl ScheduleBasis {
    /// Returns true for the tax basis.
    #[must_use]
    pub const fn is_tax(self) -> bool {
        matches!(self, Self::Tax)
    }
}

impl std::fmt::Display for ScheduleBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book => f.write_str("book"),
            Self::Tax => f.write_str("tax"),
        }
    }
}

/// Record a schedule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ScheduleOwner {
    /// Fixed asset depreciation schedule.
    Asset(AssetId),
    /// Loan repayment schedule.
    Loan(LoanId),
}

impl std::fmt::Display for ScheduleOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asset(id) => write!(f, "asset {id}"),
            Self::Loan(id) => write!(f, "loan {id}"),
        }
    }
}

/// Storage key: at most one schedule exists per owner and basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleKey {
    /// Owning record.
    pub owner: ScheduleOwner,
    /// Book or tax.
    pub basis: ScheduleBasis,
}

/// One persisted period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Owning record.
    pub owner: ScheduleOwner,
    /// True for rows of the tax schedule.
    pub is_tax_schedule: bool,
    /// 1-based period index.
    pub period_index: u32,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Opening balance.
    pub beginning_balance: Decimal,
    /// Payment or expense.
    pub payment_amount: Decimal,
    /// Interest or expense portion.
    pub expense_or_interest_portion: Decimal,
    /// Principal or capital portion.
    pub principal_or_capital_portion: Decimal,
    /// Closing balance.
    pub ending_balance: Decimal,
    /// Running total of principal or capital.
    pub accumulated_to_date: Decimal,
    /// Role of the period.
    pub kind: PeriodKind,
}

impl ScheduleRow {
    /// Row for a generated period.
    #[must_use]
    pub fn from_period(owner: ScheduleOwner, basis: ScheduleBasis, period: &SchedulePeriod) -> Self {
        Self {
            owner,
            is_tax_schedule: basis.is_tax(),
            period_index: period.period_index,
            period_start: period.period_start,
            period_end: period.period_end,
            beginning_balance: period.beginning_balance,
            payment_amount: period.payment_amount,
            expense_or_interest_portion: period.expense_or_interest_portion,
            principal_or_capital_portion: period.principal_or_capital_portion,
            ending_balance: period.ending_balance,
            accumulated_to_date: period.accumulated_to_date,
            kind: period.kind,
        }
    }

    /// Period this row was stored from.
    #[must_use]
    pub fn to_period(&self) -> SchedulePeriod {
        SchedulePeriod {
            period_index: self.period_index,
            period_start: self.period_start,
            period_end: self.period_end,
            beginning_balance: self.beginning_balance,
            payment_amount: self.payment_amount,
            expense_or_interest_portion: self.expense_or_interest_portion,
            principal_or_capital_portion: self.principal_or_capital_portion,
            ending_balance: self.ending_balance,
            accumulated_to_date: self.accumulated_to_date,
            kind: self.kind,
        }
    }
}

impl PeriodRecord for ScheduleRow {
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

/// A schedule as written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSchedule {
    /// Owning record.
    pub owner: ScheduleOwner,
    /// Book or tax.
    pub basis: ScheduleBasis,
    /// Method that produced the rows.
    pub method: AmortizationMethod,
    /// Opening balance.
    pub principal: Decimal,
    /// Balance floor.
    pub residual_value: Decimal,
    /// Rows ordered by period index.
    pub rows: Vec<ScheduleRow>,
}

impl StoredSchedule {
    /// Prepares a generated schedule for storage.
    #[must_use]
    pub fn from_schedule(owner: ScheduleOwner, basis: ScheduleBasis, schedule: &Schedule) -> Self {
        Self {
            owner,
            basis,
            method: schedule.method,
            principal: schedule.principal,
            residual_value: schedule.residual_value,
            rows: schedule
                .periods
                .iter()
                .map(|period| ScheduleRow::from_period(owner, basis, period))
                .collect(),
        }
    }

    /// Storage key.
    #[must_use]
    pub const fn key(&self) -> ScheduleKey {
        ScheduleKey {
            owner: self.owner,
            basis: self.basis,
        }
    }

    /// Stored periods in order.
    #[must_use]
    pub fn periods(&self) -> Vec<SchedulePeriod> {
        self.rows.iter().map(ScheduleRow::to_period).collect()
    }

    /// Values the stored rows as of `as_of` without regenerating anything.
    #[must_use]
    pub fn value_at(&self, as_of: NaiveDate) -> Valuation {
        value_at_periods(self.principal, &self.rows, as_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{AmortizationRequest, generate, value_at};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stored_schedule_values_like_generated() {
        let schedule = generate(&AmortizationRequest::new(
            dec!(5000.00),
            5,
            AmortizationMethod::double_declining(),
            date(2024, 1, 1),
        ))
        .unwrap();
        let owner = ScheduleOwner::Asset(AssetId::new());
        let stored = StoredSchedule::from_schedule(owner, ScheduleBasis::Tax, &schedule);

        assert!(stored.rows.iter().all(|row| row.is_tax_schedule));
        assert_eq!(stored.periods(), schedule.periods);
        for as_of in [date(2023, 6, 1), date(2025, 12, 31), date(2026, 1, 1), date(2035, 1, 1)] {
            assert_eq!(stored.value_at(as_of), value_at(&schedule, as_of));
        }
    }

    #[test]
    fn test_rows_and_periods_share_one_lookup() {
        let schedule = generate(
            &AmortizationRequest::new(
                dec!(1200.00),
                12,
                AmortizationMethod::StraightLine,
                date(2025, 1, 1),
            )
            .with_frequency(crate::amortization::PaymentFrequency::Monthly),
        )
        .unwrap();
        let stored = StoredSchedule::from_schedule(
            ScheduleOwner::Asset(AssetId::new()),
            ScheduleBasis::Book,
            &schedule,
        );

        // A partial slice of rows values the same as the matching periods.
        for as_of in [date(2024, 12, 31), date(2025, 3, 31), date(2025, 4, 15), date(2026, 6, 1)] {
            let from_rows = value_at_periods(stored.principal, &stored.rows[..6], as_of);
            let from_periods = value_at_periods(schedule.principal, &schedule.periods[..6], as_of);
            assert_eq!(from_rows, from_periods);
        }
        let mid = stored.value_at(date(2025, 4, 15));
        assert_eq!(mid.periods_elapsed, 3);
        assert_eq!(mid.accumulated_to_date, dec!(300.00));
    }

    #[test]
    fn test_owner_serializes_with_tag() {
        let id = LoanId::new();
        let json = serde_json::to_value(ScheduleOwner::Loan(id)).unwrap();
        assert_eq!(json["type"], "loan");
        assert_eq!(json["id"], id.to_string());
    }
}
