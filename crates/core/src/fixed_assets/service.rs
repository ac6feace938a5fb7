//! Asset registration and depreciation reporting.

use amortis_shared::types::money::is_money_scaled;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::types::{
    AssetLine, AssetRegisterReport, AssetRegisterRow, AssetRegisterTotals, AssetTerms,
    DepreciationReport, DepreciationRow, DisposalValuation, PlannedDisposal, RegisteredSchedules,
    UpcomingDisposalRow, UpcomingDisposalsReport,
};
use crate::amortization::generator::{add, sub};
use crate::amortization::{AmortizationError, AmortizationMethod, Schedule, ScheduleGenerator, value_at};

/// Generates the book schedule and, when enabled, the independent tax schedule.
///
/// Both requests are validated before either schedule is returned.
pub fn register_asset(
    generator: &ScheduleGenerator,
    terms: &AssetTerms,
) -> Result<RegisteredSchedules, AmortizationError> {
    let book_request = terms.book_request()?;
    let tax_request = terms.tax_request()?;

    let book = generator.generate(&book_request)?;
    let tax = tax_request
        .map(|request| generator.generate(&request))
        .transpose()?;

    debug!(
        book_periods = book.len(),
        tax_periods = tax.as_ref().map(Schedule::len),
        "registered asset schedules"
    );
    Ok(RegisteredSchedules { book, tax })
}

/// Depreciation recognised between `from` and `to`, both inclusive.
///
/// A period's expense is recognised on its `period_end`. Returns zero for an
/// empty or inverted range.
#[must_use]
pub fn depreciation_between(schedule: &Schedule, from: NaiveDate, to: NaiveDate) -> Decimal {
    if from > to {
        return Decimal::ZERO;
    }
    let closing = value_at(schedule, to).accumulated_to_date;
    let opening = from
        .pred_opt()
        .map_or(Decimal::ZERO, |day_before| {
            value_at(schedule, day_before).accumulated_to_date
        });
    closing - opening
}

/// Book value and gain or loss of disposing of an asset on `disposal_date`.
///
/// The book value is read from the schedule as of the disposal date, and the
/// gain or loss is `proceeds - costs - book_value`.
///
/// # Errors
///
/// Returns an error if:
/// - `proceeds` or `costs` is negative or not a whole number of cents
/// - The arithmetic overflows
pub fn disposal_gain_loss(
    schedule: &Schedule,
    disposal_date: NaiveDate,
    proceeds: Decimal,
    costs: Decimal,
) -> Result<DisposalValuation, AmortizationError> {
    for (field, value) in [("proceeds", proceeds), ("disposal_costs", costs)] {
        if value < Decimal::ZERO {
            return Err(AmortizationError::NegativeAmount { field, value });
        }
        if !is_money_scaled(value) {
            return Err(AmortizationError::NotMoneyScaled { field, value });
        }
    }

    let valuation = value_at(schedule, disposal_date);
    let net_proceeds = sub(proceeds, costs, "net proceeds")?;
    let gain_loss = sub(net_proceeds, valuation.current_balance, "disposal gain or loss")?;

    Ok(DisposalValuation {
        disposal_date,
        accumulated_depreciation: valuation.accumulated_to_date,
        book_value: valuation.current_balance,
        net_proceeds,
        gain_loss,
    })
}

/// Service for fixed asset reports.
pub struct AssetReportService;

impl AssetReportService {
    /// Asset register as of `as_of`.
    ///
    /// Assets whose depreciation starts after `as_of` are not listed.
    #[must_use]
    pub fn asset_register(lines: &[AssetLine], as_of: NaiveDate) -> AssetRegisterReport {
        let rows: Vec<AssetRegisterRow> = lines
            .iter()
            .filter(|line| line.schedule.start_date <= as_of)
            .map(|line| {
                let valuation = value_at(&line.schedule, as_of);
                AssetRegisterRow {
                    asset_id: line.asset_id,
                    name: line.name.clone(),
                    method: line.schedule.method,
                    cost: line.schedule.principal,
                    accumulated_depreciation: valuation.accumulated_to_date,
                    book_value: valuation.current_balance,
                }
            })
            .collect();

        let totals = rows
            .iter()
            .fold(AssetRegisterTotals::default(), |mut totals, row| {
                totals.asset_count += 1;
                totals.total_cost += row.cost;
                totals.total_accumulated_depreciation += row.accumulated_depreciation;
                totals.total_book_value += row.book_value;
                totals
            });

        AssetRegisterReport {
            as_of,
            rows,
            totals,
        }
    }

    /// Depreciation expense per asset between `from` and `to`, both inclusive.
    ///
    /// Assets that are not depreciated or have no expense in the range are omitted.
    #[must_use]
    pub fn depreciation_report(
        lines: &[AssetLine],
        from: NaiveDate,
        to: NaiveDate,
    ) -> DepreciationReport {
        let rows: Vec<DepreciationRow> = lines
            .iter()
            .filter(|line| line.schedule.method != AmortizationMethod::None)
            .filter_map(|line| {
                let expense = depreciation_between(&line.schedule, from, to);
                (expense > Decimal::ZERO).then(|| DepreciationRow {
                    asset_id: line.asset_id,
                    name: line.name.clone(),
                    method: line.schedule.method,
                    expense,
                })
            })
            .collect();
        let total_expense = rows.iter().map(|row| row.expense).sum();

        DepreciationReport {
            from,
            to,
            rows,
            total_expense,
        }
    }

    /// Assets expected to be disposed of between `as_of` and `until`, both inclusive.
    ///
    /// The estimated gain or loss compares the expected proceeds with the book
    /// value on `as_of`, not on the disposal date.
    ///
    /// # Errors
    ///
    /// Returns an error if an estimated value is invalid or the totals overflow.
    pub fn upcoming_disposals(
        planned: &[PlannedDisposal],
        as_of: NaiveDate,
        until: NaiveDate,
    ) -> Result<UpcomingDisposalsReport, AmortizationError> {
        let mut rows = planned
            .iter()
            .filter(|disposal| (as_of..=until).contains(&disposal.expected_date))
            .map(|disposal| {
                let estimate = disposal_gain_loss(
                    &disposal.line.schedule,
                    as_of,
                    disposal.estimated_value,
                    Decimal::ZERO,
                )?;
                Ok(UpcomingDisposalRow {
                    asset_id: disposal.line.asset_id,
                    name: disposal.line.name.clone(),
                    expected_date: disposal.expected_date,
                    current_book_value: estimate.book_value,
                    estimated_value: disposal.estimated_value,
                    estimated_gain_loss: estimate.gain_loss,
                })
            })
            .collect::<Result<Vec<_>, AmortizationError>>()?;
        rows.sort_by_key(|row| row.expected_date);

        let total_estimated_gain_loss = rows.iter().try_fold(Decimal::ZERO, |total, row| {
            add(total, row.estimated_gain_loss, "estimated gain or loss")
        })?;

        Ok(UpcomingDisposalsReport {
            as_of,
            until,
            rows,
            total_estimated_gain_loss,
        })
    }
}
