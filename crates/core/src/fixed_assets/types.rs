//! Fixed asset terms and report types.

use amortis_shared::types::AssetId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    AmortizationError, AmortizationMethod, AmortizationRequest, PaymentFrequency,
    PeriodConvention, Schedule,
};

/// How the depreciation pace of an asset is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DepreciationBasis {
    /// Depreciate over a number of years.
    UsefulLife {
        /// Useful life in years.
        years: u32,
    },
    /// Depreciate a fixed percentage a year.
    ///
    /// Straight-line expenses `percent` of the cost each year, declining
    /// balance `percent` of the opening balance. The schedule runs for at most
    /// `ceil(100 / percent)` years.
    AnnualRate {
        /// Annual rate in percent, in `(0, 100]`.
        percent: Decimal,
    },
}

impl DepreciationBasis {
    /// Number of years the schedule may run.
    fn years(self) -> Result<u32, AmortizationError> {
        match self {
            Self::UsefulLife { years } => Ok(years),
            Self::AnnualRate { percent } => {
                if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                    return Err(AmortizationError::InvalidDepreciationRate(percent));
                }
                Decimal::ONE_HUNDRED
                    .checked_div(percent)
                    .and_then(|years| years.ceil().to_u32())
                    .ok_or(AmortizationError::ArithmeticOverflow("asset term"))
            }
        }
    }

    const fn rate(self) -> Option<Decimal> {
        match self {
            Self::UsefulLife { .. } => None,
            Self::AnnualRate { percent } => Some(percent),
        }
    }
}

/// Separate depreciation rules used for the tax books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTreatment {
    /// Tax depreciation method.
    pub method: AmortizationMethod,
    /// Tax depreciation pace.
    pub basis: DepreciationBasis,
}

impl TaxTreatment {
    /// Tax depreciation over a useful life.
    #[must_use]
    pub const fn useful_life(method: AmortizationMethod, years: u32) -> Self {
        Self {
            method,
            basis: DepreciationBasis::UsefulLife { years },
        }
    }

    /// Tax depreciation at an annual rate.
    #[must_use]
    pub const fn annual_rate(method: AmortizationMethod, percent: Decimal) -> Self {
        Self {
            method,
            basis: DepreciationBasis::AnnualRate { percent },
        }
    }
}

/// Depreciation terms of a fixed asset, captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTerms {
    /// Purchase cost.
    pub cost: Decimal,
    /// Expected value at the end of the useful life.
    #[serde(default)]
    pub residual_value: Decimal,
    /// Book depreciation pace.
    pub basis: DepreciationBasis,
    /// Book depreciation method.
    pub method: AmortizationMethod,
    /// Partial period handling.
    #[serde(default)]
    pub convention: PeriodConvention,
    /// First day of depreciation.
    pub depreciation_start: NaiveDate,
    /// Depreciation period length; annual when omitted.
    #[serde(default)]
    pub frequency: Option<PaymentFrequency>,
    /// Separate tax depreciation, if enabled.
    #[serde(default)]
    pub tax: Option<TaxTreatment>,
}

impl AssetTerms {
    /// Creates terms with no residual, full-period convention and annual periods.
    #[must_use]
    pub const fn new(
        cost: Decimal,
        useful_life_years: u32,
        method: AmortizationMethod,
        depreciation_start: NaiveDate,
    ) -> Self {
        Self {
            cost,
            residual_value: Decimal::ZERO,
            basis: DepreciationBasis::UsefulLife {
                years: useful_life_years,
            },
            method,
            convention: PeriodConvention::FullPeriod,
            depreciation_start,
            frequency: None,
            tax: None,
        }
    }

    /// Depreciates the book schedule at an annual rate instead of over a useful life.
    #[must_use]
    pub const fn with_annual_rate(mut self, percent: Decimal) -> Self {
        self.basis = DepreciationBasis::AnnualRate { percent };
        self
    }

    /// Sets the residual value.
    #[must_use]
    pub const fn with_residual_value(mut self, residual_value: Decimal) -> Self {
        self.residual_value = residual_value;
        self
    }

    /// Sets the period convention.
    #[must_use]
    pub const fn with_convention(mut self, convention: PeriodConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Sets the depreciation period length.
    #[must_use]
    pub const fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Enables separate tax depreciation.
    #[must_use]
    pub const fn with_tax(mut self, tax: TaxTreatment) -> Self {
        self.tax = Some(tax);
        self
    }

    /// Period length actually used.
    #[must_use]
    pub fn effective_frequency(&self) -> PaymentFrequency {
        self.frequency.unwrap_or(PaymentFrequency::Annual)
    }

    /// Request for the book schedule.
    pub fn book_request(&self) -> Result<AmortizationRequest, AmortizationError> {
        self.request_for(self.method, self.basis)
    }

    /// Request for the tax schedule, if separate tax depreciation is enabled.
    pub fn tax_request(&self) -> Result<Option<AmortizationRequest>, AmortizationError> {
        self.tax
            .map(|tax| self.request_for(tax.method, tax.basis))
            .transpose()
    }

    fn request_for(
        &self,
        method: AmortizationMethod,
        basis: DepreciationBasis,
    ) -> Result<AmortizationRequest, AmortizationError> {
        if method.is_loan() {
            return Err(AmortizationError::UnsupportedMethod {
                method: method.name(),
                context: "fixed assets",
            });
        }
        let frequency = self.effective_frequency();
        let term = basis
            .years()?
            .checked_mul(frequency.periods_per_year())
            .ok_or(AmortizationError::ArithmeticOverflow("asset term"))?;

        let request = AmortizationRequest::new(self.cost, term, method, self.depreciation_start)
            .with_residual_value(self.residual_value)
            .with_convention(self.convention)
            .with_frequency(frequency);
        Ok(match basis.rate() {
            Some(percent) => request.with_annual_rate(percent),
            None => request,
        })
    }
}

/// Book and optional tax schedules produced at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchedules {
    /// Book depreciation schedule.
    pub book: Schedule,
    /// Tax depreciation schedule, when separate tax depreciation is enabled.
    pub tax: Option<Schedule>,
}

/// One asset as input to the reports.
#[derive(Debug, Clone)]
pub struct AssetLine {
    /// Asset ID.
    pub asset_id: AssetId,
    /// Display name.
    pub name: String,
    /// Book schedule of the asset.
    pub schedule: Schedule,
}

/// Asset register row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegisterRow {
    /// Asset ID.
    pub asset_id: AssetId,
    /// Display name.
    pub name: String,
    /// Depreciation method.
    pub method: AmortizationMethod,
    /// Cost.
    pub cost: Decimal,
    /// Accumulated depreciation as of the report date.
    pub accumulated_depreciation: Decimal,
    /// Cost less accumulated depreciation.
    pub book_value: Decimal,
}

/// Asset register totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegisterTotals {
    /// Number of assets listed.
    pub asset_count: usize,
    /// Total cost.
    pub total_cost: Decimal,
    /// Total accumulated depreciation.
    pub total_accumulated_depreciation: Decimal,
    /// Total book value.
    pub total_book_value: Decimal,
}

/// Asset register as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegisterReport {
    /// Report date.
    pub as_of: NaiveDate,
    /// One row per asset in service on the report date.
    pub rows: Vec<AssetRegisterRow>,
    /// Totals.
    pub totals: AssetRegisterTotals,
}

/// Depreciation expense row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationRow {
    /// Asset ID.
    pub asset_id: AssetId,
    /// Display name.
    pub name: String,
    /// Depreciation method.
    pub method: AmortizationMethod,
    /// Expense recognised in the range.
    pub expense: Decimal,
}

/// Depreciation expense for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationReport {
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range.
    pub to: NaiveDate,
    /// Assets with non-zero expense in the range.
    pub rows: Vec<DepreciationRow>,
    /// Total expense.
    pub total_expense: Decimal,
}

/// Book value and gain or loss of an asset disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisposalValuation {
    /// Disposal date.
    pub disposal_date: NaiveDate,
    /// Depreciation recognised up to the disposal date.
    pub accumulated_depreciation: Decimal,
    /// Book value at disposal.
    pub book_value: Decimal,
    /// Proceeds less disposal costs.
    pub net_proceeds: Decimal,
    /// Net proceeds less book value; negative for a loss.
    pub gain_loss: Decimal,
}

/// An asset expected to be disposed of.
#[derive(Debug, Clone)]
pub struct PlannedDisposal {
    /// The asset and its book schedule.
    pub line: AssetLine,
    /// Expected disposal date.
    pub expected_date: NaiveDate,
    /// Expected proceeds.
    pub estimated_value: Decimal,
}

/// Upcoming disposal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingDisposalRow {
    /// Asset ID.
    pub asset_id: AssetId,
    /// Display name.
    pub name: String,
    /// Expected disposal date.
    pub expected_date: NaiveDate,
    /// Book value on the report date.
    pub current_book_value: Decimal,
    /// Expected proceeds.
    pub estimated_value: Decimal,
    /// Expected proceeds less current book value.
    pub estimated_gain_loss: Decimal,
}

/// Assets due for disposal within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingDisposalsReport {
    /// Report date; also the first day of the window.
    pub as_of: NaiveDate,
    /// Last day of the window.
    pub until: NaiveDate,
    /// Rows ordered by expected disposal date.
    pub rows: Vec<UpcomingDisposalRow>,
    /// Total estimated gain or loss.
    pub total_estimated_gain_loss: Decimal,
}
