//! Amortization and depreciation schedules.
//!
//! This module implements the schedule engine:
//! - Request, period and schedule types
//! - Period date layout (anchored and calendar-aligned)
//! - The schedule generator and its per-method period rules
//! - Point-in-time valuation (stored-schedule lookup and analytic)
//! - Error types for invalid requests

pub mod calendar;
mod depreciation;
pub mod error;
pub mod generator;
mod loan;
pub mod types;
pub mod valuator;

#[cfg(test)]
mod generator_props;
#[cfg(test)]
mod valuator_props;

pub use calendar::PeriodSpan;
pub use error::AmortizationError;
pub use generator::{GeneratorSettings, ScheduleGenerator, generate};
pub use loan::annuity_payment;
pub use types::{
    AmortizationMethod, AmortizationRequest, PaymentFrequency, PeriodConvention, PeriodKind,
    PeriodStep, Schedule, SchedulePeriod, ScheduleSummary,
};
pub use valuator::{
    AnalyticValuator, ElapsedRule, PeriodRecord, Valuation, value_at, value_at_periods,
};
