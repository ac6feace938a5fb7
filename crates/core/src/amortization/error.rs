//! Amortization error types.
//!
//! Every variant describes an invalid request. Generation validates at entry
//! and either returns a complete schedule or one of these errors; nothing is
//! partially applied.

use amortis_shared::AppError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating a request or generating a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmortizationError {
    /// Principal is zero or negative.
    #[error("Principal must be positive, got {0}")]
    NonPositivePrincipal(Decimal),

    /// An amount carries more than two decimal places.
    #[error("{field} must be a whole number of cents, got {value}")]
    NotMoneyScaled {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// An amount that must not be negative is negative.
    #[error("{field} cannot be negative, got {value}")]
    NegativeAmount {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// Residual value is negative.
    #[error("Residual value cannot be negative, got {0}")]
    NegativeResidual(Decimal),

    /// Residual value is not below the principal.
    #[error("Residual value {residual} must be less than principal {principal}")]
    ResidualNotBelowPrincipal {
        /// Requested principal.
        principal: Decimal,
        /// Requested residual value.
        residual: Decimal,
    },

    /// Term has no periods.
    #[error("Term must be at least one period")]
    ZeroTerm,

    /// Term exceeds the configured maximum.
    #[error("Term of {term} periods exceeds the maximum of {max}")]
    TermTooLong {
        /// Requested term.
        term: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Method needs an annual rate and none was given.
    #[error("Method {0} requires an annual interest rate")]
    MissingRate(&'static str),

    /// Annual rate is negative.
    #[error("Annual rate cannot be negative, got {0}")]
    NegativeRate(Decimal),

    /// Depreciation rate is not in `(0, 100]` percent.
    #[error("Depreciation rate must be above 0% and at most 100%, got {0}%")]
    InvalidDepreciationRate(Decimal),

    /// Declining balance multiplier is zero or negative.
    #[error("Declining balance multiplier must be positive, got {0}")]
    InvalidMultiplier(Decimal),

    /// Grace periods leave nothing to amortize.
    #[error("Grace periods ({grace}) must be fewer than the term ({term})")]
    GraceNotBelowTerm {
        /// Requested grace periods.
        grace: u32,
        /// Requested term.
        term: u32,
    },

    /// Grace periods were requested for a depreciation method.
    #[error("Method {0} does not support grace periods")]
    GraceNotSupported(&'static str),

    /// Method does not belong to the subset the caller accepts.
    #[error("Method {method} cannot be used for {context}")]
    UnsupportedMethod {
        /// Offending method.
        method: &'static str,
        /// Where it was used (e.g. "fixed assets").
        context: &'static str,
    },

    /// Period dates fall outside the supported calendar.
    #[error("Schedule starting {0} runs past the supported calendar range")]
    DateOutOfRange(NaiveDate),

    /// A numeric operation overflowed.
    #[error("Arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),
}

impl AmortizationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositivePrincipal(_) => "NON_POSITIVE_PRINCIPAL",
            Self::NotMoneyScaled { .. } => "NOT_MONEY_SCALED",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::NegativeResidual(_) => "NEGATIVE_RESIDUAL",
            Self::ResidualNotBelowPrincipal { .. } => "RESIDUAL_NOT_BELOW_PRINCIPAL",
            Self::ZeroTerm => "ZERO_TERM",
            Self::TermTooLong { .. } => "TERM_TOO_LONG",
            Self::MissingRate(_) => "MISSING_RATE",
            Self::NegativeRate(_) => "NEGATIVE_RATE",
            Self::InvalidDepreciationRate(_) => "INVALID_DEPRECIATION_RATE",
            Self::InvalidMultiplier(_) => "INVALID_MULTIPLIER",
            Self::GraceNotBelowTerm { .. } => "GRACE_NOT_BELOW_TERM",
            Self::GraceNotSupported(_) => "GRACE_NOT_SUPPORTED",
            Self::UnsupportedMethod { .. } => "UNSUPPORTED_METHOD",
            Self::DateOutOfRange(_) => "DATE_OUT_OF_RANGE",
            Self::ArithmeticOverflow(_) => "ARITHMETIC_OVERFLOW",
        }
    }
}

impl From<AmortizationError> for AppError {
    fn from(err: AmortizationError) -> Self {
        Self::Validation(err.to_string())
    }
}
