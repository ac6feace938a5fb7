//! Payment progress types.

use amortis_shared::types::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of a loan's scheduled payments that have been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProgress {
    /// Payments marked completed.
    pub payments_completed: u32,
    /// Scheduled payments.
    pub total_payments: u32,
    /// `payments_completed / total_payments` in percent, two decimals.
    pub completion_percent: Decimal,
}

impl PaymentProgress {
    /// Computes progress; a loan without scheduled payments is at 0%.
    #[must_use]
    pub fn new(payments_completed: u32, total_payments: u32) -> Self {
        let completion_percent = if total_payments == 0 {
            Decimal::ZERO
        } else {
            round_money(
                Decimal::from(payments_completed) * Decimal::ONE_HUNDRED
                    / Decimal::from(total_payments),
            )
        };
        Self {
            payments_completed,
            total_payments,
            completion_percent,
        }
    }

    /// Returns true once every scheduled payment is completed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total_payments > 0 && self.payments_completed >= self.total_payments
    }
}

/// Progress together with whether it came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressLookup {
    /// Payment progress.
    pub progress: PaymentProgress,
    /// True if served from the cache.
    pub cached: bool,
}
