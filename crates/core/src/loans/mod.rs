//! Loan repayment schedules.
//!
//! Loans use the repayment subset of the schedule engine (equal payment,
//! equal principal, interest-only balloon), anchored on the disbursement date.

pub mod terms;

pub use terms::{LoanQuote, LoanTerms};
