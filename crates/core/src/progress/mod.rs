//! Loan payment progress with read-through memoization.

pub mod cache;
pub mod types;

pub use cache::PaymentProgressCache;
pub use types::{PaymentProgress, ProgressLookup};
