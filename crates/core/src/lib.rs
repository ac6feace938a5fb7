//! Core amortization engine for Amortis.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Schedule generation, valuation and the asset and loan rules built on them
//! live here.
//!
//! # Modules
//!
//! - `amortization` - Schedule generator and point-in-time valuators
//! - `fixed_assets` - Book and tax depreciation, asset reports
//! - `loans` - Loan repayment terms and quotes
//! - `persistence` - Stored schedules and the repository interface
//! - `progress` - Cached loan payment progress

pub mod amortization;
pub mod fixed_assets;
pub mod loans;
pub mod persistence;
pub mod progress;
