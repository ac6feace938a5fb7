//! Fixed asset depreciation.
//!
//! Assets use the depreciation subset of the schedule engine. Registration
//! produces a book schedule and, when separate tax depreciation is enabled, an
//! independent tax schedule. Reports and disposal gain or loss value stored
//! schedules without regenerating them.

pub mod service;
pub mod types;


pub use service::{AssetReportService, depreciation_between, disposal_gain_loss, register_asset};
pub use types::{
    AssetLine, AssetRegisterReport, AssetRegisterRow, AssetRegisterTotals, AssetTerms,
    DepreciationBasis, DepreciationReport, DepreciationRow, DisposalValuation, PlannedDisposal,
    RegisteredSchedules, TaxTreatment, UpcomingDisposalRow, UpcomingDisposalsReport,
};
