//! Schedule registration and lookup over a repository.

use std::sync::Arc;

use amortis_shared::types::{AssetId, LoanId};
use chrono::NaiveDate;
use tracing::debug;

use super::error::{RepositoryError, ScheduleServiceError};
use super::repository::ScheduleRepository;
use super::types::{ScheduleBasis, ScheduleOwner, StoredSchedule};
use crate::amortization::{
    AmortizationRequest, Schedule, ScheduleGenerator, SchedulePeriod, Valuation,
};
use crate::fixed_assets::{AssetTerms, RegisteredSchedules};
use crate::loans::LoanTerms;

/// Generates schedules once at registration and answers valuations from storage.
pub struct ScheduleService<R: ScheduleRepository> {
    repo: Arc<R>,
    generator: ScheduleGenerator,
}

impl<R: ScheduleRepository> ScheduleService<R> {
    /// Create a new schedule service.
    #[must_use]
    pub fn new(repo: Arc<R>, generator: ScheduleGenerator) -> Self {
        Self { repo, generator }
    }

    /// Generates and stores the book schedule and, if given, the tax schedule.
    ///
    /// Both schedules are generated before anything is written, and they are
    /// stored in one atomic repository call: a failure leaves nothing behind.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either request is invalid
    /// - A schedule already exists for the owner and basis
    /// - The repository fails
    pub async fn register(
        &self,
        owner: ScheduleOwner,
        book: &AmortizationRequest,
        tax: Option<&AmortizationRequest>,
    ) -> Result<RegisteredSchedules, ScheduleServiceError> {
        let book_schedule = self.generator.generate(book)?;
        let tax_schedule = tax
            .map(|request| self.generator.generate(request))
            .transpose()?;

        let mut pending = vec![StoredSchedule::from_schedule(
            owner,
            ScheduleBasis::Book,
            &book_schedule,
        )];
        if let Some(schedule) = &tax_schedule {
            pending.push(StoredSchedule::from_schedule(owner, ScheduleBasis::Tax, schedule));
        }
        let count = pending.len();
        self.repo.insert_all(pending).await?;

        debug!(%owner, schedules = count, "stored schedules");
        Ok(RegisteredSchedules {
            book: book_schedule,
            tax: tax_schedule,
        })
    }

    /// Registers the book and optional tax schedules of an asset.
    pub async fn register_asset(
        &self,
        asset_id: AssetId,
        terms: &AssetTerms,
    ) -> Result<RegisteredSchedules, ScheduleServiceError> {
        let book = terms.book_request()?;
        let tax = terms.tax_request()?;
        self.register(ScheduleOwner::Asset(asset_id), &book, tax.as_ref())
            .await
    }

    /// Registers the repayment schedule of an approved loan.
    pub async fn register_loan(
        &self,
        loan_id: LoanId,
        terms: &LoanTerms,
    ) -> Result<Schedule, ScheduleServiceError> {
        let request = terms.to_request()?;
        let registered = self
            .register(ScheduleOwner::Loan(loan_id), &request, None)
            .await?;
        Ok(registered.book)
    }

    /// Values a stored schedule as of `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no schedule is stored.
    pub async fn value_at(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
        as_of: NaiveDate,
    ) -> Result<Valuation, ScheduleServiceError> {
        Ok(self.stored(owner, basis).await?.value_at(as_of))
    }

    /// Stored periods of a schedule.
    pub async fn periods(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
    ) -> Result<Vec<SchedulePeriod>, ScheduleServiceError> {
        Ok(self.stored(owner, basis).await?.periods())
    }

    async fn stored(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
    ) -> Result<StoredSchedule, ScheduleServiceError> {
        self.repo
            .load(owner, basis)
            .await?
            .ok_or_else(|| RepositoryError::NotFound { owner, basis }.into())
    }
}
