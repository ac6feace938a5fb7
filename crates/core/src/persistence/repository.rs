//! Schedule repository interface and in-memory adapter.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use dashmap::DashMap;

use super::error::RepositoryError;
use super::types::{ScheduleBasis, ScheduleKey, ScheduleOwner, StoredSchedule};

/// Repository trait for schedule persistence.
///
/// This trait is implemented by the storage layer. Implementations must keep
/// at most one schedule per owner and basis.
pub trait ScheduleRepository: Send + Sync {
    /// Check if a schedule exists.
    fn exists(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Store a set of new schedules atomically.
    ///
    /// Either every schedule is stored or none is. Fails with
    /// [`RepositoryError::AlreadyExists`] if any key is already taken.
    fn insert_all(
        &self,
        schedules: Vec<StoredSchedule>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Load a schedule.
    fn load(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
    ) -> impl Future<Output = Result<Option<StoredSchedule>, RepositoryError>> + Send;
}

/// Repository backed by a concurrent map, for previews and tests.
///
/// Reads go straight to the map; writes are serialized so a set of schedules
/// is checked and stored as one step.
#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    schedules: DashMap<ScheduleKey, StoredSchedule>,
    writes: Mutex<()>,
}

impl InMemoryScheduleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored schedules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

impl ScheduleRepository for InMemoryScheduleRepository {
    async fn exists(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
    ) -> Result<bool, RepositoryError> {
        Ok(self.schedules.contains_key(&ScheduleKey { owner, basis }))
    }

    async fn insert_all(&self, schedules: Vec<StoredSchedule>) -> Result<(), RepositoryError> {
        let _guard = self
            .writes
            .lock()
            .map_err(|_| RepositoryError::Backend("schedule write lock poisoned".to_string()))?;

        let mut keys = HashSet::with_capacity(schedules.len());
        for schedule in &schedules {
            let key = schedule.key();
            if self.schedules.contains_key(&key) || !keys.insert(key) {
                return Err(RepositoryError::AlreadyExists {
                    owner: key.owner,
                    basis: key.basis,
                });
            }
        }
        for schedule in schedules {
            self.schedules.insert(schedule.key(), schedule);
        }
        Ok(())
    }

    async fn load(
        &self,
        owner: ScheduleOwner,
        basis: ScheduleBasis,
    ) -> Result<Option<StoredSchedule>, RepositoryError> {
        Ok(self
            .schedules
            .get(&ScheduleKey { owner, basis })
            .map(|entry| entry.value().clone()))
    }
}
