//! Schedule persistence.
//!
//! Schedules are generated once at registration and stored; later valuations
//! read the stored rows instead of regenerating:
//! - Stored schedule and row types keyed by owner and basis
//! - Repository trait with an in-memory adapter
//! - Schedule service for registration and lookups

pub mod error;
pub mod repository;
pub mod service;
pub mod types;

pub use error::{RepositoryError, ScheduleServiceError};
pub use repository::{InMemoryScheduleRepository, ScheduleRepository};
pub use service::ScheduleService;
pub use types::{ScheduleBasis, ScheduleKey, ScheduleOwner, ScheduleRow, StoredSchedule};
