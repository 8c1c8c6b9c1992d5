//! Whole-document persistence boundary for the two tracking aggregates.
//!
//! Each repository operates on one aggregate type as a document:
//! get-by-identifier, one secondary lookup, and a whole-document save. The
//! contract assumes single-writer-per-aggregate semantics (last-write-wins or
//! optimistic concurrency) provided by the implementation; the coordinator
//! does not lock.

use std::sync::Arc;

use thiserror::Error;

use paktrack_core::{LicensePlateId, LocationId, WarehouseId};
use paktrack_tracking::{LicensePlate, LocationState};

/// Infrastructure-level persistence failure.
///
/// Distinct from domain errors: these mean the storage collaborator itself
/// misbehaved, not that the operation was invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored document could not be decoded: {0}")]
    Corrupt(String),
}

/// Persistence capability for [`LicensePlate`] aggregates.
pub trait LicensePlateRepository {
    fn find_by_id(&self, id: &LicensePlateId) -> Result<Option<LicensePlate>, RepositoryError>;

    /// Plates whose current location is the given one.
    fn find_by_current_location(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<LicensePlate>, RepositoryError>;

    fn save(&self, plate: &LicensePlate) -> Result<(), RepositoryError>;
}

/// Persistence capability for [`LocationState`] aggregates.
pub trait LocationStateRepository {
    fn find_by_id(&self, id: &LocationId) -> Result<Option<LocationState>, RepositoryError>;

    fn find_by_warehouse(
        &self,
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<LocationState>, RepositoryError>;

    fn save(&self, state: &LocationState) -> Result<(), RepositoryError>;
}

impl<R> LicensePlateRepository for Arc<R>
where
    R: LicensePlateRepository + ?Sized,
{
    fn find_by_id(&self, id: &LicensePlateId) -> Result<Option<LicensePlate>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_by_current_location(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<LicensePlate>, RepositoryError> {
        (**self).find_by_current_location(location_id)
    }

    fn save(&self, plate: &LicensePlate) -> Result<(), RepositoryError> {
        (**self).save(plate)
    }
}

impl<R> LocationStateRepository for Arc<R>
where
    R: LocationStateRepository + ?Sized,
{
    fn find_by_id(&self, id: &LocationId) -> Result<Option<LocationState>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_by_warehouse(
        &self,
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<LocationState>, RepositoryError> {
        (**self).find_by_warehouse(warehouse_id)
    }

    fn save(&self, state: &LocationState) -> Result<(), RepositoryError> {
        (**self).save(state)
    }
}
