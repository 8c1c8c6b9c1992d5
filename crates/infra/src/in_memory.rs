//! In-memory repositories.
//!
//! Intended for tests/dev. Each repository is individually thread-safe
//! (RwLock over a map of documents); cross-aggregate atomicity is
//! deliberately not provided, matching the production persistence contract.

use std::collections::HashMap;
use std::sync::RwLock;

use paktrack_core::{AggregateRoot, LicensePlateId, LocationId, WarehouseId};
use paktrack_tracking::{LicensePlate, LocationState};

use crate::repository::{
    LicensePlateRepository, LocationStateRepository, RepositoryError,
};

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_string())
}

/// In-memory license plate store keyed by plate id.
#[derive(Debug, Default)]
pub struct InMemoryLicensePlateRepository {
    plates: RwLock<HashMap<LicensePlateId, LicensePlate>>,
}

impl InMemoryLicensePlateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LicensePlateRepository for InMemoryLicensePlateRepository {
    fn find_by_id(&self, id: &LicensePlateId) -> Result<Option<LicensePlate>, RepositoryError> {
        let plates = self.plates.read().map_err(|_| poisoned())?;
        Ok(plates.get(id).cloned())
    }

    fn find_by_current_location(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<LicensePlate>, RepositoryError> {
        let plates = self.plates.read().map_err(|_| poisoned())?;
        Ok(plates
            .values()
            .filter(|p| p.current_location_id() == Some(location_id))
            .cloned()
            .collect())
    }

    fn save(&self, plate: &LicensePlate) -> Result<(), RepositoryError> {
        let mut plates = self.plates.write().map_err(|_| poisoned())?;
        plates.insert(plate.id().clone(), plate.clone());
        Ok(())
    }
}

/// In-memory location state store keyed by location id.
#[derive(Debug, Default)]
pub struct InMemoryLocationStateRepository {
    states: RwLock<HashMap<LocationId, LocationState>>,
}

impl InMemoryLocationStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationStateRepository for InMemoryLocationStateRepository {
    fn find_by_id(&self, id: &LocationId) -> Result<Option<LocationState>, RepositoryError> {
        let states = self.states.read().map_err(|_| poisoned())?;
        Ok(states.get(id).cloned())
    }

    fn find_by_warehouse(
        &self,
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<LocationState>, RepositoryError> {
        let states = self.states.read().map_err(|_| poisoned())?;
        Ok(states
            .values()
            .filter(|s| s.warehouse_id() == warehouse_id)
            .cloned()
            .collect())
    }

    fn save(&self, state: &LocationState) -> Result<(), RepositoryError> {
        let mut states = self.states.write().map_err(|_| poisoned())?;
        states.insert(state.id().clone(), state.clone());
        Ok(())
    }
}
