//! Cross-aggregate orchestration for tracking operations.
//!
//! Each caller intent becomes one ordered sequence of single-aggregate
//! loads/mutations/saves:
//!
//! ```text
//! Move:        load plate -> release origin location -> save
//!                -> transition plate -> save
//!                -> admit at destination location -> save
//!                -> notify
//! Content:     load plate -> mutate contents
//!                -> resync its location's registration -> save
//!                -> save plate -> notify
//! Block/etc.:  load location -> mutate -> save -> notify
//! ```
//!
//! Ordering holds only *within* one sequence. There is no implicit rollback:
//! a failure mid-sequence leaves earlier persisted steps in place (accepted
//! partial-failure exposure; the persistence collaborator may instead supply
//! a transactional boundary). Notifications are fire-and-forget: publish
//! failures are logged and swallowed, never surfaced to the caller.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use paktrack_core::{DomainError, LicensePlateId, LocationId, WarehouseId};
use paktrack_events::{Event, EventBus};
use paktrack_tracking::events::{
    ItemAdded, ItemRemoved, LocationBlocked, LocationUnblocked, PlateCreated, PlateMoved,
};
use paktrack_tracking::{
    CapacityLimits, LicensePlate, LicensePlateType, LocationState, MovementType, TrackingEvent,
};

use crate::repository::{LicensePlateRepository, LocationStateRepository, RepositoryError};

/// Capacity applied to location states synthesized on demand by the move
/// path. A policy choice, not a discovered value; inject a different one to
/// change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    pub default_limits: CapacityLimits,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            default_limits: CapacityLimits::new(
                Some(1000),
                Some(Decimal::from(1000)),
                Some(Decimal::from(10)),
            ),
        }
    }
}

/// Failure of one coordinator operation.
#[derive(Debug)]
pub enum TrackingError {
    /// Referenced plate or location absent.
    NotFound,
    /// The aggregate's status or blocked flag forbids the operation.
    StateConflict(String),
    /// Malformed input (deterministic).
    Validation(String),
    /// Removal asked for more than an item holds.
    InsufficientQuantity(String),
    /// A location cannot admit the requested totals.
    InsufficientCapacity(String),
    /// The persistence collaborator failed.
    Repository(RepositoryError),
}

impl From<DomainError> for TrackingError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => TrackingError::NotFound,
            DomainError::StateConflict(msg) => TrackingError::StateConflict(msg),
            DomainError::Validation(msg) => TrackingError::Validation(msg),
            DomainError::InsufficientQuantity(msg) => TrackingError::InsufficientQuantity(msg),
            DomainError::InsufficientCapacity(msg) => TrackingError::InsufficientCapacity(msg),
        }
    }
}

impl From<RepositoryError> for TrackingError {
    fn from(value: RepositoryError) -> Self {
        TrackingError::Repository(value)
    }
}

/// Sequences reads and writes across the [`LicensePlate`] and
/// [`LocationState`] aggregates to execute each caller intent as one logical
/// operation.
///
/// Not internally concurrent: one operation is one sequence, and ordering
/// across concurrent callers is the persistence collaborator's problem
/// (last-write-wins or optimistic concurrency per aggregate).
///
/// Generic over the two repositories and the notification bus so tests can
/// inject in-memory doubles.
#[derive(Debug)]
pub struct TrackingCoordinator<P, L, B> {
    plates: P,
    locations: L,
    bus: B,
    capacity_policy: CapacityPolicy,
}

impl<P, L, B> TrackingCoordinator<P, L, B> {
    pub fn new(plates: P, locations: L, bus: B) -> Self {
        Self {
            plates,
            locations,
            bus,
            capacity_policy: CapacityPolicy::default(),
        }
    }

    /// Override the capacity applied to on-demand location states.
    pub fn with_capacity_policy(mut self, capacity_policy: CapacityPolicy) -> Self {
        self.capacity_policy = capacity_policy;
        self
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        self.capacity_policy
    }
}

impl<P, L, B> TrackingCoordinator<P, L, B>
where
    P: LicensePlateRepository,
    L: LocationStateRepository,
    B: EventBus<TrackingEvent>,
{
    /// Create a new license plate.
    pub fn create_plate(
        &self,
        license_plate_id: LicensePlateId,
        warehouse_id: WarehouseId,
        plate_type: LicensePlateType,
        container_code: Option<String>,
        created_by: &str,
    ) -> Result<LicensePlate, TrackingError> {
        info!(plate = %license_plate_id, warehouse = %warehouse_id, "creating license plate");

        let plate = LicensePlate::new(
            license_plate_id.clone(),
            warehouse_id.clone(),
            plate_type,
            container_code,
            created_by,
        );
        self.plates.save(&plate)?;

        self.notify(TrackingEvent::PlateCreated(PlateCreated {
            license_plate_id,
            warehouse_id,
            plate_type,
            created_by: created_by.to_string(),
            occurred_at: Utc::now(),
        }));

        Ok(plate)
    }

    /// Get a license plate by id.
    pub fn get_plate(
        &self,
        license_plate_id: &LicensePlateId,
    ) -> Result<Option<LicensePlate>, TrackingError> {
        Ok(self.plates.find_by_id(license_plate_id)?)
    }

    /// License plates currently at a location.
    pub fn plates_at_location(
        &self,
        location_id: &LocationId,
    ) -> Result<Vec<LicensePlate>, TrackingError> {
        Ok(self.plates.find_by_current_location(location_id)?)
    }

    /// Move a license plate to a location (`None` = into transit).
    ///
    /// Sequence: release the origin location (if any), transition the plate,
    /// admit at the destination (if any). A destination without a
    /// [`LocationState`] yet gets one synthesized with the configured
    /// default capacity.
    pub fn move_plate(
        &self,
        license_plate_id: &LicensePlateId,
        to_location_id: Option<LocationId>,
        movement_type: MovementType,
        performed_by: &str,
        reason: &str,
    ) -> Result<LicensePlate, TrackingError> {
        info!(plate = %license_plate_id, to = ?to_location_id, "moving license plate");

        let mut plate = self.load_plate(license_plate_id)?;
        let from_location_id = plate.current_location_id().cloned();

        if let Some(origin) = &from_location_id {
            let mut state = self.load_or_create_location(origin, plate.warehouse_id())?;
            state.remove_license_plate(license_plate_id, plate.totals())?;
            self.locations.save(&state)?;
        }

        plate.move_to(to_location_id.clone(), movement_type, performed_by, reason)?;
        self.plates.save(&plate)?;

        if let Some(destination) = &to_location_id {
            let mut state = self.load_or_create_location(destination, plate.warehouse_id())?;
            state.add_license_plate(license_plate_id, plate.totals())?;
            self.locations.save(&state)?;
        }

        self.notify(TrackingEvent::PlateMoved(PlateMoved {
            license_plate_id: license_plate_id.clone(),
            from_location_id,
            to_location_id,
            movement_type,
            performed_by: performed_by.to_string(),
            occurred_at: Utc::now(),
        }));

        Ok(plate)
    }

    /// Add contents to a plate and resynchronize its location's registration.
    #[allow(clippy::too_many_arguments)]
    pub fn add_item(
        &self,
        license_plate_id: &LicensePlateId,
        sku: &str,
        lot_number: Option<String>,
        quantity: i64,
        weight: Option<Decimal>,
        volume: Option<Decimal>,
        uom: Option<String>,
    ) -> Result<LicensePlate, TrackingError> {
        info!(plate = %license_plate_id, sku, quantity, "adding item to license plate");

        let mut plate = self.load_plate(license_plate_id)?;
        let previous = plate.totals();

        plate.add_item(sku, lot_number, quantity, weight, volume, uom)?;

        if let Some(location_id) = plate.current_location_id().cloned() {
            let mut state = self.load_or_create_location(&location_id, plate.warehouse_id())?;
            state.resync_license_plate(license_plate_id, previous, Some(plate.totals()))?;
            self.locations.save(&state)?;
        }

        self.plates.save(&plate)?;

        self.notify(TrackingEvent::ItemAdded(ItemAdded {
            license_plate_id: license_plate_id.clone(),
            sku: sku.to_string(),
            quantity,
            location_id: plate.current_location_id().cloned(),
            occurred_at: Utc::now(),
        }));

        Ok(plate)
    }

    /// Remove contents from a plate and resynchronize its location's
    /// registration. An emptied plate stays deregistered at its location.
    pub fn remove_item(
        &self,
        license_plate_id: &LicensePlateId,
        sku: &str,
        lot_number: Option<&str>,
        quantity: i64,
    ) -> Result<LicensePlate, TrackingError> {
        info!(plate = %license_plate_id, sku, quantity, "removing item from license plate");

        let mut plate = self.load_plate(license_plate_id)?;
        let previous = plate.totals();

        plate.remove_item(sku, lot_number, quantity)?;

        if let Some(location_id) = plate.current_location_id().cloned() {
            let current = if plate.is_empty() {
                None
            } else {
                Some(plate.totals())
            };
            let mut state = self.load_or_create_location(&location_id, plate.warehouse_id())?;
            state.resync_license_plate(license_plate_id, previous, current)?;
            self.locations.save(&state)?;
        }

        self.plates.save(&plate)?;

        self.notify(TrackingEvent::ItemRemoved(ItemRemoved {
            license_plate_id: license_plate_id.clone(),
            sku: sku.to_string(),
            quantity,
            location_id: plate.current_location_id().cloned(),
            occurred_at: Utc::now(),
        }));

        Ok(plate)
    }

    /// Get the state of one location.
    pub fn get_location_state(
        &self,
        location_id: &LocationId,
    ) -> Result<Option<LocationState>, TrackingError> {
        Ok(self.locations.find_by_id(location_id)?)
    }

    /// All location states in a warehouse.
    pub fn list_location_states(
        &self,
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<LocationState>, TrackingError> {
        Ok(self.locations.find_by_warehouse(warehouse_id)?)
    }

    /// Block a location. Unlike the move path there is no on-demand
    /// creation: blocking an unknown location fails.
    pub fn block_location(
        &self,
        location_id: &LocationId,
        reason: &str,
    ) -> Result<LocationState, TrackingError> {
        info!(location = %location_id, reason, "blocking location");

        let mut state = self.load_location(location_id)?;
        state.block(reason);
        self.locations.save(&state)?;

        self.notify(TrackingEvent::LocationBlocked(LocationBlocked {
            location_id: location_id.clone(),
            warehouse_id: state.warehouse_id().clone(),
            reason: reason.to_string(),
            occurred_at: Utc::now(),
        }));

        Ok(state)
    }

    /// Unblock a location.
    pub fn unblock_location(
        &self,
        location_id: &LocationId,
    ) -> Result<LocationState, TrackingError> {
        info!(location = %location_id, "unblocking location");

        let mut state = self.load_location(location_id)?;
        state.unblock();
        self.locations.save(&state)?;

        self.notify(TrackingEvent::LocationUnblocked(LocationUnblocked {
            location_id: location_id.clone(),
            warehouse_id: state.warehouse_id().clone(),
            occurred_at: Utc::now(),
        }));

        Ok(state)
    }

    fn load_plate(&self, id: &LicensePlateId) -> Result<LicensePlate, TrackingError> {
        self.plates
            .find_by_id(id)?
            .ok_or(TrackingError::NotFound)
    }

    fn load_location(&self, id: &LocationId) -> Result<LocationState, TrackingError> {
        self.locations
            .find_by_id(id)?
            .ok_or(TrackingError::NotFound)
    }

    fn load_or_create_location(
        &self,
        id: &LocationId,
        warehouse_id: &WarehouseId,
    ) -> Result<LocationState, TrackingError> {
        Ok(self.locations.find_by_id(id)?.unwrap_or_else(|| {
            LocationState::new(
                id.clone(),
                warehouse_id.clone(),
                None,
                self.capacity_policy.default_limits,
            )
        }))
    }

    /// Best-effort notification. The operation already persisted its
    /// aggregates; a publish failure is logged and swallowed.
    fn notify(&self, event: TrackingEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.bus.publish(event) {
            warn!(event_type, error = ?e, "failed to publish tracking event");
        }
    }
}
