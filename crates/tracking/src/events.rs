//! Notifications emitted after each mutating tracking operation.
//!
//! One event per operation, fire-and-forget: the operation is complete once
//! its aggregates are persisted, whatever happens to the notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paktrack_core::{LicensePlateId, LocationId, WarehouseId};
use paktrack_events::Event;

use crate::license_plate::LicensePlateType;
use crate::movement::MovementType;

/// Event: a license plate was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateCreated {
    pub license_plate_id: LicensePlateId,
    pub warehouse_id: WarehouseId,
    pub plate_type: LicensePlateType,
    pub created_by: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a license plate moved between locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateMoved {
    pub license_plate_id: LicensePlateId,
    pub from_location_id: Option<LocationId>,
    pub to_location_id: Option<LocationId>,
    pub movement_type: MovementType,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: contents were added to a plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub license_plate_id: LicensePlateId,
    pub sku: String,
    pub quantity: i64,
    pub location_id: Option<LocationId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: contents were removed from a plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub license_plate_id: LicensePlateId,
    pub sku: String,
    pub quantity: i64,
    pub location_id: Option<LocationId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a location was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationBlocked {
    pub location_id: LocationId,
    pub warehouse_id: WarehouseId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a location was unblocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUnblocked {
    pub location_id: LocationId,
    pub warehouse_id: WarehouseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingEvent {
    PlateCreated(PlateCreated),
    PlateMoved(PlateMoved),
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    LocationBlocked(LocationBlocked),
    LocationUnblocked(LocationUnblocked),
}

impl Event for TrackingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TrackingEvent::PlateCreated(_) => "tracking.license_plate.created",
            TrackingEvent::PlateMoved(_) => "tracking.license_plate.moved",
            TrackingEvent::ItemAdded(_) => "tracking.item.added",
            TrackingEvent::ItemRemoved(_) => "tracking.item.removed",
            TrackingEvent::LocationBlocked(_) => "tracking.location.blocked",
            TrackingEvent::LocationUnblocked(_) => "tracking.location.unblocked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TrackingEvent::PlateCreated(e) => e.occurred_at,
            TrackingEvent::PlateMoved(e) => e.occurred_at,
            TrackingEvent::ItemAdded(e) => e.occurred_at,
            TrackingEvent::ItemRemoved(e) => e.occurred_at,
            TrackingEvent::LocationBlocked(e) => e.occurred_at,
            TrackingEvent::LocationUnblocked(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable_identifiers() {
        let e = TrackingEvent::LocationBlocked(LocationBlocked {
            location_id: LocationId::new("LOC-1").unwrap(),
            warehouse_id: WarehouseId::new("WH-1").unwrap(),
            reason: "audit".into(),
            occurred_at: Utc::now(),
        });
        assert_eq!(e.event_type(), "tracking.location.blocked");
        assert_eq!(e.version(), 1);
    }
}
