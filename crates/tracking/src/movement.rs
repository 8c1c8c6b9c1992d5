use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paktrack_core::{Entity, LocationId, MovementId};

/// Type of physical movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Receiving putaway.
    Putaway,
    /// Pick from location.
    Pick,
    /// Stock replenishment.
    Replenishment,
    /// Internal relocation/move.
    Relocation,
    /// Cycle count adjustment.
    CycleCount,
    /// Consolidate license plates.
    Consolidation,
    /// Ship from dock.
    Ship,
    /// Return to stock.
    Return,
}

impl MovementType {
    /// Does this movement add inventory to its destination?
    pub fn adds_inventory(self) -> bool {
        matches!(
            self,
            Self::Putaway | Self::Replenishment | Self::Relocation | Self::Return
        )
    }

    /// Does this movement remove inventory from its origin?
    pub fn removes_inventory(self) -> bool {
        matches!(
            self,
            Self::Pick | Self::Consolidation | Self::Ship | Self::Relocation
        )
    }
}

/// An immutable audit record of one location transition.
///
/// `from`/`to` of `None` means "not at any location" (e.g. in transit).
/// Records are append-only on their owning plate and never change after
/// creation; task/wave associations are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    movement_id: MovementId,
    movement_type: MovementType,
    from_location_id: Option<LocationId>,
    to_location_id: Option<LocationId>,
    performed_by: String,
    occurred_at: DateTime<Utc>,
    reason: String,
    task_id: Option<String>,
    wave_id: Option<String>,
}

impl Movement {
    pub fn new(
        movement_type: MovementType,
        from_location_id: Option<LocationId>,
        to_location_id: Option<LocationId>,
        performed_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            movement_id: MovementId::new(),
            movement_type,
            from_location_id,
            to_location_id,
            performed_by: performed_by.into(),
            occurred_at: Utc::now(),
            reason: reason.into(),
            task_id: None,
            wave_id: None,
        }
    }

    /// Attach a task association at creation time.
    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Attach a wave association at creation time.
    pub fn with_wave(mut self, wave_id: impl Into<String>) -> Self {
        self.wave_id = Some(wave_id.into());
        self
    }

    /// Inbound movements add inventory to their destination.
    pub fn is_inbound(&self) -> bool {
        self.movement_type.adds_inventory()
    }

    /// Outbound movements remove inventory from their origin.
    pub fn is_outbound(&self) -> bool {
        self.movement_type.removes_inventory()
    }

    pub fn movement_type(&self) -> MovementType {
        self.movement_type
    }

    pub fn from_location_id(&self) -> Option<&LocationId> {
        self.from_location_id.as_ref()
    }

    pub fn to_location_id(&self) -> Option<&LocationId> {
        self.to_location_id.as_ref()
    }

    pub fn performed_by(&self) -> &str {
        &self.performed_by
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn wave_id(&self) -> Option<&str> {
        self.wave_id.as_deref()
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}
