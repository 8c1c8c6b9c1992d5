use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use paktrack_core::{
    AggregateRoot, DomainError, DomainResult, LicensePlateId, LocationId, ValueObject, WarehouseId,
};

use crate::totals::ContentTotals;

/// Physical occupancy state of a location. Derived, never stored as
/// independent truth (block/unblock force it transiently; everything else
/// recomputes it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccupancyStatus {
    /// No inventory in location.
    Empty,
    /// Some capacity available.
    PartiallyOccupied,
    /// At or near maximum capacity.
    Full,
    /// Exceeds maximum capacity.
    OverCapacity,
    /// Physically blocked or inaccessible.
    Blocked,
    /// Occupancy state unknown.
    Unknown,
}

impl OccupancyStatus {
    pub fn can_accept_inventory(self) -> bool {
        matches!(self, Self::Empty | Self::PartiallyOccupied)
    }

    pub fn requires_attention(self) -> bool {
        matches!(self, Self::OverCapacity | Self::Blocked)
    }

    /// Classify a utilization percentage.
    ///
    /// `< 0` is only reachable with misconfigured ceilings and maps to
    /// `Unknown`; `95..=100` is `Full`; above that, `OverCapacity`.
    pub fn from_utilization(utilization_pct: Decimal) -> Self {
        if utilization_pct < Decimal::ZERO {
            Self::Unknown
        } else if utilization_pct == Decimal::ZERO {
            Self::Empty
        } else if utilization_pct < Decimal::from(95) {
            Self::PartiallyOccupied
        } else if utilization_pct <= Decimal::from(100) {
            Self::Full
        } else {
            Self::OverCapacity
        }
    }
}

/// Capacity ceilings for a location. A `None` dimension is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLimits {
    pub max_quantity: Option<i64>,
    pub max_weight: Option<Decimal>,
    pub max_volume: Option<Decimal>,
}

impl CapacityLimits {
    pub const UNBOUNDED: CapacityLimits = CapacityLimits {
        max_quantity: None,
        max_weight: None,
        max_volume: None,
    };

    pub fn new(
        max_quantity: Option<i64>,
        max_weight: Option<Decimal>,
        max_volume: Option<Decimal>,
    ) -> Self {
        Self {
            max_quantity,
            max_weight,
            max_volume,
        }
    }
}

impl ValueObject for CapacityLimits {}

/// Aggregate root: real-time occupancy/capacity state of one storage
/// location.
///
/// Holds *references* to the plates currently present (their ids), never the
/// plates themselves. Current totals are clamped at zero from below;
/// occupancy is a pure function of (blocked, emptiness, utilization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationState {
    location_id: LocationId,
    warehouse_id: WarehouseId,
    zone: Option<String>,
    occupancy_status: OccupancyStatus,
    license_plate_ids: Vec<LicensePlateId>,
    capacity: CapacityLimits,
    current: ContentTotals,
    is_blocked: bool,
    block_reason: Option<String>,
    blocked_at: Option<DateTime<Utc>>,
    last_updated: DateTime<Utc>,
    last_movement_at: Option<DateTime<Utc>>,
    // RTLS integration
    x_coordinate: Option<f64>,
    y_coordinate: Option<f64>,
    z_coordinate: Option<f64>,
    rfid_zone: Option<String>,
    version: u64,
}

impl LocationState {
    /// Create a location state with zero occupancy and the given ceilings.
    pub fn new(
        location_id: LocationId,
        warehouse_id: WarehouseId,
        zone: Option<String>,
        capacity: CapacityLimits,
    ) -> Self {
        Self {
            location_id,
            warehouse_id,
            zone,
            occupancy_status: OccupancyStatus::Empty,
            license_plate_ids: Vec::new(),
            capacity,
            current: ContentTotals::ZERO,
            is_blocked: false,
            block_reason: None,
            blocked_at: None,
            last_updated: Utc::now(),
            last_movement_at: None,
            x_coordinate: None,
            y_coordinate: None,
            z_coordinate: None,
            rfid_zone: None,
            version: 0,
        }
    }

    /// Can this location admit the given totals as one unit?
    ///
    /// All-or-nothing across quantity/weight/volume; a dimension without a
    /// ceiling imposes no limit.
    pub fn can_accept(&self, incoming: &ContentTotals) -> bool {
        if self.is_blocked {
            return false;
        }
        if let Some(max) = self.capacity.max_quantity {
            if self.current.quantity + incoming.quantity > max {
                return false;
            }
        }
        if let Some(max) = self.capacity.max_weight {
            if self.current.weight + incoming.weight > max {
                return false;
            }
        }
        if let Some(max) = self.capacity.max_volume {
            if self.current.volume + incoming.volume > max {
                return false;
            }
        }
        true
    }

    /// Register a plate and commit its totals.
    ///
    /// Registration is idempotent on the id set, but totals still accumulate
    /// on every call; callers own the no-double-add discipline.
    pub fn add_license_plate(
        &mut self,
        license_plate_id: &LicensePlateId,
        totals: ContentTotals,
    ) -> DomainResult<()> {
        if self.is_blocked {
            return Err(DomainError::state_conflict(format!(
                "location {} is blocked: {}",
                self.location_id,
                self.block_reason.as_deref().unwrap_or("no reason recorded")
            )));
        }

        if !self.can_accept(&totals) {
            return Err(DomainError::insufficient_capacity(format!(
                "location {} does not have sufficient capacity",
                self.location_id
            )));
        }

        if !self.license_plate_ids.contains(license_plate_id) {
            self.license_plate_ids.push(license_plate_id.clone());
        }

        self.current.quantity += totals.quantity;
        self.current.weight += totals.weight;
        self.current.volume += totals.volume;

        self.update_occupancy_status();
        self.last_movement_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Deregister a plate and release its totals.
    ///
    /// Fails if the plate is not currently registered. Totals are clamped at
    /// zero from below: a removal never drives a current value negative even
    /// when the amount nominally exceeds it.
    pub fn remove_license_plate(
        &mut self,
        license_plate_id: &LicensePlateId,
        totals: ContentTotals,
    ) -> DomainResult<()> {
        let Some(idx) = self
            .license_plate_ids
            .iter()
            .position(|id| id == license_plate_id)
        else {
            return Err(DomainError::validation(format!(
                "license plate {} not at location {}",
                license_plate_id, self.location_id
            )));
        };
        self.license_plate_ids.remove(idx);

        self.current.quantity = (self.current.quantity - totals.quantity).max(0);
        self.current.weight = (self.current.weight - totals.weight).max(Decimal::ZERO);
        self.current.volume = (self.current.volume - totals.volume).max(Decimal::ZERO);

        self.update_occupancy_status();
        self.last_movement_at = Some(Utc::now());
        self.touch();
        Ok(())
    }

    /// Replace a plate's registered totals after its contents changed.
    ///
    /// Releases `previous`, then re-admits the plate with `current` through
    /// the normal admission path. Pass `None` for an emptied plate to leave
    /// it deregistered. Final totals are exact and the plate id is present
    /// iff it has contents.
    pub fn resync_license_plate(
        &mut self,
        license_plate_id: &LicensePlateId,
        previous: ContentTotals,
        current: Option<ContentTotals>,
    ) -> DomainResult<()> {
        self.remove_license_plate(license_plate_id, previous)?;
        if let Some(totals) = current {
            self.add_license_plate(license_plate_id, totals)?;
        }
        Ok(())
    }

    /// Block the location. Forces occupancy to `Blocked` irrespective of
    /// utilization.
    pub fn block(&mut self, reason: impl Into<String>) {
        self.is_blocked = true;
        self.block_reason = Some(reason.into());
        self.blocked_at = Some(Utc::now());
        self.occupancy_status = OccupancyStatus::Blocked;
        self.touch();
    }

    /// Unblock and recompute occupancy from current utilization; the result
    /// has no memory of the pre-block value.
    pub fn unblock(&mut self) {
        self.is_blocked = false;
        self.block_reason = None;
        self.blocked_at = None;
        self.update_occupancy_status();
        self.touch();
    }

    /// Replace the capacity ceilings.
    ///
    /// Does not retroactively validate current totals; over-capacity becomes
    /// visible through the derived status.
    pub fn update_capacity(&mut self, capacity: CapacityLimits) {
        self.capacity = capacity;
        self.update_occupancy_status();
        self.touch();
    }

    /// Set RTLS coordinates.
    pub fn set_coordinates(&mut self, x: f64, y: f64, z: f64, rfid_zone: Option<String>) {
        self.x_coordinate = Some(x);
        self.y_coordinate = Some(y);
        self.z_coordinate = Some(z);
        self.rfid_zone = rfid_zone;
        self.touch();
    }

    /// Utilization percentage: the maximum of the quantity, weight and
    /// volume fill ratios, each rounded to two decimals (half-up). A
    /// dimension whose ceiling is absent or non-positive contributes zero.
    pub fn utilization_percentage(&self) -> Decimal {
        let hundred = Decimal::from(100);

        let quantity_pct = match self.capacity.max_quantity {
            Some(max) if max > 0 => round_pct(Decimal::from(self.current.quantity) * hundred / Decimal::from(max)),
            _ => Decimal::ZERO,
        };
        let weight_pct = match self.capacity.max_weight {
            Some(max) if max > Decimal::ZERO => round_pct(self.current.weight * hundred / max),
            _ => Decimal::ZERO,
        };
        let volume_pct = match self.capacity.max_volume {
            Some(max) if max > Decimal::ZERO => round_pct(self.current.volume * hundred / max),
            _ => Decimal::ZERO,
        };

        quantity_pct.max(weight_pct).max(volume_pct)
    }

    /// Remaining quantity headroom; `None` when the dimension is unbounded.
    pub fn available_quantity(&self) -> Option<i64> {
        self.capacity
            .max_quantity
            .map(|max| (max - self.current.quantity).max(0))
    }

    pub fn license_plate_count(&self) -> usize {
        self.license_plate_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.license_plate_ids.is_empty() && self.current.quantity == 0
    }

    pub fn is_full(&self) -> bool {
        matches!(
            self.occupancy_status,
            OccupancyStatus::Full | OccupancyStatus::OverCapacity
        )
    }

    pub fn requires_attention(&self) -> bool {
        self.occupancy_status.requires_attention()
    }

    pub fn warehouse_id(&self) -> &WarehouseId {
        &self.warehouse_id
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn occupancy_status(&self) -> OccupancyStatus {
        self.occupancy_status
    }

    pub fn license_plate_ids(&self) -> &[LicensePlateId] {
        &self.license_plate_ids
    }

    pub fn contains_license_plate(&self, id: &LicensePlateId) -> bool {
        self.license_plate_ids.contains(id)
    }

    pub fn capacity(&self) -> CapacityLimits {
        self.capacity
    }

    /// Current committed totals.
    pub fn current_totals(&self) -> ContentTotals {
        self.current
    }

    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.block_reason.as_deref()
    }

    pub fn blocked_at(&self) -> Option<DateTime<Utc>> {
        self.blocked_at
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn last_movement_at(&self) -> Option<DateTime<Utc>> {
        self.last_movement_at
    }

    pub fn coordinates(&self) -> Option<(f64, f64, f64)> {
        match (self.x_coordinate, self.y_coordinate, self.z_coordinate) {
            (Some(x), Some(y), Some(z)) => Some((x, y, z)),
            _ => None,
        }
    }

    pub fn rfid_zone(&self) -> Option<&str> {
        self.rfid_zone.as_deref()
    }

    fn update_occupancy_status(&mut self) {
        if self.is_blocked {
            self.occupancy_status = OccupancyStatus::Blocked;
            return;
        }

        if self.is_empty() {
            self.occupancy_status = OccupancyStatus::Empty;
            return;
        }

        self.occupancy_status = OccupancyStatus::from_utilization(self.utilization_percentage());
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
        self.version += 1;
    }
}

fn round_pct(pct: Decimal) -> Decimal {
    pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl AggregateRoot for LocationState {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.location_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lp(id: &str) -> LicensePlateId {
        LicensePlateId::new(id).unwrap()
    }

    fn location(capacity: CapacityLimits) -> LocationState {
        LocationState::new(
            LocationId::new("LOC-1").unwrap(),
            WarehouseId::new("WH-1").unwrap(),
            Some("ZONE-A".into()),
            capacity,
        )
    }

    fn qty(n: i64) -> ContentTotals {
        ContentTotals::new(n, Decimal::ZERO, Decimal::ZERO)
    }

    #[test]
    fn from_utilization_classifies_every_band() {
        use OccupancyStatus::*;
        assert_eq!(OccupancyStatus::from_utilization(dec!(-1)), Unknown);
        assert_eq!(OccupancyStatus::from_utilization(dec!(0)), Empty);
        assert_eq!(OccupancyStatus::from_utilization(dec!(0.01)), PartiallyOccupied);
        assert_eq!(OccupancyStatus::from_utilization(dec!(94.99)), PartiallyOccupied);
        assert_eq!(OccupancyStatus::from_utilization(dec!(95)), Full);
        assert_eq!(OccupancyStatus::from_utilization(dec!(100)), Full);
        assert_eq!(OccupancyStatus::from_utilization(dec!(100.01)), OverCapacity);
    }

    #[test]
    fn new_location_is_empty() {
        let loc = location(CapacityLimits::new(Some(10), None, None));
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Empty);
        assert!(loc.is_empty());
        assert_eq!(loc.current_totals(), ContentTotals::ZERO);
        assert_eq!(loc.available_quantity(), Some(10));
    }

    #[test]
    fn add_beyond_quantity_ceiling_fails_and_leaves_totals_untouched() {
        let mut loc = location(CapacityLimits::new(Some(5), None, None));
        let err = loc.add_license_plate(&lp("LP-1"), qty(6)).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientCapacity(_)));
        assert_eq!(loc.current_totals(), ContentTotals::ZERO);
        assert_eq!(loc.license_plate_count(), 0);
    }

    #[test]
    fn filling_to_the_ceiling_is_full_at_100_percent() {
        let mut loc = location(CapacityLimits::new(Some(5), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        assert_eq!(loc.utilization_percentage(), dec!(100.00));
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Full);
        assert!(loc.is_full());
        assert_eq!(loc.available_quantity(), Some(0));
    }

    #[test]
    fn admission_is_all_or_nothing_across_dimensions() {
        let mut loc = location(CapacityLimits::new(
            Some(100),
            Some(dec!(10)),
            Some(dec!(10)),
        ));
        // Quantity and volume fit, weight does not.
        let totals = ContentTotals::new(1, dec!(11), dec!(1));
        assert!(!loc.can_accept(&totals));
        assert!(loc.add_license_plate(&lp("LP-1"), totals).is_err());
        assert_eq!(loc.current_totals(), ContentTotals::ZERO);
    }

    #[test]
    fn unbounded_dimension_imposes_no_limit() {
        let mut loc = location(CapacityLimits::UNBOUNDED);
        loc.add_license_plate(&lp("LP-1"), ContentTotals::new(1_000_000, dec!(1000000), dec!(1000000)))
            .unwrap();
        // Unbounded dimensions contribute zero utilization, so the derived
        // status stays at the zero band despite the registered contents.
        assert_eq!(loc.utilization_percentage(), dec!(0));
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Empty);
        assert!(!loc.is_empty());
        assert_eq!(loc.available_quantity(), None);
    }

    #[test]
    fn utilization_takes_the_maximum_dimension() {
        let mut loc = location(CapacityLimits::new(
            Some(100),
            Some(dec!(100)),
            Some(dec!(100)),
        ));
        loc.add_license_plate(&lp("LP-1"), ContentTotals::new(10, dec!(50), dec!(25)))
            .unwrap();
        assert_eq!(loc.utilization_percentage(), dec!(50.00));
    }

    #[test]
    fn utilization_rounds_half_up_to_two_decimals() {
        let mut loc = location(CapacityLimits::new(Some(800), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        // 5/800 = 0.625% -> 0.63 with half-up rounding.
        assert_eq!(loc.utilization_percentage(), dec!(0.63));
    }

    #[test]
    fn readding_a_present_id_keeps_one_entry_but_accumulates_totals() {
        // Idempotent on the id set, not on totals. Intentional; callers own
        // the no-double-add discipline.
        let mut loc = location(CapacityLimits::new(Some(100), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        assert_eq!(loc.license_plate_count(), 1);
        assert_eq!(loc.current_totals().quantity, 10);
    }

    #[test]
    fn removing_unregistered_plate_fails() {
        let mut loc = location(CapacityLimits::UNBOUNDED);
        let err = loc.remove_license_plate(&lp("LP-9"), qty(1)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn removal_clamps_totals_at_zero() {
        let mut loc = location(CapacityLimits::UNBOUNDED);
        loc.add_license_plate(&lp("LP-1"), ContentTotals::new(3, dec!(2), dec!(1)))
            .unwrap();
        loc.remove_license_plate(&lp("LP-1"), ContentTotals::new(10, dec!(10), dec!(10)))
            .unwrap();
        assert_eq!(loc.current_totals(), ContentTotals::ZERO);
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Empty);
    }

    #[test]
    fn blocked_location_rejects_admission() {
        let mut loc = location(CapacityLimits::new(Some(100), None, None));
        loc.block("spill cleanup");
        let err = loc.add_license_plate(&lp("LP-1"), qty(1)).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
        assert!(!loc.can_accept(&qty(1)));
    }

    #[test]
    fn block_forces_status_regardless_of_utilization() {
        let mut loc = location(CapacityLimits::new(Some(10), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(10)).unwrap();
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Full);

        loc.block("damaged rack");
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Blocked);
        assert_eq!(loc.block_reason(), Some("damaged rack"));
        assert!(loc.blocked_at().is_some());
        assert!(loc.requires_attention());
    }

    #[test]
    fn unblock_recomputes_from_current_utilization() {
        let mut loc = location(CapacityLimits::new(Some(10), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(10)).unwrap();
        loc.block("audit");
        loc.unblock();
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Full);
        assert_eq!(loc.block_reason(), None);
        assert_eq!(loc.blocked_at(), None);
    }

    #[test]
    fn capacity_update_does_not_retroactively_reject_contents() {
        let mut loc = location(CapacityLimits::new(Some(100), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(50)).unwrap();
        loc.update_capacity(CapacityLimits::new(Some(40), None, None));
        // Over-capacity is only visible through the derived status.
        assert_eq!(loc.occupancy_status(), OccupancyStatus::OverCapacity);
        assert_eq!(loc.utilization_percentage(), dec!(125.00));
    }

    #[test]
    fn resync_replaces_a_plates_totals_exactly() {
        let mut loc = location(CapacityLimits::new(Some(100), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        loc.resync_license_plate(&lp("LP-1"), qty(5), Some(qty(8)))
            .unwrap();
        assert_eq!(loc.current_totals().quantity, 8);
        assert!(loc.contains_license_plate(&lp("LP-1")));
    }

    #[test]
    fn resync_with_no_current_totals_leaves_plate_deregistered() {
        let mut loc = location(CapacityLimits::new(Some(100), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        loc.resync_license_plate(&lp("LP-1"), qty(5), None).unwrap();
        assert!(!loc.contains_license_plate(&lp("LP-1")));
        assert_eq!(loc.current_totals().quantity, 0);
        assert_eq!(loc.occupancy_status(), OccupancyStatus::Empty);
    }

    #[test]
    fn resync_respects_the_admission_check() {
        let mut loc = location(CapacityLimits::new(Some(10), None, None));
        loc.add_license_plate(&lp("LP-1"), qty(5)).unwrap();
        let err = loc
            .resync_license_plate(&lp("LP-1"), qty(5), Some(qty(11)))
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientCapacity(_)));
    }

    #[test]
    fn coordinates_are_settable() {
        let mut loc = location(CapacityLimits::UNBOUNDED);
        loc.set_coordinates(1.5, 2.5, 0.0, Some("RZ-1".into()));
        assert_eq!(loc.coordinates(), Some((1.5, 2.5, 0.0)));
        assert_eq!(loc.rfid_zone(), Some("RZ-1"));
    }
}
