use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paktrack_core::{
    AggregateRoot, DomainError, DomainResult, LicensePlateId, LocationId, WarehouseId,
};

use crate::item::LPItem;
use crate::movement::{Movement, MovementType};
use crate::totals::ContentTotals;

/// Type of license plate/container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicensePlateType {
    /// Standard pallet.
    Pallet,
    /// Picking tote/bin.
    Tote,
    /// Shipping carton/box.
    Carton,
    /// Rolling cage.
    Cage,
    /// Bulk container.
    Bulk,
    /// Virtual license plate (no physical container).
    Virtual,
}

impl LicensePlateType {
    pub fn requires_physical_container(self) -> bool {
        self != Self::Virtual
    }

    pub fn is_picking_container(self) -> bool {
        matches!(self, Self::Tote | Self::Carton)
    }

    pub fn is_storage_container(self) -> bool {
        matches!(self, Self::Pallet | Self::Cage | Self::Bulk)
    }
}

/// Lifecycle status of a license plate.
///
/// The capability predicates are the state machine: every mutating operation
/// on [`LicensePlate`] consults one of them before touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicensePlateStatus {
    /// Created, not yet in use.
    Created,
    /// Active and in use.
    Active,
    /// Moving between locations.
    InTransit,
    /// Stationary at a location.
    AtLocation,
    /// Being picked.
    Picked,
    /// Packed for shipping.
    Packed,
    /// Shipped out of the warehouse.
    Shipped,
    /// Contents consumed, plate emptied.
    Consumed,
    /// Closed and archived.
    Closed,
}

impl LicensePlateStatus {
    /// Can the plate be moved between locations?
    pub fn can_be_moved(self) -> bool {
        matches!(self, Self::Active | Self::AtLocation | Self::InTransit)
    }

    /// Can items be added?
    pub fn can_add_items(self) -> bool {
        matches!(self, Self::Created | Self::Active | Self::AtLocation)
    }

    /// Can items be removed?
    pub fn can_remove_items(self) -> bool {
        matches!(self, Self::Active | Self::AtLocation | Self::Picked)
    }

    /// Is this a final state for ordinary operations?
    pub fn is_final(self) -> bool {
        matches!(self, Self::Shipped | Self::Consumed | Self::Closed)
    }
}

/// Aggregate root: a tracked physical or virtual container.
///
/// Owns its item lines and movement history exclusively. Totals are derived
/// from the current item set after every content change; status and current
/// location are coupled through the lifecycle predicates above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePlate {
    license_plate_id: LicensePlateId,
    warehouse_id: WarehouseId,
    plate_type: LicensePlateType,
    status: LicensePlateStatus,
    current_location_id: Option<LocationId>,
    /// Physical barcode/RFID of the container, if any.
    container_code: Option<String>,
    /// Customer/owner if applicable.
    owner_id: Option<String>,
    items: Vec<LPItem>,
    movements: Vec<Movement>,
    totals: ContentTotals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    created_by: String,
    version: u64,
}

impl LicensePlate {
    /// Create a new license plate in status `Created` with no contents.
    pub fn new(
        license_plate_id: LicensePlateId,
        warehouse_id: WarehouseId,
        plate_type: LicensePlateType,
        container_code: Option<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            license_plate_id,
            warehouse_id,
            plate_type,
            status: LicensePlateStatus::Created,
            current_location_id: None,
            container_code,
            owner_id: None,
            items: Vec::new(),
            movements: Vec::new(),
            totals: ContentTotals::ZERO,
            created_at: now,
            updated_at: now,
            closed_at: None,
            created_by: created_by.into(),
            version: 0,
        }
    }

    /// Add contents to the plate.
    ///
    /// An existing item with the same SKU + lot absorbs the quantity instead
    /// of creating a duplicate line (the new line's measures are ignored in
    /// that case; the first line's measures stand). Adding the first item
    /// activates a freshly created plate.
    pub fn add_item(
        &mut self,
        sku: &str,
        lot_number: Option<String>,
        quantity: i64,
        weight: Option<Decimal>,
        volume: Option<Decimal>,
        uom: Option<String>,
    ) -> DomainResult<()> {
        if !self.status.can_add_items() {
            return Err(DomainError::state_conflict(format!(
                "cannot add items to license plate in status {:?}",
                self.status
            )));
        }

        match self
            .items
            .iter_mut()
            .find(|item| item.matches(sku, lot_number.as_deref()))
        {
            Some(existing) => existing.add_quantity(quantity)?,
            None => {
                let item = LPItem::new(sku, lot_number, quantity, weight, volume, uom)?;
                self.items.push(item);
            }
        }

        self.recalculate_totals();

        if self.status == LicensePlateStatus::Created {
            self.status = LicensePlateStatus::Active;
        }

        self.touch();
        Ok(())
    }

    /// Remove contents from the plate.
    ///
    /// Requires an exact SKU + lot match with enough quantity; a line reaching
    /// zero is deleted. A plate emptied by removal becomes `Consumed`
    /// unconditionally, even mid-picking.
    pub fn remove_item(
        &mut self,
        sku: &str,
        lot_number: Option<&str>,
        quantity: i64,
    ) -> DomainResult<()> {
        if !self.status.can_remove_items() {
            return Err(DomainError::state_conflict(format!(
                "cannot remove items from license plate in status {:?}",
                self.status
            )));
        }

        let idx = self
            .items
            .iter()
            .position(|item| item.matches(sku, lot_number))
            .ok_or_else(|| {
                DomainError::validation(format!("item not found: SKU={sku}, lot={lot_number:?}"))
            })?;

        self.items[idx].remove_quantity(quantity)?;

        if self.items[idx].quantity() == 0 {
            self.items.remove(idx);
        }

        self.recalculate_totals();

        if self.items.is_empty() {
            self.status = LicensePlateStatus::Consumed;
        }

        self.touch();
        Ok(())
    }

    /// Move the plate to a new location (`None` = in transit, not at any
    /// location).
    ///
    /// Appends one movement record with the previous location as origin, then
    /// updates the current location and status.
    pub fn move_to(
        &mut self,
        to_location_id: Option<LocationId>,
        movement_type: MovementType,
        performed_by: &str,
        reason: &str,
    ) -> DomainResult<()> {
        if !self.status.can_be_moved() {
            return Err(DomainError::state_conflict(format!(
                "cannot move license plate in status {:?}",
                self.status
            )));
        }

        let movement = Movement::new(
            movement_type,
            self.current_location_id.clone(),
            to_location_id.clone(),
            performed_by,
            reason,
        );
        self.movements.push(movement);

        self.status = if to_location_id.is_some() {
            LicensePlateStatus::AtLocation
        } else {
            LicensePlateStatus::InTransit
        };
        self.current_location_id = to_location_id;

        self.touch();
        Ok(())
    }

    /// Start picking from the plate.
    pub fn start_picking(&mut self) -> DomainResult<()> {
        if !matches!(
            self.status,
            LicensePlateStatus::AtLocation | LicensePlateStatus::Active
        ) {
            return Err(DomainError::state_conflict(format!(
                "cannot start picking from license plate in status {:?}",
                self.status
            )));
        }

        self.status = LicensePlateStatus::Picked;
        self.touch();
        Ok(())
    }

    /// Complete picking (partial or complete).
    pub fn complete_picking(&mut self) -> DomainResult<()> {
        if self.status != LicensePlateStatus::Picked {
            return Err(DomainError::state_conflict(
                "license plate is not being picked",
            ));
        }

        self.status = if self.items.is_empty() {
            LicensePlateStatus::Consumed
        } else {
            LicensePlateStatus::AtLocation
        };

        self.touch();
        Ok(())
    }

    /// Pack the plate for shipping.
    pub fn pack(&mut self) -> DomainResult<()> {
        if !matches!(
            self.status,
            LicensePlateStatus::AtLocation | LicensePlateStatus::Active
        ) {
            return Err(DomainError::state_conflict(format!(
                "cannot pack license plate in status {:?}",
                self.status
            )));
        }

        self.status = LicensePlateStatus::Packed;
        self.touch();
        Ok(())
    }

    /// Ship the plate.
    pub fn ship(&mut self) -> DomainResult<()> {
        if self.status != LicensePlateStatus::Packed {
            return Err(DomainError::state_conflict(
                "license plate must be packed before shipping",
            ));
        }

        self.status = LicensePlateStatus::Shipped;
        self.touch();
        Ok(())
    }

    /// Close the plate. Allowed from any state; records a close timestamp.
    pub fn close(&mut self) {
        self.status = LicensePlateStatus::Closed;
        self.closed_at = Some(Utc::now());
        self.touch();
    }

    /// Set the owning customer.
    pub fn set_owner(&mut self, owner_id: impl Into<String>) {
        self.owner_id = Some(owner_id.into());
        self.touch();
    }

    /// Get an item by SKU and lot.
    pub fn get_item(&self, sku: &str, lot_number: Option<&str>) -> Option<&LPItem> {
        self.items.iter().find(|item| item.matches(sku, lot_number))
    }

    /// Items picked for a specific order.
    pub fn items_for_order(&self, order_id: &str) -> Vec<&LPItem> {
        self.items
            .iter()
            .filter(|item| item.is_for_order(order_id))
            .collect()
    }

    pub fn contains_sku(&self, sku: &str) -> bool {
        self.items.iter().any(|item| item.sku() == sku)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest_movement(&self) -> Option<&Movement> {
        self.movements.last()
    }

    /// Movement records whose destination was the given location.
    pub fn movements_to_location(&self, location_id: &LocationId) -> Vec<&Movement> {
        self.movements
            .iter()
            .filter(|m| m.to_location_id() == Some(location_id))
            .collect()
    }

    pub fn warehouse_id(&self) -> &WarehouseId {
        &self.warehouse_id
    }

    pub fn plate_type(&self) -> LicensePlateType {
        self.plate_type
    }

    pub fn status(&self) -> LicensePlateStatus {
        self.status
    }

    pub fn current_location_id(&self) -> Option<&LocationId> {
        self.current_location_id.as_ref()
    }

    pub fn container_code(&self) -> Option<&str> {
        self.container_code.as_deref()
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn items(&self) -> &[LPItem] {
        &self.items
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Current totals, always the exact sum over current items.
    pub fn totals(&self) -> ContentTotals {
        self.totals
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    fn recalculate_totals(&mut self) {
        let quantity = self.items.iter().map(LPItem::quantity).sum();
        let weight = self.items.iter().filter_map(LPItem::weight).sum();
        let volume = self.items.iter().filter_map(LPItem::volume).sum();
        self.totals = ContentTotals::new(quantity, weight, volume);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

impl AggregateRoot for LicensePlate {
    type Id = LicensePlateId;

    fn id(&self) -> &Self::Id {
        &self.license_plate_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plate() -> LicensePlate {
        LicensePlate::new(
            LicensePlateId::new("LP-1").unwrap(),
            WarehouseId::new("WH-1").unwrap(),
            LicensePlateType::Pallet,
            Some("BC-001".into()),
            "tester",
        )
    }

    fn loc(id: &str) -> LocationId {
        LocationId::new(id).unwrap()
    }

    #[test]
    fn new_plate_is_created_and_empty() {
        let lp = plate();
        assert_eq!(lp.status(), LicensePlateStatus::Created);
        assert!(lp.is_empty());
        assert!(lp.movements().is_empty());
        assert_eq!(lp.totals(), ContentTotals::ZERO);
        assert_eq!(lp.current_location_id(), None);
        assert_eq!(lp.version(), 0);
    }

    #[test]
    fn first_item_activates_plate() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 5, Some(dec!(10)), Some(dec!(2)), None)
            .unwrap();
        assert_eq!(lp.status(), LicensePlateStatus::Active);
        assert_eq!(lp.totals(), ContentTotals::new(5, dec!(10), dec!(2)));
    }

    #[test]
    fn same_sku_and_lot_merges_into_one_line() {
        let mut lp = plate();
        lp.add_item("SKU-1", Some("LOT-1".into()), 5, Some(dec!(10)), None, None)
            .unwrap();
        lp.add_item("SKU-1", Some("LOT-1".into()), 3, Some(dec!(99)), None, None)
            .unwrap();

        assert_eq!(lp.items().len(), 1);
        assert_eq!(lp.items()[0].quantity(), 8);
        // Merged adds keep the first line's measures.
        assert_eq!(lp.totals().weight, dec!(10));
    }

    #[test]
    fn different_lot_creates_a_second_line() {
        let mut lp = plate();
        lp.add_item("SKU-1", Some("LOT-1".into()), 5, None, None, None)
            .unwrap();
        lp.add_item("SKU-1", Some("LOT-2".into()), 3, None, None, None)
            .unwrap();
        assert_eq!(lp.items().len(), 2);
        assert_eq!(lp.totals().quantity, 8);
    }

    #[test]
    fn totals_track_item_sums_across_changes() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 5, Some(dec!(1)), None, None).unwrap();
        lp.add_item("SKU-2", None, 7, Some(dec!(2)), None, None).unwrap();
        lp.remove_item("SKU-1", None, 2).unwrap();

        let expected: i64 = lp.items().iter().map(|i| i.quantity()).sum();
        assert_eq!(lp.totals().quantity, expected);
        assert_eq!(lp.totals().quantity, 10);
    }

    #[test]
    fn removing_all_quantity_deletes_the_line() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 5, None, None, None).unwrap();
        lp.add_item("SKU-2", None, 1, None, None, None).unwrap();
        lp.remove_item("SKU-1", None, 5).unwrap();
        assert!(lp.get_item("SKU-1", None).is_none());
        assert_eq!(lp.status(), LicensePlateStatus::Active);
    }

    #[test]
    fn emptying_the_plate_consumes_it() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 5, None, None, None).unwrap();
        lp.remove_item("SKU-1", None, 5).unwrap();
        assert!(lp.is_empty());
        assert_eq!(lp.status(), LicensePlateStatus::Consumed);
        assert_eq!(lp.totals(), ContentTotals::ZERO);
    }

    #[test]
    fn emptying_mid_picking_also_consumes() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 2, None, None, None).unwrap();
        lp.start_picking().unwrap();
        lp.remove_item("SKU-1", None, 2).unwrap();
        assert_eq!(lp.status(), LicensePlateStatus::Consumed);
    }

    #[test]
    fn removing_unknown_item_is_a_validation_error() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 2, None, None, None).unwrap();
        let err = lp.remove_item("SKU-1", Some("LOT-9"), 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn removing_more_than_held_is_insufficient_quantity() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 2, None, None, None).unwrap();
        let err = lp.remove_item("SKU-1", None, 3).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientQuantity(_)));
        assert_eq!(lp.totals().quantity, 2);
    }

    #[test]
    fn cannot_move_freshly_created_plate() {
        let mut lp = plate();
        let err = lp
            .move_to(Some(loc("LOC-1")), MovementType::Putaway, "worker", "r")
            .unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
        assert!(lp.movements().is_empty());
    }

    #[test]
    fn move_from_active_records_origin_and_destination() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.move_to(Some(loc("LOC-1")), MovementType::Putaway, "worker", "r")
            .unwrap();

        assert_eq!(lp.status(), LicensePlateStatus::AtLocation);
        assert_eq!(lp.current_location_id(), Some(&loc("LOC-1")));
        assert_eq!(lp.movements().len(), 1);

        let m = lp.latest_movement().unwrap();
        assert_eq!(m.from_location_id(), None);
        assert_eq!(m.to_location_id(), Some(&loc("LOC-1")));
        assert_eq!(m.performed_by(), "worker");
    }

    #[test]
    fn move_to_nowhere_means_in_transit() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.move_to(Some(loc("LOC-1")), MovementType::Putaway, "w", "r")
            .unwrap();
        lp.move_to(None, MovementType::Relocation, "w", "r").unwrap();

        assert_eq!(lp.status(), LicensePlateStatus::InTransit);
        assert_eq!(lp.current_location_id(), None);
        let m = lp.latest_movement().unwrap();
        assert_eq!(m.from_location_id(), Some(&loc("LOC-1")));
        assert_eq!(m.to_location_id(), None);
    }

    #[test]
    fn cannot_add_items_in_transit() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.move_to(None, MovementType::Relocation, "w", "r").unwrap();
        let err = lp.add_item("SKU-2", None, 1, None, None, None).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn picking_lifecycle_returns_to_location_when_not_empty() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 5, None, None, None).unwrap();
        lp.move_to(Some(loc("LOC-1")), MovementType::Putaway, "w", "r")
            .unwrap();
        lp.start_picking().unwrap();
        assert_eq!(lp.status(), LicensePlateStatus::Picked);
        lp.remove_item("SKU-1", None, 2).unwrap();
        lp.complete_picking().unwrap();
        assert_eq!(lp.status(), LicensePlateStatus::AtLocation);
    }

    #[test]
    fn emptying_removal_preempts_complete_picking() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.start_picking().unwrap();
        lp.remove_item("SKU-1", None, 1).unwrap();
        // Removal already consumed the plate; completing picking afterwards
        // is a state conflict.
        let err = lp.complete_picking().unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn pack_then_ship() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.pack().unwrap();
        assert_eq!(lp.status(), LicensePlateStatus::Packed);
        lp.ship().unwrap();
        assert_eq!(lp.status(), LicensePlateStatus::Shipped);
    }

    #[test]
    fn cannot_ship_unpacked_plate() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        let err = lp.ship().unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn shipped_plate_rejects_content_and_movement_changes() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.pack().unwrap();
        lp.ship().unwrap();

        assert!(lp.add_item("SKU-2", None, 1, None, None, None).is_err());
        assert!(lp.remove_item("SKU-1", None, 1).is_err());
        assert!(
            lp.move_to(Some(loc("LOC-1")), MovementType::Ship, "w", "r")
                .is_err()
        );
        assert!(lp.status().is_final());
    }

    #[test]
    fn close_is_allowed_from_any_state() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.pack().unwrap();
        lp.ship().unwrap();
        lp.close();
        assert_eq!(lp.status(), LicensePlateStatus::Closed);
        assert!(lp.closed_at().is_some());
    }

    #[test]
    fn version_bumps_once_per_mutation() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        lp.add_item("SKU-2", None, 1, None, None, None).unwrap();
        lp.remove_item("SKU-1", None, 1).unwrap();
        assert_eq!(lp.version(), 3);
    }

    #[test]
    fn failed_mutation_leaves_version_untouched() {
        let mut lp = plate();
        lp.add_item("SKU-1", None, 1, None, None, None).unwrap();
        let v = lp.version();
        let _ = lp.remove_item("SKU-1", None, 99).unwrap_err();
        assert_eq!(lp.version(), v);
    }

    #[test]
    fn status_serializes_in_wire_case() {
        let json = serde_json::to_string(&LicensePlateStatus::AtLocation).unwrap();
        assert_eq!(json, "\"AT_LOCATION\"");
        let json = serde_json::to_string(&LicensePlateType::Pallet).unwrap();
        assert_eq!(json, "\"PALLET\"");
    }
}
