use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paktrack_core::{DomainError, DomainResult, Entity, ItemId};

/// A line of contents on a license plate: SKU + lot with quantity and
/// physical measures.
///
/// Two items on the same plate are the same logical item iff SKU and lot
/// match exactly (lot absent on both counts as a match). Quantity stays
/// strictly positive for as long as the item exists; the owning plate removes
/// an item the moment its quantity reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LPItem {
    item_id: ItemId,
    sku: String,
    lot_number: Option<String>,
    quantity: i64,
    weight: Option<Decimal>,
    volume: Option<Decimal>,
    uom: Option<String>,
    added_at: DateTime<Utc>,
    order_id: Option<String>,
    task_id: Option<String>,
}

impl LPItem {
    /// Create a new item line.
    ///
    /// Rejects a blank SKU, a non-positive quantity, and negative measures.
    pub fn new(
        sku: impl Into<String>,
        lot_number: Option<String>,
        quantity: i64,
        weight: Option<Decimal>,
        volume: Option<Decimal>,
        uom: Option<String>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        if sku.trim().is_empty() {
            return Err(DomainError::validation("SKU is required"));
        }
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if weight.is_some_and(|w| w < Decimal::ZERO) {
            return Err(DomainError::validation("weight cannot be negative"));
        }
        if volume.is_some_and(|v| v < Decimal::ZERO) {
            return Err(DomainError::validation("volume cannot be negative"));
        }

        Ok(Self {
            item_id: ItemId::new(),
            sku,
            lot_number,
            quantity,
            weight,
            volume,
            uom,
            added_at: Utc::now(),
            order_id: None,
            task_id: None,
        })
    }

    /// Add quantity to this item.
    pub fn add_quantity(&mut self, additional: i64) -> DomainResult<()> {
        if additional <= 0 {
            return Err(DomainError::validation(
                "additional quantity must be positive",
            ));
        }
        self.quantity += additional;
        Ok(())
    }

    /// Remove quantity from this item.
    ///
    /// Insufficient quantity is a hard failure, never clamped.
    pub fn remove_quantity(&mut self, amount: i64) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::validation(
                "quantity to remove must be positive",
            ));
        }
        if amount > self.quantity {
            return Err(DomainError::insufficient_quantity(format!(
                "cannot remove {amount} of {} (only {} available)",
                self.sku, self.quantity
            )));
        }
        self.quantity -= amount;
        Ok(())
    }

    /// Associate this item with an order.
    pub fn associate_with_order(&mut self, order_id: impl Into<String>) {
        self.order_id = Some(order_id.into());
    }

    /// Associate this item with a task.
    pub fn associate_with_task(&mut self, task_id: impl Into<String>) {
        self.task_id = Some(task_id.into());
    }

    /// Check whether this item was picked for a specific order.
    pub fn is_for_order(&self, order_id: &str) -> bool {
        self.order_id.as_deref() == Some(order_id)
    }

    /// Check whether this item matches a SKU + lot pair.
    pub fn matches(&self, sku: &str, lot_number: Option<&str>) -> bool {
        self.sku == sku && self.lot_number.as_deref() == lot_number
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn lot_number(&self) -> Option<&str> {
        self.lot_number.as_deref()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    pub fn volume(&self) -> Option<Decimal> {
        self.volume
    }

    pub fn uom(&self) -> Option<&str> {
        self.uom.as_deref()
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }
}

impl Entity for LPItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.item_id
    }
}
