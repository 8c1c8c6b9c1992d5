use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paktrack_core::ValueObject;

/// Content totals: summed quantity, weight and volume of a plate's items.
///
/// Always derived by recomputation over the current item set, never mutated
/// independently. Also the unit in which a location admits or releases a
/// plate's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTotals {
    pub quantity: i64,
    pub weight: Decimal,
    pub volume: Decimal,
}

impl ContentTotals {
    pub const ZERO: ContentTotals = ContentTotals {
        quantity: 0,
        weight: Decimal::ZERO,
        volume: Decimal::ZERO,
    };

    pub fn new(quantity: i64, weight: Decimal, volume: Decimal) -> Self {
        Self {
            quantity,
            weight,
            volume,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Default for ContentTotals {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ValueObject for ContentTotals {}
