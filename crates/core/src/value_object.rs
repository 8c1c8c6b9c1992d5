//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. They represent
/// concepts where identity doesn't matter - only the values matter. A totals
/// triple of (quantity, weight, volume) is a value object; a license plate is
/// an entity.
///
/// To "modify" a value object, create a new one with the new values. This
/// keeps them safe to share and lets them behave like primitives.
///
/// The trait requires:
/// - **Clone**: value objects are cheap to copy (they're values, not references)
/// - **PartialEq**: compared by their attribute values
/// - **Debug**: debuggable (helpful for logging, testing)
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct ContentTotals {
///     quantity: i64,
///     weight: Decimal,
///     volume: Decimal,
/// }
///
/// impl ValueObject for ContentTotals {}
///
/// // Two totals with the same values are equal
/// assert_eq!(ContentTotals::ZERO, ContentTotals::ZERO);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
