//! Entity trait: identity that persists across state changes.

/// Entity marker + minimal interface.
///
/// An item line keeps its identity while its quantity changes; a movement
/// record keeps its identity forever. Equality of entities is by id, not by
/// attribute values (contrast with [`crate::ValueObject`]).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
