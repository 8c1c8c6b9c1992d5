//! Aggregate root trait for document-persisted domain models.

/// Aggregate root marker + minimal interface.
///
/// Aggregates in this system are persisted as whole documents and mutated in
/// place through validated operations; they do not reference each other
/// directly. Cross-aggregate sequencing is the coordinator's job.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Bumped once per successful mutation. The persistence collaborator may
    /// use it for optimistic concurrency; this core only guarantees it moves
    /// forward.
    fn version(&self) -> u64;
}
