//! Domain notification events and the bus abstraction used to publish them.
//!
//! Mutating tracking operations emit one typed notification each; delivery is
//! fire-and-forget from the core's perspective (publish failures are logged
//! and swallowed by the coordinator, never surfaced to callers).

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
