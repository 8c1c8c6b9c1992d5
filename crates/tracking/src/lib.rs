//! Physical tracking domain: license plates and real-time location state.
//!
//! Two aggregate roots that never reference each other directly:
//!
//! - [`LicensePlate`]: a tracked container (pallet, tote, carton, ...) with
//!   contents, a status lifecycle, and an append-only movement history.
//! - [`LocationState`]: occupancy, capacity, and the set of plates currently
//!   registered at one storage location.
//!
//! Cross-aggregate consistency (a plate is "at" a location iff the location
//! lists it, with matching totals) is sequenced externally by the
//! coordinator in `paktrack-infra`.

pub mod events;
pub mod item;
pub mod license_plate;
pub mod location;
pub mod movement;
pub mod totals;

pub use events::TrackingEvent;
pub use item::LPItem;
pub use license_plate::{LicensePlate, LicensePlateStatus, LicensePlateType};
pub use location::{CapacityLimits, LocationState, OccupancyStatus};
pub use movement::{Movement, MovementType};
pub use totals::ContentTotals;
