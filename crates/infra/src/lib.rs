//! Infrastructure layer: persistence seams and the tracking coordinator.

pub mod coordinator;
pub mod in_memory;
pub mod repository;


pub use coordinator::{CapacityPolicy, TrackingCoordinator, TrackingError};
pub use in_memory::{InMemoryLicensePlateRepository, InMemoryLocationStateRepository};
pub use repository::{LicensePlateRepository, LocationStateRepository, RepositoryError};
