//! Domain models for the fleet simulator

pub mod event;
pub mod fleet;
pub mod maintenance;
pub mod train;

// Re-exports
pub use event::{Event, EventLog};
pub use fleet::{FleetState, StatusCounts};
pub use maintenance::{MaintenanceKind, MaintenanceTask};
pub use train::{
    Branding, Certificate, CertificateKind, Certificates, Cleaning, Decision, JobCardStatus,
    JobCards, Mileage, OperationalStatus, SlotStatus, Stabling, Train, Wear,
};
