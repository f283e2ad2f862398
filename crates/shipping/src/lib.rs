//! Shipments domain module: carrier shipments and their status machine.
//!
//! Shipments are not tied to stock; they only track carrier progress.

pub mod lifecycle;
pub mod shipment;
pub mod store;

pub use lifecycle::{ShipmentLifecycle, ShipmentTracking, StatusUpdateResult};
pub use shipment::{Shipment, ShipmentStatus};
pub use store::ShipmentStore;
