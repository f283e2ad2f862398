//! Sales Orders domain module.
//!
//! Orders move through reserve → ship → deliver (or cancel) by calling into
//! the inventory crate's reservation engine and stock ledger; they never touch
//! inventory rows directly.

pub mod lifecycle;
pub mod order;
pub mod store;

pub use lifecycle::{
    AvailabilityCheck, BackorderLine, CancellationResult, DeliveryResult, LineAvailability,
    ReservationResult, SalesOrderLifecycle, ShipmentResult,
};
pub use order::{SalesOrder, SalesOrderLine, SalesOrderStatus};
pub use store::SalesOrderStore;
