//! `logiflow-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod clock;
pub mod directory;
pub mod entity;
pub mod error;
pub mod id;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{CarrierRef, Directory, ProductRef, SupplierRef, WarehouseRef};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, ensure_positive};
pub use id::{
    CarrierId, ClientId, InventoryId, MovementId, ProductId, PurchaseOrderId, PurchaseOrderLineId,
    SalesOrderId, SalesOrderLineId, ShipmentId, SupplierId, UserId, WarehouseId,
};
