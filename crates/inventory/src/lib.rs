//! Inventory domain module: stock ledger, reservations and allocation.
//!
//! `Inventory` rows are only ever mutated through [`StockLedger`] (physical
//! movements) and [`ReservationEngine`] (reservations). Both go through an
//! [`InventoryStore`] with optimistic row versioning.

pub mod allocation;
pub mod ledger;
pub mod reservation;
pub mod stock;
pub mod store;

pub use allocation::{AllocationPlan, AllocationResult, WarehouseAllocation, plan_allocation};
pub use ledger::{DEFAULT_MAX_CONFLICT_RETRIES, StockLedger};
pub use reservation::ReservationEngine;
pub use stock::{Inventory, InventoryMovement, MovementType};
pub use store::{InventoryStore, StockWrite};
