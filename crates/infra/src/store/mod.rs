//! In-memory persistence adapters.
//!
//! Every adapter keeps its tables behind a single `RwLock`, so one commit is
//! one critical section: the version check, the row write and any dependent
//! writes (movement log, owned lines) happen together or not at all.

pub mod directory;
pub mod inventory;
pub mod purchasing;
pub mod sales;
pub mod shipping;

pub use directory::InMemoryDirectory;
pub use inventory::InMemoryInventoryStore;
pub use purchasing::InMemoryPurchaseOrderStore;
pub use sales::InMemorySalesOrderStore;
pub use shipping::InMemoryShipmentStore;

use logiflow_core::{DomainError, DomainResult, ExpectedVersion};

/// Check `expected` against the stored version and return the next one.
fn next_version(expected: ExpectedVersion, current: Option<u64>) -> DomainResult<u64> {
    expected.check(current)?;
    Ok(current.unwrap_or(0) + 1)
}

fn poisoned(table: &str) -> DomainError {
    DomainError::conflict(format!("{table} store lock poisoned"))
}
