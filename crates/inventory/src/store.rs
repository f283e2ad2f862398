//! Persistence contract for inventory rows and the movement log.

use logiflow_core::{
    DomainError, DomainResult, ExpectedVersion, InventoryId, ProductId, WarehouseId,
};

use crate::stock::{Inventory, InventoryMovement};

/// One atomic unit of work against an inventory row.
///
/// Storage adapters must apply the row write and the movement append together,
/// and only if the stored row version still matches `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockWrite {
    pub inventory: Inventory,
    pub expected: ExpectedVersion,
    pub movement: Option<InventoryMovement>,
}

/// Inventory persistence used by the ledger and reservation engine.
pub trait InventoryStore: Send + Sync {
    fn find(&self, id: &InventoryId) -> DomainResult<Option<Inventory>>;

    fn find_by_product_and_warehouse(
        &self,
        product_id: &ProductId,
        warehouse_id: &WarehouseId,
    ) -> DomainResult<Option<Inventory>>;

    /// Commit a [`StockWrite`]; returns the row with its new version.
    ///
    /// Fails with `Conflict` when the version check fails or when inserting a
    /// second row for the same (product, warehouse) pair.
    fn commit(&self, write: StockWrite) -> DomainResult<Inventory>;

    /// Movement history for a row, in append order.
    fn movements(&self, inventory_id: &InventoryId) -> DomainResult<Vec<InventoryMovement>>;
}

impl<S> InventoryStore for std::sync::Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn find(&self, id: &InventoryId) -> DomainResult<Option<Inventory>> {
        (**self).find(id)
    }

    fn find_by_product_and_warehouse(
        &self,
        product_id: &ProductId,
        warehouse_id: &WarehouseId,
    ) -> DomainResult<Option<Inventory>> {
        (**self).find_by_product_and_warehouse(product_id, warehouse_id)
    }

    fn commit(&self, write: StockWrite) -> DomainResult<Inventory> {
        (**self).commit(write)
    }

    fn movements(&self, inventory_id: &InventoryId) -> DomainResult<Vec<InventoryMovement>> {
        (**self).movements(inventory_id)
    }
}

/// Load the row for `(product, warehouse)` or fail with `NotFound`.
pub(crate) fn load_row<S: InventoryStore + ?Sized>(
    store: &S,
    product_id: &ProductId,
    warehouse_id: &WarehouseId,
) -> DomainResult<Inventory> {
    store
        .find_by_product_and_warehouse(product_id, warehouse_id)?
        .ok_or_else(|| {
            DomainError::not_found(format!(
                "no inventory for product {product_id} in warehouse {warehouse_id}"
            ))
        })
}

/// Read-check-write loop with optimistic concurrency.
///
/// `decide` mutates a fresh copy of the row and returns the movement to append
/// (or `None` for bookkeeping-only changes). On `Conflict` the row is re-read
/// and `decide` re-run, at most `max_retries` extra times. Domain failures
/// from `decide` are returned as-is and nothing is written.
pub(crate) fn update_row<S, F, M>(
    store: &S,
    product_id: &ProductId,
    warehouse_id: &WarehouseId,
    max_retries: u32,
    mut decide: F,
) -> DomainResult<(Inventory, M)>
where
    S: InventoryStore + ?Sized,
    F: FnMut(&mut Inventory) -> DomainResult<M>,
    M: Clone + Into<Option<InventoryMovement>>,
{
    let mut attempt = 0;
    loop {
        let current = load_row(store, product_id, warehouse_id)?;
        let expected = ExpectedVersion::of(&current);
        let mut next = current;
        let decided = decide(&mut next)?;

        let write = StockWrite {
            inventory: next,
            expected,
            movement: decided.clone().into(),
        };
        match store.commit(write) {
            Ok(saved) => return Ok((saved, decided)),
            Err(err) if err.is_conflict() && attempt < max_retries => {
                attempt += 1;
                tracing::debug!(
                    %product_id,
                    %warehouse_id,
                    attempt,
                    ?expected,
                    "inventory row changed concurrently; retrying"
                );
            }
            Err(err) => return Err(err),
        }
    }
}
