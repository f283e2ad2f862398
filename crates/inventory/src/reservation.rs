//! Reservations against a single warehouse and multi-warehouse allocation.
//!
//! Reservations only touch `qty_reserved`; they are not ledger events and
//! append no movement.

use tracing::{info, instrument, warn};

use logiflow_core::{DomainResult, ProductId, WarehouseId, ensure_positive};

use crate::allocation::{AllocationPlan, AllocationResult, WarehouseAllocation};
use crate::ledger::DEFAULT_MAX_CONFLICT_RETRIES;
use crate::stock::{Inventory, InventoryMovement};
use crate::store::{InventoryStore, update_row};

#[derive(Debug, Clone)]
pub struct ReservationEngine<S> {
    store: S,
    max_retries: u32,
}

impl<S> ReservationEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    pub fn with_max_conflict_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl<S> ReservationEngine<S>
where
    S: InventoryStore,
{
    /// Reserve `quantity` in one warehouse, or fail with `StockUnavailable`.
    #[instrument(skip(self, reference_document))]
    pub fn reserve_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i64,
        reference_document: &str,
    ) -> DomainResult<Inventory> {
        ensure_positive(quantity, "quantity")?;
        let (row, _) = update_row(
            &self.store,
            &product_id,
            &warehouse_id,
            self.max_retries,
            |row| {
                row.reserve(quantity)?;
                Ok(None::<InventoryMovement>)
            },
        )?;
        info!(
            reference_document,
            qty_reserved = row.qty_reserved(),
            available = row.available(),
            "stock reserved"
        );
        Ok(row)
    }

    /// Release up to `quantity` reserved units; never drops below zero.
    #[instrument(skip(self, reference_document))]
    pub fn release_reservation(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i64,
        reference_document: &str,
    ) -> DomainResult<Inventory> {
        ensure_positive(quantity, "quantity")?;
        let (row, _) = update_row(
            &self.store,
            &product_id,
            &warehouse_id,
            self.max_retries,
            |row| {
                if quantity > row.qty_reserved() {
                    warn!(
                        reserved = row.qty_reserved(),
                        "releasing more than is reserved; flooring at zero"
                    );
                }
                row.release(quantity)?;
                Ok(None::<InventoryMovement>)
            },
        )?;
        info!(
            reference_document,
            qty_reserved = row.qty_reserved(),
            "reservation released"
        );
        Ok(row)
    }

    /// Plan `total_quantity` across `warehouses_by_priority`, in that order.
    ///
    /// Read-only: nothing is reserved. Untracked warehouses contribute zero.
    #[instrument(
        skip(self, warehouses_by_priority),
        fields(warehouses = warehouses_by_priority.len())
    )]
    pub fn allocate_from_multiple_warehouses(
        &self,
        product_id: ProductId,
        total_quantity: i64,
        warehouses_by_priority: &[WarehouseId],
    ) -> DomainResult<AllocationResult> {
        ensure_positive(total_quantity, "total quantity")?;

        let mut plan = AllocationPlan::new(total_quantity);
        for warehouse_id in warehouses_by_priority {
            if plan.is_satisfied() {
                break;
            }
            let available = self
                .store
                .find_by_product_and_warehouse(&product_id, warehouse_id)?
                .map_or(0, |row| row.available());
            plan.offer(*warehouse_id, available);
        }

        let result = plan.finish(product_id);
        info!(
            total_allocated = result.total_allocated,
            shortage = result.shortage,
            fully_allocated = result.fully_allocated,
            "allocation planned"
        );
        Ok(result)
    }

    /// Reserve each planned allocation in order.
    ///
    /// Each reservation is its own atomic step. Stops at the first failure and
    /// returns it; reservations already made stay in place for the caller to
    /// release.
    pub fn reserve_allocation(
        &self,
        product_id: ProductId,
        allocations: &[WarehouseAllocation],
        reference_document: &str,
    ) -> DomainResult<Vec<WarehouseAllocation>> {
        let mut reserved = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            self.reserve_stock(
                product_id,
                allocation.warehouse_id,
                allocation.allocated_quantity,
                reference_document,
            )?;
            reserved.push(*allocation);
        }
        Ok(reserved)
    }
}
